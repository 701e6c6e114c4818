//! Bangladesh mobile phone numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not a Bangladesh mobile number.
    #[error("not a valid Bangladesh mobile number")]
    InvalidFormat,
}

/// A Bangladesh mobile number as accepted at checkout.
///
/// Format: optional `+88` country prefix, then `01`, an operator digit in
/// `3..=9`, then exactly eight digits (`01712345678`, `+8801712345678`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a phone number, trimming surrounding whitespace.
    ///
    /// The number is stored exactly as entered (with or without `+88`).
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError`] when the input is empty or does not match the
    /// Bangladesh mobile format.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let local = s.strip_prefix("+88").unwrap_or(s);
        let bytes = local.as_bytes();
        let valid = bytes.len() == 11
            && local.starts_with("01")
            && bytes.get(2).is_some_and(|b| (b'3'..=b'9').contains(b))
            && bytes.iter().all(u8::is_ascii_digit);

        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(PhoneError::InvalidFormat)
        }
    }

    /// Returns the number as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        assert!(Phone::parse("01712345678").is_ok());
        assert!(Phone::parse("+8801912345678").is_ok());
        assert!(Phone::parse("01312345678").is_ok());
    }

    #[test]
    fn test_operator_digit_range() {
        assert_eq!(Phone::parse("01212345678"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse("01012345678"), Err(PhoneError::InvalidFormat));
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(Phone::parse("0171234567"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse("017123456789"), Err(PhoneError::InvalidFormat));
    }

    #[test]
    fn test_rejects_other_prefixes() {
        assert_eq!(Phone::parse("+9101712345678"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse("8801712345678"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse("0171234567a"), Err(PhoneError::InvalidFormat));
    }

    #[test]
    fn test_empty() {
        assert_eq!(Phone::parse("   "), Err(PhoneError::Empty));
    }
}
