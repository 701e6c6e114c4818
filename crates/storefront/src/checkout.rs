//! Checkout form validation.
//!
//! Fields are checked in a fixed order and the first failure is reported,
//! so the visitor fixes one thing at a time.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use grips_gears_core::Phone;

use crate::api::CustomerInfo;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// Why a checkout attempt was refused before reaching the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// A required shipping field is blank.
    #[error("Please fill in the {0} field")]
    MissingField(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid Bangladesh phone number (e.g., 01712345678)")]
    InvalidPhone,

    #[error("Your cart is empty. Please add items before checkout.")]
    EmptyCart,
}

/// Shipping details as posted by the checkout form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

impl ShippingForm {
    /// Blank form prefilled for a signed-in user.
    #[must_use]
    pub fn prefilled(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            country: "Bangladesh".to_string(),
            ..Self::default()
        }
    }

    /// Validate and convert to the customer info sent with the order.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: missing required field, malformed
    /// email, then non-Bangladesh phone number.
    pub fn validate(&self) -> Result<CustomerInfo, CheckoutError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("postcode", &self.postcode),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(CheckoutError::MissingField(*field));
        }

        let email = self.email.trim();
        if !EMAIL_RE.is_match(email) {
            return Err(CheckoutError::InvalidEmail);
        }

        let phone = Phone::parse(&self.phone).map_err(|_| CheckoutError::InvalidPhone)?;

        let country = self.country.trim();
        Ok(CustomerInfo {
            name: self.name.trim().to_string(),
            email: email.to_string(),
            phone: phone.as_str().to_string(),
            address: self.address.trim().to_string(),
            address2: self.address2.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postcode: self.postcode.trim().to_string(),
            country: if country.is_empty() {
                "Bangladesh".to_string()
            } else {
                country.to_string()
            },
        })
    }
}
