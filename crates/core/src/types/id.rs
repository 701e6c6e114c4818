//! Newtype IDs for type-safe entity references.
//!
//! The remote store hands out opaque string identifiers (document ids,
//! payment transaction ids). Use the `define_id!` macro to wrap them so a
//! cart line id can never be passed where a product id is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()`, `as_str()`, `short()` and `Display`
/// - `From<String>` and `From<&str>`
///
/// # Example
///
/// ```rust
/// # use grips_gears_core::define_id;
/// define_id!(WishlistId);
///
/// let id = WishlistId::new("65f0c0ffee");
/// assert_eq!(id.as_str(), "65f0c0ffee");
/// assert_eq!(id.short(4), "65f0");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The first `len` characters of the id (the whole id when shorter).
            #[must_use]
            pub fn short(&self, len: usize) -> &str {
                self.0
                    .char_indices()
                    .nth(len)
                    .map_or(self.0.as_str(), |(end, _)| self.0.get(..end).unwrap_or(&self.0))
            }

            /// Whether the id is empty.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Entity IDs issued by the remote store
define_id!(ProductId);
define_id!(CartItemId);
define_id!(TransactionId);
define_id!(UserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_truncates() {
        let id = TransactionId::new("SSLCZ_TEST_6650a1b2c3d4e5f6");
        assert_eq!(id.short(12), "SSLCZ_TEST_6");
        assert_eq!(id.short(100), "SSLCZ_TEST_6650a1b2c3d4e5f6");
    }

    #[test]
    fn test_serde_transparent() {
        let id: ProductId = serde_json::from_str("\"65f0aa\"").unwrap();
        assert_eq!(id.as_str(), "65f0aa");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"65f0aa\"");
    }

    #[test]
    fn test_display() {
        let id = CartItemId::from("abc");
        assert_eq!(id.to_string(), "abc");
    }
}
