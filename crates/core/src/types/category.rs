//! Product categories and their remote collections.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned for an unknown category name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown product category: {0}")]
pub struct CategoryError(pub String);

/// A product category.
///
/// Each category has its own collection on the remote store; every product
/// is additionally mirrored into the aggregate `allproducts` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductCategory {
    Helmet,
    Tyre,
    SpareParts,
}

impl ProductCategory {
    /// All categories in navigation order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Helmet, Self::Tyre, Self::SpareParts]
    }

    /// Path segment of the category's collection on the remote API.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Helmet => "helmet",
            Self::Tyre => "tyre",
            Self::SpareParts => "spareparts",
        }
    }

    /// Value stored in the product record's `category` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Helmet => "Helmet",
            Self::Tyre => "Tyre",
            Self::SpareParts => "SpareParts",
        }
    }

    /// Human readable singular label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Helmet => "Helmet",
            Self::Tyre => "Tyre",
            Self::SpareParts => "Spare Parts",
        }
    }

    /// Human readable plural, lower case ("No tyres available").
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Helmet => "helmets",
            Self::Tyre => "tyres",
            Self::SpareParts => "spare parts",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "helmet" | "helmets" => Ok(Self::Helmet),
            "tyre" | "tyres" | "tire" | "tires" => Ok(Self::Tyre),
            "spareparts" | "sparepart" => Ok(Self::SpareParts),
            _ => Err(CategoryError(s.to_owned())),
        }
    }
}

impl Serialize for ProductCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
