//! Status enums for orders, payments and users.
//!
//! The remote store writes these as lowercase strings. Values this build
//! does not know about are kept verbatim so they still display.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payment status of a transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Unknown(String),
}

impl PaymentStatus {
    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Unknown(s) => s,
        }
    }

    /// Whether the order has been paid (invoices are only issued then).
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Badge style: paid orders are highlighted, anything else is an error.
    #[must_use]
    pub const fn badge(&self) -> &'static str {
        if self.is_paid() {
            "badge-success"
        } else {
            "badge-error"
        }
    }
}

impl From<&str> for PaymentStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "failed" => Self::Failed,
            _ => Self::Unknown(s.to_owned()),
        }
    }
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    Confirmed,
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Failed,
    Other(String),
}

impl OrderStatus {
    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }

    /// Badge style used in order tables.
    #[must_use]
    pub const fn badge(&self) -> &'static str {
        match self {
            Self::Confirmed | Self::Delivered => "badge-success",
            Self::Pending => "badge-warning",
            Self::Processing => "badge-info",
            Self::Shipped => "badge-primary",
            Self::Cancelled | Self::Failed => "badge-error",
            Self::Other(_) => "badge-neutral",
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "confirmed" => Self::Confirmed,
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            "failed" => Self::Failed,
            _ => Self::Other(s.to_owned()),
        }
    }
}

/// Role of a storefront user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Whether this role may use the admin dashboard.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! string_enum_serde {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(Self::from(raw.as_str()))
            }
        }
    };
}

string_enum_serde!(PaymentStatus);
string_enum_serde!(OrderStatus);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_badges() {
        assert_eq!(OrderStatus::from("Confirmed").badge(), "badge-success");
        assert_eq!(OrderStatus::from("pending").badge(), "badge-warning");
        assert_eq!(OrderStatus::from("processing").badge(), "badge-info");
        assert_eq!(OrderStatus::from("shipped").badge(), "badge-primary");
        assert_eq!(OrderStatus::from("delivered").badge(), "badge-success");
        assert_eq!(OrderStatus::from("CANCELLED").badge(), "badge-error");
        assert_eq!(OrderStatus::from("failed").badge(), "badge-error");
        assert_eq!(OrderStatus::from("on-hold").badge(), "badge-neutral");
    }

    #[test]
    fn test_unknown_values_round_trip() {
        let status: OrderStatus = serde_json::from_str("\"on-hold\"").unwrap();
        assert_eq!(status, OrderStatus::Other("on-hold".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"on-hold\"");
    }

    #[test]
    fn test_payment_status() {
        let paid: PaymentStatus = serde_json::from_str("\"paid\"").unwrap();
        assert!(paid.is_paid());
        assert_eq!(paid.badge(), "badge-success");
        assert_eq!(PaymentStatus::from("failed").badge(), "badge-error");
        assert!(!PaymentStatus::Pending.is_paid());
    }
}
