//! Session-related types.
//!
//! Types stored in the session: the signed-in user, the visitor cart and
//! pending flash messages.

use serde::{Deserialize, Serialize};

use grips_gears_core::UserRole;

/// Session-stored user identity.
///
/// Carries the API token issued at login; it is sent as the bearer token on
/// every secured remote call.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's email address (the remote cart and orders are keyed by it).
    pub email: String,
    /// Display name from the identity provider.
    pub name: String,
    pub role: UserRole,
    api_token: String,
}

impl CurrentUser {
    #[must_use]
    pub const fn new(email: String, name: String, role: UserRole, api_token: String) -> Self {
        Self {
            email,
            name,
            role,
            api_token,
        }
    }

    /// Bearer token for the remote API.
    #[must_use]
    pub fn bearer(&self) -> &str {
        &self.api_token
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name shown in the navigation, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

/// Severity of a flash message; doubles as the alert CSS modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashKind {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Info => "alert-info",
            Self::Warning => "alert-warning",
            Self::Error => "alert-error",
        }
    }
}

/// A one-shot message rendered by the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the visitor's cart (before sign-in).
    pub const LOCAL_CART: &str = "local_cart";

    /// Key for pending flash messages.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_debug_redacts_token() {
        let user = CurrentUser::new(
            "rider@example.com".to_string(),
            "Rider".to_string(),
            UserRole::User,
            "eyJhbGciOiJIUzI1NiJ9.secret".to_string(),
        );
        let debug = format!("{user:?}");
        assert!(debug.contains("rider@example.com"));
        assert!(!debug.contains("eyJhbGci"));
        assert_eq!(user.bearer(), "eyJhbGciOiJIUzI1NiJ9.secret");
    }

    #[test]
    fn test_current_user_session_round_trip() {
        let user = CurrentUser::new(
            "admin@example.com".to_string(),
            String::new(),
            UserRole::Admin,
            "tok".to_string(),
        );
        let json = serde_json::to_value(&user).unwrap();
        let back: CurrentUser = serde_json::from_value(json).unwrap();
        assert!(back.is_admin());
        assert_eq!(back.bearer(), "tok");
        assert_eq!(back.display_name(), "admin@example.com");
    }

    #[test]
    fn test_flash_kinds() {
        assert_eq!(Flash::success("ok").kind.css_class(), "alert-success");
        assert_eq!(Flash::warning("hm").kind.css_class(), "alert-warning");
        assert_eq!(
            serde_json::to_string(&FlashKind::Error).unwrap(),
            "\"error\""
        );
    }
}
