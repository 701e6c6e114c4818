//! Identity provider client (Firebase Identity Toolkit REST API).
//!
//! Passwords never touch the storefront API: the identity provider verifies
//! them, and the storefront then exchanges the verified email for an API
//! token (`POST /jwt`).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::IdentityConfig;

/// Errors that can occur when interacting with the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailExists,

    /// Password rejected by the provider's policy.
    #[error("password too weak")]
    WeakPassword,

    /// Email malformed.
    #[error("invalid email")]
    InvalidEmail,

    /// Any other provider error code.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl IdentityError {
    /// Map a provider error code (`error.message`) to an `IdentityError`.
    ///
    /// Some codes carry a human suffix, e.g.
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        let key = code.split([' ', ':']).next().unwrap_or(code);
        match key {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "USER_DISABLED" => Self::InvalidCredentials,
            "EMAIL_EXISTS" => Self::EmailExists,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            _ => Self::Provider(code.to_string()),
        }
    }
}

/// A verified identity returned by sign-in or sign-up.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySession {
    pub local_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_token: SecretString,
}

impl std::fmt::Debug for IdentitySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySession")
            .field("local_id", &self.local_id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdate<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &IdentityConfig, timeout: Duration) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Verify an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidCredentials` for a wrong email or
    /// password.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, IdentityError> {
        self.post(
            "accounts:signInWithPassword",
            &PasswordRequest {
                email,
                password,
                return_secure_token: true,
            },
        )
        .await
    }

    /// Create an email/password account.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::EmailExists`, `WeakPassword` or `InvalidEmail`
    /// when the provider refuses the account.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<IdentitySession, IdentityError> {
        self.post(
            "accounts:signUp",
            &PasswordRequest {
                email,
                password,
                return_secure_token: true,
            },
        )
        .await
    }

    /// Set the account's display name.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the provider rejects the update.
    #[instrument(skip(self, session), fields(email = %session.email))]
    pub async fn set_display_name(
        &self,
        session: &IdentitySession,
        display_name: &str,
    ) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .post(
                "accounts:update",
                &ProfileUpdate {
                    id_token: session.id_token.expose_secret(),
                    display_name,
                    return_secure_token: false,
                },
            )
            .await?;
        Ok(())
    }

    async fn post<B: Serialize + Sync, T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, IdentityError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.endpoint))
            .query(&[("key", self.api_key.expose_secret())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let code = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_default();
            tracing::warn!(%status, code, method, "Identity provider rejected request");
            return Err(if code.is_empty() {
                IdentityError::Provider(format!("HTTP {status}"))
            } else {
                IdentityError::from_code(&code)
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| IdentityError::Provider(format!("unexpected response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert!(matches!(
            IdentityError::from_code("EMAIL_NOT_FOUND"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            IdentityError::from_code("INVALID_PASSWORD"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            IdentityError::from_code("INVALID_LOGIN_CREDENTIALS"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            IdentityError::from_code("EMAIL_EXISTS"),
            IdentityError::EmailExists
        ));
        assert!(matches!(
            IdentityError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            IdentityError::WeakPassword
        ));
        assert!(matches!(
            IdentityError::from_code("INVALID_EMAIL"),
            IdentityError::InvalidEmail
        ));
        assert!(matches!(
            IdentityError::from_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
            IdentityError::Provider(_)
        ));
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session: IdentitySession = serde_json::from_str(
            r#"{"localId":"uid1","email":"rider@example.com","idToken":"eyJhbGciOiJSUzI1NiJ9"}"#,
        )
        .expect("session decodes");
        let debug = format!("{session:?}");
        assert!(debug.contains("rider@example.com"));
        assert!(!debug.contains("eyJhbGci"));
    }
}
