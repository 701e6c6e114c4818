//! Token issuance and user management endpoints.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use grips_gears_core::UserId;

use super::catalog::encode;
use super::{
    AdminCheck, ApiClient, ApiError, DeleteResult, InsertResult, NewUser, TokenResponse,
    UpdateResult, UserRecord,
};

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
}

impl ApiClient {
    /// Exchange a verified email for an API bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn issue_token(&self, email: &str) -> Result<String, ApiError> {
        let response: TokenResponse = self
            .execute(Method::POST, "/jwt", Some(&TokenRequest { email }), None)
            .await?;
        Ok(response.token)
    }

    /// Register a user record. Existing users are left untouched by the API.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn register_user(&self, name: &str, email: &str) -> Result<bool, ApiError> {
        let result: InsertResult = self
            .execute(Method::POST, "/users", Some(&NewUser { name, email }), None)
            .await?;
        Ok(result.succeeded())
    }

    /// Whether `email` belongs to an admin.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn is_admin(&self, email: &str, token: &str) -> Result<bool, ApiError> {
        let check: AdminCheck = self
            .get_json(&format!("/users/admin/{}", encode(email)), Some(token))
            .await?;
        Ok(check.admin)
    }

    /// List all users (admin only).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn users(&self, token: &str) -> Result<Vec<UserRecord>, ApiError> {
        self.get_json("/users", Some(token)).await
    }

    /// Grant the admin role.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn promote_user(&self, id: &UserId, token: &str) -> Result<bool, ApiError> {
        let result: UpdateResult = self
            .send_empty(
                Method::PATCH,
                &format!("/users/admin/{}", encode(id.as_str())),
                token,
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    /// Delete a user record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId, token: &str) -> Result<bool, ApiError> {
        let result: DeleteResult = self
            .send_empty(
                Method::DELETE,
                &format!("/users/{}", encode(id.as_str())),
                token,
            )
            .await?;
        Ok(result.deleted_count > 0)
    }
}
