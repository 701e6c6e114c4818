//! Dashboard statistics endpoints.

use tracing::instrument;

use super::{AdminStats, ApiClient, ApiError, UserHomeStats};

impl ApiClient {
    /// Store-wide statistics (admin only).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admin tokens.
    #[instrument(skip(self, token))]
    pub async fn admin_stats(&self, token: &str) -> Result<AdminStats, ApiError> {
        self.get_json("/stats", Some(token)).await
    }

    /// Statistics for the token's user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn user_home_stats(&self, token: &str) -> Result<UserHomeStats, ApiError> {
        self.get_json("/user/home", Some(token)).await
    }
}
