//! Client for the remote storefront REST API.
//!
//! # Architecture
//!
//! - The remote API is the source of truth for products, carts, orders and
//!   users. Nothing is stored locally beyond the visitor session.
//! - Plain JSON over HTTP via `reqwest`; secured endpoints take the bearer
//!   token issued by `POST /jwt` at login.
//! - Catalog listings are cached in-memory via `moka` (TTL from
//!   `STOREFRONT_CATALOG_CACHE_SECS`); every product write invalidates them.
//!
//! # Example
//!
//! ```rust,ignore
//! use grips_gears_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.api)?;
//! let helmets = api.category_products(ProductCategory::Helmet).await?;
//! let cart = api.cart_items(&user.email, user.bearer()).await?;
//! ```

mod cache;
mod carts;
mod catalog;
mod orders;
mod stats;
pub mod types;
mod users;

pub use types::*;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;

use cache::CatalogKey;

/// Errors that can occur when talking to the remote storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The bearer token was rejected (expired or revoked).
    #[error("API rejected the access token")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API accepted the request but reported it did not apply.
    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Client for the remote storefront REST API.
///
/// Cheaply cloneable; all clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    catalog: Option<Cache<CatalogKey, Arc<Vec<Product>>>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("grips-gears-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let catalog = (!config.catalog_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(64)
                .time_to_live(config.catalog_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                catalog,
            }),
        })
    }

    /// Base URL of the remote API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Check that the remote API answers at all (any non-5xx status).
    pub async fn ping(&self) -> bool {
        match self.inner.client.get(self.url("/")).send().await {
            Ok(response) => !response.status().is_server_error(),
            Err(e) => {
                debug!(error = %e, "API ping failed");
                false
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Issue a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.execute::<(), T>(Method::GET, path, None, token).await
    }

    /// Issue a request with a JSON body and decode the JSON response.
    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: &str,
    ) -> Result<T, ApiError> {
        self.execute(method, path, Some(body), Some(token)).await
    }

    /// Issue a bodiless request (DELETE, PATCH without payload).
    async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        self.execute::<(), T>(method, path, None, Some(token)).await
    }

    async fn execute<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.client.request(method.clone(), self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, path, &text));
        }

        debug!(%method, path, %status, "API request completed");

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }
}

/// Map a non-success response to an `ApiError`.
///
/// The remote API reports failures as `{"message": "..."}` (sometimes
/// `{"error": "..."}`); that text is surfaced when present.
fn status_error(status: StatusCode, path: &str, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        _ => {
            let message = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .or_else(|| v.get("error"))
                        .and_then(serde_json::Value::as_str)
                        .map(String::from)
                })
                .unwrap_or_else(|| body.chars().take(200).collect());
            tracing::error!(%status, path, %message, "API returned non-success status");
            ApiError::Status { status, message }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_unauthorized() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "/carts", ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "/stats", "{\"message\":\"forbidden access\"}"),
            ApiError::Unauthorized
        ));
    }

    #[test]
    fn test_status_error_not_found() {
        let err = status_error(StatusCode::NOT_FOUND, "/orders/abc", "");
        assert_eq!(err.to_string(), "Not found: /orders/abc");
    }

    #[test]
    fn test_status_error_surfaces_message() {
        let err = status_error(
            StatusCode::BAD_REQUEST,
            "/payment/init",
            "{\"message\":\"Cart is empty\"}",
        );
        assert_eq!(err.to_string(), "API returned 400 Bad Request: Cart is empty");

        let err = status_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "/payment/init",
            "{\"error\":\"SSLCommerz session failed\"}",
        );
        assert!(err.to_string().ends_with("SSLCommerz session failed"));
    }

    #[test]
    fn test_status_error_plain_body() {
        let err = status_error(StatusCode::BAD_GATEWAY, "/", "upstream down");
        assert!(matches!(err, ApiError::Status { message, .. } if message == "upstream down"));
    }

    #[test]
    fn test_client_without_cache() {
        let config = crate::config::test_config();
        let client = ApiClient::new(&config.api).unwrap();
        assert!(client.inner.catalog.is_none());
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
    }
}
