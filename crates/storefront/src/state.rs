//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::services::{IdentityClient, IdentityError, ImageHostClient, ImageHostError};

/// Error building the shared clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storefront API client: {0}")]
    Api(#[from] ApiError),
    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),
    #[error("image host client: {0}")]
    ImageHost(#[from] ImageHostError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration and the remote service clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    identity: IdentityClient,
    image_host: ImageHostClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the HTTP clients cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api)?;
        let identity = IdentityClient::new(&config.identity, config.api.timeout)?;
        let image_host = ImageHostClient::new(&config.image_hosting, config.api.timeout)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                identity,
                image_host,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the remote storefront API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the identity provider client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Get a reference to the image host client.
    #[must_use]
    pub fn image_host(&self) -> &ImageHostClient {
        &self.inner.image_host
    }
}
