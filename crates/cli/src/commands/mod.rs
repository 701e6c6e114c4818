//! CLI command implementations.

pub mod catalog;
pub mod invoice;
pub mod stats;

use grips_gears_storefront::api::{ApiClient, ApiError};
use grips_gears_storefront::config::{ApiConfig, ConfigError};
use grips_gears_storefront::invoice::InvoiceError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storefront API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invoice error: {0}")]
    Invoice(#[from] InvoiceError),

    #[error("Order {0} does not belong to {1}")]
    NotOwner(String, String),

    #[error("Failed to write {0}: {1}")]
    Write(String, std::io::Error),
}

/// Build an API client from the environment.
fn api_client() -> Result<ApiClient, CommandError> {
    let config = ApiConfig::from_env()?;
    tracing::debug!(api = %config.base_url, "Using storefront API");
    Ok(ApiClient::new(&config)?)
}
