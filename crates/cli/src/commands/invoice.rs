//! Invoice export.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_API_URL` - Base URL of the storefront API
//! - `STORE_SUPPORT_EMAIL`, `STORE_WEBSITE` - Contact details on the invoice

use std::path::PathBuf;

use grips_gears_core::TransactionId;
use grips_gears_storefront::config::StoreDetails;
use grips_gears_storefront::invoice;

use super::{CommandError, api_client};

/// Fetch an order and write its PDF invoice.
///
/// # Errors
///
/// Fails when the order cannot be fetched, belongs to another email, is not
/// paid yet, or the file cannot be written.
pub async fn write(tran_id: &str, email: &str, out: Option<PathBuf>) -> Result<(), CommandError> {
    let api = api_client()?;
    let token = api.issue_token(email).await?;
    let order = api.order(&TransactionId::new(tran_id), &token).await?;

    if !order.belongs_to(email) {
        return Err(CommandError::NotOwner(tran_id.to_string(), email.to_string()));
    }

    let bytes = invoice::render(&order, &StoreDetails::from_env())?;
    let path = out.unwrap_or_else(|| PathBuf::from(invoice::file_name(&order)));

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| CommandError::Write(path.display().to_string(), e))?;

    tracing::info!(path = %path.display(), size = bytes.len(), "Invoice written");
    Ok(())
}
