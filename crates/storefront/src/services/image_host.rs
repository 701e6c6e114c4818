//! Product image hosting (imgbb).
//!
//! Images are uploaded as multipart field `image`; the hosted URL comes back
//! as `data.display_url`.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::ImageHostingConfig;

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum ImageHostError {
    /// No `IMAGE_HOSTING_KEY` configured.
    #[error("image hosting is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The host refused the upload.
    #[error("upload rejected: {0}")]
    Rejected(String),
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<UploadData>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct UploadData {
    display_url: String,
}

/// A validated image file taken from a form upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Client for the image host.
#[derive(Clone)]
pub struct ImageHostClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl ImageHostClient {
    /// Create a new image host client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ImageHostingConfig, timeout: Duration) -> Result<Self, ImageHostError> {
        // Uploads are larger than API calls; allow them more time.
        let client = reqwest::Client::builder().timeout(timeout * 3).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Whether uploads are possible at all.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Upload an image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `ImageHostError::NotConfigured` without an API key, and
    /// `Rejected` when the host reports failure.
    #[instrument(skip(self, image), fields(file_name = %image.file_name, size = image.bytes.len()))]
    pub async fn upload(&self, image: ImageUpload) -> Result<String, ImageHostError> {
        let key = self.api_key.as_ref().ok_or(ImageHostError::NotConfigured)?;

        let mut part = Part::bytes(image.bytes).file_name(image.file_name);
        if let Some(mime) = image.content_type.as_deref() {
            part = part.mime_str(mime)?;
        }

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", key.expose_secret())])
            .multipart(Form::new().part("image", part))
            .send()
            .await?;

        let status = response.status();
        let body: UploadResponse = response.json().await?;

        match body {
            UploadResponse {
                success: true,
                data: Some(data),
                ..
            } => Ok(data.display_url),
            UploadResponse { error, .. } => {
                let reason = error.map_or_else(|| format!("HTTP {status}"), |e| e.to_string());
                tracing::warn!(%status, reason, "Image upload rejected");
                Err(ImageHostError::Rejected(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_client() {
        let config = ImageHostingConfig {
            endpoint: "https://api.imgbb.com/1/upload".to_string(),
            api_key: None,
        };
        let client = ImageHostClient::new(&config, Duration::from_secs(1)).expect("client builds");
        assert!(!client.is_configured());
    }

    #[test]
    fn test_upload_response_decoding() {
        let ok: UploadResponse = serde_json::from_str(
            r#"{"data":{"display_url":"https://i.ibb.co/abc/helmet.jpg"},"success":true,"status":200}"#,
        )
        .expect("decodes");
        assert!(ok.success);
        assert_eq!(
            ok.data.map(|d| d.display_url).as_deref(),
            Some("https://i.ibb.co/abc/helmet.jpg")
        );

        let err: UploadResponse = serde_json::from_str(
            r#"{"status_code":400,"error":{"message":"Invalid API v1 key.","code":100}}"#,
        )
        .expect("decodes");
        assert!(!err.success);
        assert!(err.error.is_some());
    }
}
