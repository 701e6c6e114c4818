//! Integration tests for Grips & Gears.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the storefront (and the storefront API it talks to)
//! cargo run -p grips-gears-storefront
//!
//! # Run the live tests against it
//! STOREFRONT_BASE_URL_TEST=http://localhost:3000 \
//!     cargo test -p grips-gears-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_pages` - Public pages, guards and payment results (live)
//! - `visitor_cart` - Session cart for visitors (live)
//! - `cart_totals` - Cart and checkout rules through the library (offline)

use reqwest::{Client, Response, redirect::Policy};

/// Environment variable naming the storefront under test.
pub const BASE_URL_ENV: &str = "STOREFRONT_BASE_URL_TEST";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// A cookie-keeping client pointed at a running storefront.
///
/// Redirects are not followed so tests can assert on `Location`.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a context from `STOREFRONT_BASE_URL_TEST`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a storefront path.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the storefront is unreachable.
    pub async fn get(&self, path: &str) -> reqwest::Result<Response> {
        self.client.get(self.url(path)).send().await
    }

    /// `POST` a urlencoded form to a storefront path.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the storefront is unreachable.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Result<Response> {
        self.client.post(self.url(path)).form(form).send().await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The `Location` header of a redirect, if any.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
