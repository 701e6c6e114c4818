//! Grips & Gears storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused by the binary and the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod charts;
pub mod checkout;
pub mod config;
pub mod error;
pub mod filters;
pub mod invoice;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;

use axum::{Router, middleware::from_fn};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Build the full application router with its middleware stack.
///
/// Layers are listed innermost first; see [`middleware`] for the order as
/// seen by a request.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::csp_nonce_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> Router {
        app(AppState::new(config::test_config()).unwrap())
    }

    async fn get(uri: &str) -> axum::response::Response {
        test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_readiness_without_api() {
        let response = get("/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_login_page_renders() {
        let response = get("/login?from=/dashboard/orders").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("content-security-policy"));
        assert!(response.headers().contains_key("x-request-id"));

        let html = body_text(response).await;
        assert!(html.contains("name=\"password\""));
        assert!(html.contains("/dashboard/orders"));
    }

    #[tokio::test]
    async fn test_guarded_page_redirects_to_login() {
        let response = get("/dashboard/cart").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?from=%2Fdashboard%2Fcart"
        );
    }

    #[tokio::test]
    async fn test_admin_page_redirects_visitors() {
        let response = get("/dashboard/items").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?from=%2Fdashboard%2Fitems"
        );
    }

    #[tokio::test]
    async fn test_payment_result_pages() {
        let fail = get("/payment/fail/SSLCZ_TEST_1").await;
        assert_eq!(fail.status(), StatusCode::OK);
        assert!(body_text(fail).await.contains("SSLCZ_TEST_1"));

        let cancel = get("/payment/cancel").await;
        assert_eq!(cancel.status(), StatusCode::OK);

        let error = get("/payment/error").await;
        assert_eq!(error.status(), StatusCode::OK);
        assert!(body_text(error).await.contains("PAYMENT_PROCESSING_ERROR"));
    }

    #[tokio::test]
    async fn test_nested_page_login_link_keeps_full_path() {
        let response = get("/payment/cancel").await;
        let body = body_text(response).await;
        assert!(body.contains("/login?from=%2Fpayment%2Fcancel"));
    }

    #[tokio::test]
    async fn test_engine_oil_is_coming_soon() {
        let response = get("/products/engine-oil").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("coming soon"));
    }
}
