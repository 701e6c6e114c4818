//! Payment result pages.
//!
//! The gateway sends the visitor back to one of these after payment. Only
//! the success page talks to the API: the order may still be `pending` when
//! the visitor lands, in which case it asks the API to re-check the
//! transaction once.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use grips_gears_core::{PaymentStatus, TransactionId};

use crate::api::{ApiError, Order};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageContext, RequireUser};
use crate::models::CurrentUser;
use crate::state::AppState;

const ORDER_NOT_FOUND: &str =
    "Order not found. The payment may not have been processed correctly.";
const ORDER_LOAD_FAILED: &str = "Failed to load order details. Please try again.";

// =============================================================================
// Templates
// =============================================================================

/// Payment success page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/success.html")]
pub struct PaymentSuccessTemplate {
    pub page: PageContext,
    pub order: Option<Order>,
    pub error: Option<String>,
}

/// Payment failed page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/fail.html")]
pub struct PaymentFailTemplate {
    pub page: PageContext,
    pub tran_id: Option<String>,
}

/// Payment cancelled page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/cancel.html")]
pub struct PaymentCancelTemplate {
    pub page: PageContext,
    pub tran_id: Option<String>,
}

/// Payment error page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/error.html")]
pub struct PaymentErrorTemplate {
    pub page: PageContext,
    pub code: &'static str,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the order confirmation for a completed payment.
#[instrument(skip(state, page, user), fields(email = %user.email))]
pub async fn success(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(tran_id): Path<String>,
    page: PageContext,
) -> Result<Response, AppError> {
    let tran_id = TransactionId::new(tran_id);

    let (order, error) = match confirmed_order(&state, &user, &tran_id).await {
        Ok(order) => (Some(order), None),
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(ApiError::NotFound(_)) => (None, Some(ORDER_NOT_FOUND.to_string())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load order");
            (None, Some(ORDER_LOAD_FAILED.to_string()))
        }
    };

    Ok(PaymentSuccessTemplate { page, order, error }.into_response())
}

/// Fetch the order; if it is still pending, wait for the gateway to settle
/// and ask the API to verify it once.
async fn confirmed_order(
    state: &AppState,
    user: &CurrentUser,
    tran_id: &TransactionId,
) -> Result<Order, ApiError> {
    let order = state.api().order(tran_id, user.bearer()).await?;
    if !order.belongs_to(&user.email) {
        tracing::warn!(%tran_id, "Order requested by another user");
        return Err(ApiError::NotFound(format!("/orders/{tran_id}")));
    }
    if order.payment_status != PaymentStatus::Pending {
        return Ok(order);
    }

    tokio::time::sleep(state.config().api.payment_verify_delay).await;

    match state.api().verify_payment(tran_id, user.bearer()).await {
        Ok(verification) if verification.payment_status.is_paid() => {
            tracing::info!("Pending payment verified as paid");
            state.api().order(tran_id, user.bearer()).await
        }
        Ok(verification) => {
            tracing::info!(status = %verification.payment_status.as_str(), "Payment still unsettled");
            Ok(order)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Payment verification check failed");
            Ok(order)
        }
    }
}

/// Display the payment failed page.
pub async fn fail(page: PageContext) -> impl IntoResponse {
    PaymentFailTemplate {
        page,
        tran_id: None,
    }
}

/// Display the payment failed page for a transaction.
pub async fn fail_transaction(Path(tran_id): Path<String>, page: PageContext) -> impl IntoResponse {
    PaymentFailTemplate {
        page,
        tran_id: Some(tran_id),
    }
}

/// Display the payment cancelled page.
pub async fn cancel(page: PageContext) -> impl IntoResponse {
    PaymentCancelTemplate {
        page,
        tran_id: None,
    }
}

/// Display the payment cancelled page for a transaction.
pub async fn cancel_transaction(
    Path(tran_id): Path<String>,
    page: PageContext,
) -> impl IntoResponse {
    PaymentCancelTemplate {
        page,
        tran_id: Some(tran_id),
    }
}

/// Display the payment error page.
pub async fn error(page: PageContext) -> impl IntoResponse {
    PaymentErrorTemplate {
        page,
        code: "PAYMENT_PROCESSING_ERROR",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Method;
    use serde_json::{Value, json};

    use super::*;
    use crate::testing::{MockApi, customer};

    const ORDER_PATH: &str = "/orders/SSLCZ_42";
    const VERIFY_PATH: &str = "/payment/verify/SSLCZ_42";

    fn order(email: &str, payment_status: &str) -> Value {
        json!({
            "transactionId": "SSLCZ_42",
            "email": email,
            "totalAmount": 5300,
            "paymentStatus": payment_status,
            "customerInfo": {"name": "Rider", "address": "House 1, Road 2", "phone": "01712345678"}
        })
    }

    async fn confirm(state: &AppState, email: &str) -> Result<Order, ApiError> {
        confirmed_order(state, &customer(email), &TransactionId::new("SSLCZ_42")).await
    }

    #[tokio::test]
    async fn test_paid_order_skips_verification() {
        let mock =
            MockApi::new().ok(Method::GET, ORDER_PATH, order("rider@example.com", "paid"));
        let state = mock.state().await;

        let found = confirm(&state, "Rider@Example.com").await.unwrap();
        assert!(found.payment_status.is_paid());
        assert_eq!(mock.calls(&Method::GET, VERIFY_PATH), 0);
    }

    #[tokio::test]
    async fn test_other_users_order_is_not_found() {
        let mock =
            MockApi::new().ok(Method::GET, ORDER_PATH, order("owner@example.com", "pending"));
        let state = mock.state().await;

        let err = confirm(&state, "someone@example.com").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(mock.calls(&Method::GET, VERIFY_PATH), 0);
    }

    #[tokio::test]
    async fn test_pending_order_refetched_once_verified_paid() {
        let mock = MockApi::new()
            .ok(Method::GET, ORDER_PATH, order("rider@example.com", "pending"))
            .ok(Method::GET, ORDER_PATH, order("rider@example.com", "paid"))
            .ok(Method::GET, VERIFY_PATH, json!({"paymentStatus": "paid"}));
        let state = mock.state().await;

        let found = confirm(&state, "rider@example.com").await.unwrap();
        assert!(found.payment_status.is_paid());
        assert_eq!(mock.calls(&Method::GET, VERIFY_PATH), 1);
        assert_eq!(mock.calls(&Method::GET, ORDER_PATH), 2);
    }

    #[tokio::test]
    async fn test_pending_order_kept_while_unsettled() {
        let mock = MockApi::new()
            .ok(Method::GET, ORDER_PATH, order("rider@example.com", "pending"))
            .ok(Method::GET, VERIFY_PATH, json!({"paymentStatus": "pending"}));
        let state = mock.state().await;

        let found = confirm(&state, "rider@example.com").await.unwrap();
        assert_eq!(found.payment_status, PaymentStatus::Pending);
        assert_eq!(mock.calls(&Method::GET, VERIFY_PATH), 1);
        assert_eq!(mock.calls(&Method::GET, ORDER_PATH), 1);
    }

    #[tokio::test]
    async fn test_failed_verification_keeps_pending_order() {
        let mock = MockApi::new()
            .ok(Method::GET, ORDER_PATH, order("rider@example.com", "pending"))
            .respond(
                Method::GET,
                VERIFY_PATH,
                axum::http::StatusCode::BAD_GATEWAY,
                json!({"message": "gateway timeout"}),
            );
        let state = mock.state().await;

        let found = confirm(&state, "rider@example.com").await.unwrap();
        assert_eq!(found.payment_status, PaymentStatus::Pending);
    }
}
