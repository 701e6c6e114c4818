//! Checkout route handlers.
//!
//! The shipping form is validated here; payment itself happens on the
//! gateway page the API hands back from `POST /payment/init`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiError, PaymentInitRequest, PaymentInitResponse};
use crate::cart::{CartLine, CartSummary, to_payment_items};
use crate::checkout::{CheckoutError, ShippingForm};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{PageContext, RequireUser};
use crate::models::CurrentUser;
use crate::services::cart::CartService;
use crate::state::AppState;

const PAYMENT_INIT_FAILED: &str = "Payment initialization failed";

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub form: ShippingForm,
    pub lines: Vec<CartLine>,
    pub summary: CartSummary,
    /// Validation failure, shown above the form.
    pub error: Option<String>,
    /// Gateway refusal, shown as "Payment Error".
    pub payment_error: Option<String>,
}

/// Empty-cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/empty.html")]
pub struct EmptyCartTemplate {
    pub page: PageContext,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the checkout form.
#[instrument(skip(state, session, page, user), fields(email = %user.email))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    page: PageContext,
) -> Result<Response, AppError> {
    let lines = CartService::new(state.api(), &session, Some(&user))
        .lines()
        .await?;
    if lines.is_empty() {
        return Ok(EmptyCartTemplate { page }.into_response());
    }

    Ok(CheckoutTemplate {
        page,
        form: ShippingForm::prefilled(&user.name, &user.email),
        summary: CartSummary::of(&lines),
        lines,
        error: None,
        payment_error: None,
    }
    .into_response())
}

/// Validate the shipping form and start the gateway payment.
#[instrument(skip(state, session, page, user, form), fields(email = %user.email))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    page: PageContext,
    Form(mut form): Form<ShippingForm>,
) -> Result<Response, AppError> {
    // The email field is read-only in the form; the account's email wins.
    if form.email.trim().is_empty() {
        form.email.clone_from(&user.email);
    }

    let lines = CartService::new(state.api(), &session, Some(&user))
        .lines()
        .await?;
    let summary = CartSummary::of(&lines);

    let rerender = |page, form, lines, error: Option<String>, payment_error: Option<String>| {
        CheckoutTemplate {
            page,
            form,
            lines,
            summary,
            error,
            payment_error,
        }
        .into_response()
    };

    let customer_info = match form.validate() {
        Ok(info) => info,
        Err(e) => return Ok(rerender(page, form, lines, Some(e.to_string()), None)),
    };
    if lines.is_empty() {
        return Ok(rerender(
            page,
            form,
            lines,
            Some(CheckoutError::EmptyCart.to_string()),
            None,
        ));
    }

    let items = to_payment_items(&lines);
    let request = PaymentInitRequest {
        email: &user.email,
        cart_items: &items,
        total_amount: summary.total,
        customer_info: &customer_info,
    };

    match start_payment(&state, &user, &request).await? {
        Ok(url) => {
            add_breadcrumb("checkout", "Redirecting to payment gateway", None);
            Ok(Redirect::to(&url).into_response())
        }
        Err(message) => Ok(rerender(page, form, lines, None, Some(message))),
    }
}

/// Call `POST /payment/init`.
///
/// The outer result carries failures that end the request (an expired token);
/// the inner one carries the message to show when the gateway refused.
async fn start_payment(
    state: &AppState,
    user: &CurrentUser,
    request: &PaymentInitRequest<'_>,
) -> Result<Result<String, String>, AppError> {
    match state.api().init_payment(request, user.bearer()).await {
        Ok(response) => Ok(payment_url(response)),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(ApiError::Status { message, .. }) if !message.trim().is_empty() => Ok(Err(message)),
        Err(e) => {
            tracing::error!(error = %e, "Payment initialization failed");
            Ok(Err(PAYMENT_INIT_FAILED.to_string()))
        }
    }
}

/// The gateway URL from a successful response, or the message to show.
fn payment_url(response: PaymentInitResponse) -> Result<String, String> {
    match response {
        PaymentInitResponse {
            success: true,
            payment_url: Some(url),
            ..
        } if !url.is_empty() => Ok(url),
        PaymentInitResponse { error, message, .. } => Err(error
            .or(message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| PAYMENT_INIT_FAILED.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_url_success() {
        let response = PaymentInitResponse {
            success: true,
            payment_url: Some("https://sandbox.sslcommerz.com/gw/abc".to_string()),
            ..PaymentInitResponse::default()
        };
        assert_eq!(
            payment_url(response).as_deref(),
            Ok("https://sandbox.sslcommerz.com/gw/abc")
        );
    }

    #[test]
    fn test_payment_url_surfaces_api_error() {
        let response = PaymentInitResponse {
            error: Some("Store credentials invalid".to_string()),
            message: Some("ignored".to_string()),
            ..PaymentInitResponse::default()
        };
        assert_eq!(
            payment_url(response).unwrap_err(),
            "Store credentials invalid"
        );
    }

    #[test]
    fn test_payment_url_fallback_message() {
        let response = PaymentInitResponse {
            success: true,
            ..PaymentInitResponse::default()
        };
        assert_eq!(payment_url(response).unwrap_err(), PAYMENT_INIT_FAILED);
    }
}
