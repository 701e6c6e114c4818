//! Order history and invoice route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use grips_gears_core::TransactionId;

use crate::api::{ApiError, Order};
use crate::error::AppError;
use crate::filters;
use crate::invoice;
use crate::middleware::{PageContext, RequireUser};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// My Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<Order>,
    pub error: Option<String>,
}

/// Order details page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderTemplate {
    pub page: PageContext,
    pub order: Order,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the signed-in user's orders.
#[instrument(skip(state, page, user), fields(email = %user.email))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    page: PageContext,
) -> Result<Response, AppError> {
    let (orders, error) = match state.api().orders(&user.email, user.bearer()).await {
        Ok(orders) => (orders, None),
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load orders");
            (Vec::new(), Some("Failed to load orders. Please try again.".to_string()))
        }
    };

    Ok(OrdersTemplate {
        page,
        orders,
        error,
    }
    .into_response())
}

/// Display one order.
#[instrument(skip(state, page, user), fields(email = %user.email))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(tran_id): Path<String>,
    page: PageContext,
) -> Result<Response, AppError> {
    let order = owned_order(&state, &user, TransactionId::new(tran_id)).await?;
    Ok(OrderTemplate { page, order }.into_response())
}

/// Download the PDF invoice of a paid order.
#[instrument(skip(state, user), fields(email = %user.email))]
pub async fn invoice(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(tran_id): Path<String>,
) -> Result<Response, AppError> {
    let order = owned_order(&state, &user, TransactionId::new(tran_id)).await?;
    let bytes = invoice::render(&order, &state.config().store)?;
    let disposition = format!("attachment; filename=\"{}\"", invoice::file_name(&order));

    tracing::info!(size = bytes.len(), "Invoice rendered");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Fetch an order, treating other users' orders as missing.
async fn owned_order(
    state: &AppState,
    user: &CurrentUser,
    tran_id: TransactionId,
) -> Result<Order, AppError> {
    let order = state
        .api()
        .order(&tran_id, user.bearer())
        .await
        .map_err(|e| match e {
            ApiError::NotFound(_) => AppError::NotFound(format!("Order {tran_id}")),
            other => other.into(),
        })?;

    if order.belongs_to(&user.email) {
        Ok(order)
    } else {
        tracing::warn!(%tran_id, "Order requested by another user");
        Err(AppError::NotFound(format!("Order {tran_id}")))
    }
}
