//! Cart route handlers.
//!
//! All mutations are plain form posts followed by a redirect, so the cart
//! works without client script. [`CartService`] decides whether the session
//! cart or the remote cart is in play.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use grips_gears_core::{ProductCategory, ProductId};

use crate::api::{ApiError, Product};
use crate::cart::{CartLine, CartSummary};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalUser, PageContext, RequireUser, push_flash};
use crate::models::Flash;
use crate::services::cart::CartService;
use crate::state::AppState;

use super::local_path;

/// Where cart actions land when no return path is given.
pub const CART_PAGE: &str = "/dashboard/cart";

// =============================================================================
// Form Types
// =============================================================================

/// Add-to-cart form posted by product cards.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    /// Category of the listing the card was on; narrows the product lookup.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub return_to: Option<String>,
    /// Present for "Buy Now": go straight to the cart.
    #[serde(default)]
    pub buy_now: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// My Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub lines: Vec<CartLine>,
    pub summary: CartSummary,
    pub error: Option<String>,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the cart.
#[instrument(skip(state, session, page, user), fields(email = %user.email))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    page: PageContext,
) -> Result<Response, AppError> {
    let (lines, error) = match CartService::new(state.api(), &session, Some(&user))
        .lines()
        .await
    {
        Ok(lines) => (lines, None),
        Err(e) if e.is_session_expired() => return Err(e),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load cart");
            (Vec::new(), Some("Failed to load your cart. Please try again.".to_string()))
        }
    };

    Ok(CartTemplate {
        page,
        summary: CartSummary::of(&lines),
        lines,
        error,
    }
    .into_response())
}

/// Add one unit of a product to the cart.
#[instrument(skip(state, session, user, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect, AppError> {
    let category = form
        .category
        .as_deref()
        .and_then(|c| c.parse::<ProductCategory>().ok());
    let product = find_product(&state, &form.product_id, category).await?;

    CartService::new(state.api(), &session, user.as_ref())
        .add(&product)
        .await?;
    push_flash(
        &session,
        Flash::success(format!("{} added to your cart", product.name)),
    )
    .await;

    if form.buy_now.is_some() {
        return Ok(Redirect::to(CART_PAGE));
    }
    Ok(Redirect::to(
        local_path(form.return_to.as_deref()).unwrap_or("/"),
    ))
}

/// Increase a line's quantity by one.
#[instrument(skip(state, session, user))]
pub async fn increase(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    CartService::new(state.api(), &session, user.as_ref())
        .adjust(&id, 1)
        .await?;
    Ok(Redirect::to(CART_PAGE))
}

/// Decrease a line's quantity by one; a single unit stays.
#[instrument(skip(state, session, user))]
pub async fn decrease(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    CartService::new(state.api(), &session, user.as_ref())
        .adjust(&id, -1)
        .await?;
    Ok(Redirect::to(CART_PAGE))
}

/// Remove a line.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let removed = CartService::new(state.api(), &session, user.as_ref())
        .remove(&id)
        .await?;
    let flash = if removed {
        Flash::success("Your item has been removed from cart.")
    } else {
        Flash::warning("That item was already removed from your cart.")
    };
    push_flash(&session, flash).await;
    Ok(Redirect::to(CART_PAGE))
}

/// Proceed to checkout, unless the cart is empty.
#[instrument(skip(state, session, user), fields(email = %user.email))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<Redirect, AppError> {
    let lines = CartService::new(state.api(), &session, Some(&user))
        .lines()
        .await?;
    if lines.is_empty() {
        push_flash(
            &session,
            Flash::warning("Please add items to your cart before checkout."),
        )
        .await;
        return Ok(Redirect::to(CART_PAGE));
    }
    Ok(Redirect::to("/checkout"))
}

// =============================================================================
// Helpers
// =============================================================================

/// Look a product up by id: the card's category listing first, then the
/// aggregate listing, then the product endpoint.
///
/// Listing ids may be positional fallbacks, so the listings are searched
/// before asking the API for the id directly.
async fn find_product(
    state: &AppState,
    id: &str,
    category: Option<ProductCategory>,
) -> Result<Product, AppError> {
    if let Some(category) = category {
        match state.api().category_products(category).await {
            Ok(products) => {
                if let Some(product) = products.iter().find(|p| p.id_str() == id) {
                    return Ok(product.clone());
                }
            }
            Err(e) => tracing::warn!(error = %e, %category, "Category lookup failed"),
        }
    }

    match state.api().all_products().await {
        Ok(products) => {
            if let Some(product) = products.iter().find(|p| p.id_str() == id) {
                return Ok(product.clone());
            }
        }
        Err(e) => tracing::warn!(error = %e, "All-products lookup failed"),
    }

    state
        .api()
        .product(&ProductId::new(id))
        .await
        .map_err(|e| match e {
            ApiError::NotFound(_) => AppError::NotFound("Product".to_string()),
            other => other.into(),
        })
}
