//! The active cart for a request.
//!
//! Visitors use the session-backed [`LocalCart`]; signed-in users use the
//! remote cart store keyed by their email. Handlers go through [`CartService`]
//! so they never branch on which one is in play.

use tower_sessions::Session;
use tracing::{instrument, warn};

use grips_gears_core::CartItemId;

use crate::api::{ApiClient, ApiError, NewCartItem, Product};
use crate::cart::{CartLine, LocalCart};
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::models::session::keys;

/// Cart operations for the current visitor.
pub struct CartService<'a> {
    api: &'a ApiClient,
    session: &'a Session,
    user: Option<&'a CurrentUser>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: &'a Session, user: Option<&'a CurrentUser>) -> Self {
        Self { api, session, user }
    }

    /// Current cart lines.
    ///
    /// # Errors
    ///
    /// Returns error if the remote cart cannot be loaded or the session
    /// store fails.
    pub async fn lines(&self) -> Result<Vec<CartLine>, AppError> {
        match self.user {
            Some(user) => Ok(self
                .api
                .cart_items(&user.email, user.bearer())
                .await?
                .into_iter()
                .map(CartLine::from)
                .collect()),
            None => Ok(self.local().await?.lines().to_vec()),
        }
    }

    /// Number of lines, for the navigation badge. Failures count as empty.
    pub async fn count(&self) -> usize {
        match self.lines().await {
            Ok(lines) => lines.len(),
            Err(e) => {
                warn!(error = %e, "Failed to load cart count");
                0
            }
        }
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns error if the remote cart rejects the item or the session
    /// store fails.
    #[instrument(skip(self, product), fields(product_id = %product.id_str()))]
    pub async fn add(&self, product: &Product) -> Result<(), AppError> {
        match self.user {
            Some(user) => {
                self.api
                    .add_cart_item(
                        &NewCartItem {
                            product_id: product.id_str(),
                            name: &product.name,
                            image: &product.image,
                            price: product.price,
                            email: &user.email,
                            quantity: 1,
                        },
                        user.bearer(),
                    )
                    .await?;
                Ok(())
            }
            None => {
                let mut cart = self.local().await?;
                cart.add(product);
                self.save_local(&cart).await
            }
        }
    }

    /// Change a line's quantity by `delta` (never below 1).
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown line.
    #[instrument(skip(self))]
    pub async fn adjust(&self, line_id: &str, delta: i32) -> Result<(), AppError> {
        match self.user {
            Some(user) => {
                let lines = self.lines().await?;
                let line = lines
                    .iter()
                    .find(|l| l.id == line_id)
                    .ok_or_else(|| AppError::NotFound("Cart item".to_string()))?;
                let next = i64::from(line.effective_quantity()) + i64::from(delta);
                let quantity = u32::try_from(next.max(1)).unwrap_or(1);
                if quantity == line.quantity {
                    return Ok(());
                }
                self.api
                    .set_cart_quantity(&CartItemId::from(line_id), quantity, user.bearer())
                    .await?;
                Ok(())
            }
            None => {
                let mut cart = self.local().await?;
                if !cart.update_quantity(line_id, delta) {
                    return Err(AppError::NotFound("Cart item".to_string()));
                }
                self.save_local(&cart).await
            }
        }
    }

    /// Remove a line. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns error if the remote call or the session store fails.
    #[instrument(skip(self))]
    pub async fn remove(&self, line_id: &str) -> Result<bool, AppError> {
        match self.user {
            Some(user) => Ok(self
                .api
                .remove_cart_item(&CartItemId::from(line_id), user.bearer())
                .await?),
            None => {
                let mut cart = self.local().await?;
                let removed = cart.remove(line_id);
                self.save_local(&cart).await?;
                Ok(removed)
            }
        }
    }

    async fn local(&self) -> Result<LocalCart, AppError> {
        Ok(self
            .session
            .get::<LocalCart>(keys::LOCAL_CART)
            .await?
            .unwrap_or_default())
    }

    async fn save_local(&self, cart: &LocalCart) -> Result<(), AppError> {
        self.session.insert(keys::LOCAL_CART, cart).await?;
        Ok(())
    }
}

/// Move a visitor's session cart into the remote cart after sign-in.
///
/// Lines the remote store refuses are logged and dropped; the session cart is
/// cleared either way. Returns the number of lines merged.
///
/// # Errors
///
/// Returns error only if the session store fails.
#[instrument(skip(api, session, user), fields(email = %user.email))]
pub async fn merge_local_cart(
    api: &ApiClient,
    session: &Session,
    user: &CurrentUser,
) -> Result<usize, AppError> {
    let Some(mut cart) = session.remove::<LocalCart>(keys::LOCAL_CART).await? else {
        return Ok(0);
    };

    let mut merged = 0;
    for line in cart.drain() {
        let item = NewCartItem {
            product_id: &line.product_id,
            name: &line.name,
            image: &line.image,
            price: line.price,
            email: &user.email,
            quantity: line.effective_quantity(),
        };
        match api.add_cart_item(&item, user.bearer()).await {
            Ok(()) => merged += 1,
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
            Err(e) => warn!(error = %e, product_id = %line.product_id, "Failed to merge cart line"),
        }
    }
    Ok(merged)
}
