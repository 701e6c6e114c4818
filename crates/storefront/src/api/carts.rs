//! Remote cart endpoints (signed-in users).

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use grips_gears_core::CartItemId;

use super::catalog::encode;
use super::{ApiClient, ApiError, CartItem, DeleteResult, InsertResult, NewCartItem, UpdateResult};

#[derive(Serialize)]
struct QuantityUpdate {
    quantity: u32,
}

impl ApiClient {
    /// List the cart lines stored for `email`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token has expired.
    #[instrument(skip(self, token))]
    pub async fn cart_items(&self, email: &str, token: &str) -> Result<Vec<CartItem>, ApiError> {
        self.get_json(&format!("/carts?email={}", encode(email)), Some(token))
            .await
    }

    /// Add a product to the remote cart.
    ///
    /// The API either inserts a new line or bumps the quantity of an existing
    /// one for the same product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the API reports neither outcome.
    #[instrument(skip(self, item, token), fields(product_id = item.product_id))]
    pub async fn add_cart_item(&self, item: &NewCartItem<'_>, token: &str) -> Result<(), ApiError> {
        let result: InsertResult = self.send_json(Method::POST, "/carts", item, token).await?;
        if result.succeeded() {
            Ok(())
        } else {
            Err(ApiError::Rejected(format!(
                "{} was not added to the cart",
                item.name
            )))
        }
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token), fields(cart_item_id = %id))]
    pub async fn set_cart_quantity(
        &self,
        id: &CartItemId,
        quantity: u32,
        token: &str,
    ) -> Result<(), ApiError> {
        let _: UpdateResult = self
            .send_json(
                Method::PATCH,
                &format!("/carts/{}", encode(id.as_str())),
                &QuantityUpdate { quantity },
                token,
            )
            .await?;
        Ok(())
    }

    /// Remove a cart line. Returns whether anything was deleted.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token), fields(cart_item_id = %id))]
    pub async fn remove_cart_item(&self, id: &CartItemId, token: &str) -> Result<bool, ApiError> {
        let result: DeleteResult = self
            .send_empty(
                Method::DELETE,
                &format!("/carts/{}", encode(id.as_str())),
                token,
            )
            .await?;
        Ok(result.deleted_count > 0)
    }
}
