//! Product catalog endpoints.
//!
//! Every product lives in its category collection (`/helmet`, `/tyre`,
//! `/spareparts`) and is mirrored into `/allproducts` under the same id.
//! Writes therefore touch both collections.

use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, instrument};

use grips_gears_core::{ProductCategory, ProductId};

use super::cache::CatalogKey;
use super::{
    ApiClient, ApiError, DeleteResult, InsertResult, MirroredProduct, Product, ProductInput,
    UpdateResult, decode_listing, with_fallback_ids,
};

const ALL_PRODUCTS: &str = "/allproducts";

impl ApiClient {
    /// List the products of one category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn category_products(
        &self,
        category: ProductCategory,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_listing(CatalogKey::Category(category), &format!("/{}", category.collection()))
            .await
    }

    /// List every product (the aggregate collection).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_listing(CatalogKey::All, ALL_PRODUCTS).await
    }

    /// Fetch a single product from the aggregate collection.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.get_json(&format!("{ALL_PRODUCTS}/{}", encode(id.as_str())), None)
            .await
    }

    /// Create a product in its category and mirror it into `allproducts`.
    ///
    /// Returns the id the category collection issued.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the category insert reports no id,
    /// or any transport error from either write.
    #[instrument(skip(self, input, token), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: &ProductInput,
        token: &str,
    ) -> Result<ProductId, ApiError> {
        let inserted: InsertResult = self
            .send_json(
                Method::POST,
                &format!("/{}", input.category.collection()),
                input,
                token,
            )
            .await?;

        let id = inserted
            .inserted_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::Rejected("product was not inserted".to_string()))?;

        let mirror = MirroredProduct {
            id: &id,
            product: input,
        };
        let mirrored = self
            .send_json::<_, InsertResult>(Method::POST, ALL_PRODUCTS, &mirror, token)
            .await;

        // The category insert already landed.
        self.invalidate_catalog().await;
        mirrored?;
        Ok(ProductId::new(id))
    }

    /// Update a product in `allproducts` and then in its category collection.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if either write fails.
    #[instrument(skip(self, input, token), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
        token: &str,
    ) -> Result<(), ApiError> {
        let id_segment = encode(id.as_str());
        let _: UpdateResult = self
            .send_json(
                Method::PUT,
                &format!("{ALL_PRODUCTS}/{id_segment}"),
                input,
                token,
            )
            .await?;
        let result = self
            .send_json::<_, UpdateResult>(
                Method::PUT,
                &format!("/{}/{id_segment}", input.category.collection()),
                input,
                token,
            )
            .await;

        self.invalidate_catalog().await;
        result.map(|_| ())
    }

    /// Delete a product from `allproducts`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId, token: &str) -> Result<u64, ApiError> {
        let result: DeleteResult = self
            .send_empty(
                Method::DELETE,
                &format!("{ALL_PRODUCTS}/{}", encode(id.as_str())),
                token,
            )
            .await?;
        self.invalidate_catalog().await;
        Ok(result.deleted_count)
    }

    /// Delete a product from its category collection.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_category_product(
        &self,
        category: ProductCategory,
        id: &ProductId,
        token: &str,
    ) -> Result<u64, ApiError> {
        let result: DeleteResult = self
            .send_empty(
                Method::DELETE,
                &format!("/{}/{}", category.collection(), encode(id.as_str())),
                token,
            )
            .await?;
        self.invalidate_catalog().await;
        Ok(result.deleted_count)
    }

    async fn cached_listing(
        &self,
        key: CatalogKey,
        path: &str,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(cache) = &self.inner.catalog
            && let Some(products) = cache.get(&key).await
        {
            debug!(?key, "Catalog cache hit");
            return Ok(products);
        }

        let records: Vec<serde_json::Value> = self.get_json(path, None).await?;
        let products = Arc::new(with_fallback_ids(decode_listing(records)));

        if let Some(cache) = &self.inner.catalog {
            cache.insert(key, Arc::clone(&products)).await;
        }
        Ok(products)
    }

    /// Drop every cached listing.
    pub async fn invalidate_catalog(&self) {
        if let Some(cache) = &self.inner.catalog {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
        }
    }
}

/// Percent-encode a path segment.
pub(super) fn encode(segment: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(segment)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use grips_gears_core::Price;

    use super::*;
    use crate::testing::MockApi;

    fn visor() -> ProductInput {
        ProductInput {
            name: "Tinted Visor".to_string(),
            category: ProductCategory::Helmet,
            price: Price::from_taka(1200),
            details: "Fits most full-face helmets".to_string(),
            image: "https://img.example/visor.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_product_mirrors_under_category_id() {
        let mock = MockApi::new()
            .ok(Method::POST, "/helmet", json!({"insertedId": "665f1c"}))
            .ok(Method::POST, "/allproducts", json!({"insertedId": "665f1c"}));
        let state = mock.state().await;

        let id = state.api().create_product(&visor(), "token").await.unwrap();
        assert_eq!(id.as_str(), "665f1c");

        let mirrored = mock.bodies(&Method::POST, "/allproducts");
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0]["_id"], "665f1c");
        assert_eq!(mirrored[0]["name"], "Tinted Visor");
        assert_eq!(mirrored[0]["price"], 1200);
    }

    #[tokio::test]
    async fn test_create_product_without_inserted_id_skips_mirror() {
        let mock = MockApi::new().ok(Method::POST, "/helmet", json!({}));
        let state = mock.state().await;

        let err = state.api().create_product(&visor(), "token").await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
        assert_eq!(mock.calls(&Method::POST, "/allproducts"), 0);
    }

    #[tokio::test]
    async fn test_create_product_invalidates_listing_cache() {
        let mock = MockApi::new()
            .ok(Method::GET, "/helmet", json!([{"_id": "a", "name": "Open Face", "price": 4500}]))
            .ok(Method::POST, "/helmet", json!({"insertedId": "b"}))
            .ok(Method::POST, "/allproducts", json!({"insertedId": "b"}));
        let state = mock
            .state_with(|config| config.api.catalog_cache_ttl = Duration::from_secs(300))
            .await;
        let api = state.api();

        api.category_products(ProductCategory::Helmet).await.unwrap();
        api.category_products(ProductCategory::Helmet).await.unwrap();
        assert_eq!(mock.calls(&Method::GET, "/helmet"), 1);

        api.create_product(&visor(), "token").await.unwrap();
        api.category_products(ProductCategory::Helmet).await.unwrap();
        assert_eq!(mock.calls(&Method::GET, "/helmet"), 2);
    }

    #[tokio::test]
    async fn test_failed_mirror_still_invalidates_listing_cache() {
        let mock = MockApi::new()
            .ok(Method::GET, "/helmet", json!([]))
            .ok(Method::POST, "/helmet", json!({"insertedId": "b"}))
            .respond(
                Method::POST,
                "/allproducts",
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                json!({"message": "write failed"}),
            );
        let state = mock
            .state_with(|config| config.api.catalog_cache_ttl = Duration::from_secs(300))
            .await;
        let api = state.api();

        api.category_products(ProductCategory::Helmet).await.unwrap();
        let err = api.create_product(&visor(), "token").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { .. }));

        api.category_products(ProductCategory::Helmet).await.unwrap();
        assert_eq!(mock.calls(&Method::GET, "/helmet"), 2);
    }

    #[tokio::test]
    async fn test_listing_skips_malformed_records() {
        let mock = MockApi::new().ok(
            Method::GET,
            "/tyre",
            json!([
                {"_id": "t1", "name": "Sport 120/70", "price": 5200},
                {"_id": "t2", "name": "Touring 160/60"},
                {"_id": "t3", "price": 800}
            ]),
        );
        let state = mock.state().await;

        let tyres = state.api().category_products(ProductCategory::Tyre).await.unwrap();
        let names: Vec<&str> = tyres.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Sport 120/70", "Touring 160/60"]);
    }
}
