//! Product administration route handlers (admin only).
//!
//! Product images are uploaded to the image host first; the product record
//! then stores the hosted URL. Writes go to the category collection and the
//! aggregate collection (see `ApiClient::create_product`).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use grips_gears_core::{Price, ProductCategory, ProductId};

use crate::api::{ApiError, Product, ProductInput};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, push_flash};
use crate::models::{CurrentUser, Flash};
use crate::services::ImageUpload;
use crate::state::AppState;

/// Largest accepted product form (image included).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const MANAGE_PAGE: &str = "/dashboard/items";
const NEW_PAGE: &str = "/dashboard/items/new";

// =============================================================================
// Form Types
// =============================================================================

/// Product form fields as posted (multipart).
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub price: String,
    pub details: String,
    pub image: Option<ImageUpload>,
}

/// Per-field validation messages.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProductFormErrors {
    pub name: Option<&'static str>,
    pub category: Option<&'static str>,
    pub price: Option<&'static str>,
    pub details: Option<&'static str>,
    pub image: Option<&'static str>,
}

impl ProductFormErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.details.is_none()
            && self.image.is_none()
    }
}

/// Fields that passed validation.
#[derive(Debug)]
struct ValidProduct {
    name: String,
    category: Option<ProductCategory>,
    price: Price,
    details: String,
}

impl ProductForm {
    /// Read the multipart body. Unknown fields are ignored; an empty file
    /// input counts as no image.
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            match name.as_str() {
                "name" => form.name = value,
                "category" => form.category = value,
                "price" => form.price = value,
                "details" => form.details = value,
                _ => {}
            }
        }
        Ok(form)
    }

    /// Validate for creation: every field, image included, is required.
    fn validate_new(&self) -> Result<ValidProduct, ProductFormErrors> {
        let mut errors = self.common_errors();
        let category = self.category.parse::<ProductCategory>().ok();
        if self.category.trim().is_empty() {
            errors.category = Some("Category is required");
        } else if category.is_none() {
            errors.category = Some("Choose Helmet, Tyre or SpareParts");
        }
        if self.image.is_none() {
            errors.image = Some("Image is required");
        }
        self.finish(errors, category)
    }

    /// Validate for editing: the category is fixed and the image optional.
    fn validate_edit(&self) -> Result<ValidProduct, ProductFormErrors> {
        self.finish(self.common_errors(), None)
    }

    fn common_errors(&self) -> ProductFormErrors {
        let mut errors = ProductFormErrors::default();
        if self.name.trim().is_empty() {
            errors.name = Some("Product Name is required");
        }
        if self.price.trim().is_empty() {
            errors.price = Some("Price is required");
        } else if Price::parse(&self.price).map_or(true, |p| p.is_zero()) {
            errors.price = Some("Price must be a positive number");
        }
        if self.details.trim().is_empty() {
            errors.details = Some("Details is required");
        }
        errors
    }

    fn finish(
        &self,
        errors: ProductFormErrors,
        category: Option<ProductCategory>,
    ) -> Result<ValidProduct, ProductFormErrors> {
        if !errors.is_empty() {
            return Err(errors);
        }
        let price = Price::parse(&self.price).map_err(|_| ProductFormErrors {
            price: Some("Price must be a positive number"),
            ..ProductFormErrors::default()
        })?;
        Ok(ValidProduct {
            name: self.name.trim().to_string(),
            category,
            price,
            details: self.details.trim().to_string(),
        })
    }
}

/// Hidden fields of the delete button.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    pub category: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Manage Items page template.
#[derive(Template, WebTemplate)]
#[template(path = "items/index.html")]
pub struct ManageItemsTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
    pub error: Option<String>,
}

/// Add / edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "items/form.html")]
pub struct ItemFormTemplate {
    pub page: PageContext,
    /// `None` when adding a product.
    pub product_id: Option<String>,
    pub name: String,
    pub category: String,
    pub price: String,
    pub details: String,
    /// Current image URL (edit only).
    pub image: String,
    pub categories: [ProductCategory; 3],
    pub errors: ProductFormErrors,
    pub error: Option<String>,
    pub upload_enabled: bool,
}

impl ItemFormTemplate {
    fn blank(page: PageContext, upload_enabled: bool) -> Self {
        Self {
            page,
            product_id: None,
            name: String::new(),
            category: String::new(),
            price: String::new(),
            details: String::new(),
            image: String::new(),
            categories: ProductCategory::all(),
            errors: ProductFormErrors::default(),
            error: None,
            upload_enabled,
        }
    }

    fn for_product(page: PageContext, product: &Product, upload_enabled: bool) -> Self {
        Self {
            product_id: Some(product.id_str().to_string()),
            name: product.name.clone(),
            category: product.category.clone().unwrap_or_default(),
            price: product.price.amount().normalize().to_string(),
            details: product.details.clone(),
            image: product.image.clone(),
            ..Self::blank(page, upload_enabled)
        }
    }

    fn with_values(mut self, form: ProductForm) -> Self {
        self.name = form.name;
        if self.product_id.is_none() {
            self.category = form.category;
        }
        self.price = form.price;
        self.details = form.details;
        self
    }

    fn action(&self) -> String {
        self.product_id.as_ref().map_or_else(
            || NEW_PAGE.to_string(),
            |id| format!("/dashboard/items/{}/edit", urlencoding::encode(id)),
        )
    }
}

// =============================================================================
// Manage Routes
// =============================================================================

/// Display every product with edit and delete actions.
#[instrument(skip(state, page, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
) -> impl IntoResponse {
    let (products, error) = match state.api().all_products().await {
        Ok(products) => (products.as_ref().clone(), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products");
            (Vec::new(), Some("Failed to load products. Please try again.".to_string()))
        }
    };
    ManageItemsTemplate {
        page,
        products,
        error,
    }
}

// =============================================================================
// Add Routes
// =============================================================================

/// Display the add-product form.
pub async fn new_page(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
) -> impl IntoResponse {
    ItemFormTemplate::blank(page, state.image_host().is_configured())
}

/// Create a product.
#[instrument(skip(state, session, page, admin, multipart), fields(email = %admin.email))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = ProductForm::read(multipart).await?;
    let upload_enabled = state.image_host().is_configured();

    let valid = match form.validate_new() {
        Ok(valid) => valid,
        Err(errors) => {
            let mut template = ItemFormTemplate::blank(page, upload_enabled).with_values(form);
            template.errors = errors;
            return Ok(template.into_response());
        }
    };
    let (Some(category), Some(image)) = (valid.category, form.image.take()) else {
        return Err(AppError::Internal("validated product form incomplete".to_string()));
    };

    let image = match state.image_host().upload(image).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "Product image upload failed");
            let mut template = ItemFormTemplate::blank(page, upload_enabled).with_values(form);
            template.error = Some("Image upload failed. Please try again.".to_string());
            return Ok(template.into_response());
        }
    };

    let input = ProductInput {
        name: valid.name,
        category,
        price: valid.price,
        details: valid.details,
        image,
    };
    match state.api().create_product(&input, admin.bearer()).await {
        Ok(id) => {
            tracing::info!(product_id = %id, "Product created");
            push_flash(
                &session,
                Flash::success(format!("{} is added successfully", input.name)),
            )
            .await;
            Ok(Redirect::to(NEW_PAGE).into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create product");
            let mut template = ItemFormTemplate::blank(page, upload_enabled).with_values(form);
            template.error = Some("Failed to add product. Please try again.".to_string());
            Ok(template.into_response())
        }
    }
}

// =============================================================================
// Edit Routes
// =============================================================================

/// Display the edit form for a product.
#[instrument(skip(state, session, page, _admin))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    page: PageContext,
) -> Result<Response, AppError> {
    match state.api().product(&ProductId::new(id)).await {
        Ok(product) => Ok(ItemFormTemplate::for_product(
            page,
            &product,
            state.image_host().is_configured(),
        )
        .into_response()),
        Err(ApiError::NotFound(_)) => {
            push_flash(&session, Flash::error("Product not found")).await;
            Ok(Redirect::to(MANAGE_PAGE).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Update a product. The category cannot change.
#[instrument(skip(state, session, page, admin, multipart), fields(email = %admin.email))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    page: PageContext,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let id = ProductId::new(id);
    let mut form = ProductForm::read(multipart).await?;

    let existing = match state.api().product(&id).await {
        Ok(product) => product,
        Err(ApiError::NotFound(_)) => {
            push_flash(&session, Flash::error("Product not found")).await;
            return Ok(Redirect::to(MANAGE_PAGE).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let valid = match form.validate_edit() {
        Ok(valid) => valid,
        Err(errors) => {
            let mut template =
                ItemFormTemplate::for_product(page, &existing, state.image_host().is_configured())
                    .with_values(form);
            template.errors = errors;
            return Ok(template.into_response());
        }
    };

    match apply_update(&state, &admin, &id, &existing, valid, form.image.take()).await {
        Ok(()) => {
            push_flash(&session, Flash::success("Product updated successfully!")).await;
            Ok(Redirect::to(MANAGE_PAGE).into_response())
        }
        Err(e) if e.is_session_expired() => Err(e),
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Product update failed");
            push_flash(&session, Flash::error("Update failed")).await;
            Ok(Redirect::to(&format!(
                "/dashboard/items/{}/edit",
                urlencoding::encode(id.as_str())
            ))
            .into_response())
        }
    }
}

async fn apply_update(
    state: &AppState,
    admin: &CurrentUser,
    id: &ProductId,
    existing: &Product,
    valid: ValidProduct,
    image: Option<ImageUpload>,
) -> Result<(), AppError> {
    let category = existing
        .category()
        .ok_or_else(|| AppError::BadRequest("product has no known category".to_string()))?;

    let image = match image {
        Some(upload) => state.image_host().upload(upload).await?,
        None => existing.image.clone(),
    };

    let input = ProductInput {
        name: valid.name,
        category,
        price: valid.price,
        details: valid.details,
        image,
    };
    state.api().update_product(id, &input, admin.bearer()).await?;
    Ok(())
}

// =============================================================================
// Delete Route
// =============================================================================

/// Delete a product from both collections.
#[instrument(skip(state, session, admin, form), fields(email = %admin.email))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    let id = ProductId::new(id);
    let mut category = form.category.parse::<ProductCategory>().ok();

    match state.api().product(&id).await {
        Ok(product) => category = product.category().or(category),
        Err(ApiError::NotFound(_)) => {
            push_flash(
                &session,
                Flash::error(
                    "Product no longer exists. The page data might be outdated. Please refresh the page.",
                ),
            )
            .await;
            return Ok(Redirect::to(MANAGE_PAGE));
        }
        Err(e) => tracing::warn!(error = %e, product_id = %id, "Product existence check failed"),
    }

    let deleted = match state.api().delete_product(&id, admin.bearer()).await {
        Ok(count) => count,
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Product delete failed");
            push_flash(&session, Flash::error("Failed to delete product. Please try again.")).await;
            return Ok(Redirect::to(MANAGE_PAGE));
        }
    };

    if deleted == 0 {
        push_flash(&session, Flash::error("Product not found or already deleted")).await;
        return Ok(Redirect::to(MANAGE_PAGE));
    }

    match category {
        Some(category) => {
            if let Err(e) = state
                .api()
                .delete_category_product(category, &id, admin.bearer())
                .await
            {
                tracing::warn!(error = %e, product_id = %id, %category, "Category delete failed");
            }
        }
        None => tracing::warn!(product_id = %id, "Deleted product had no known category"),
    }

    push_flash(
        &session,
        Flash::success("Your product has been deleted successfully."),
    )
    .await;
    Ok(Redirect::to(MANAGE_PAGE))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, category: &str, price: &str, details: &str, image: bool) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            category: category.to_string(),
            price: price.to_string(),
            details: details.to_string(),
            image: image.then(|| ImageUpload {
                file_name: "helmet.jpg".to_string(),
                content_type: Some("image/jpeg".to_string()),
                bytes: vec![0xFF, 0xD8, 0xFF],
            }),
        }
    }

    #[test]
    fn test_validate_new_reports_every_missing_field() {
        let errors = form("", "", "", "", false).validate_new().unwrap_err();
        assert_eq!(
            errors,
            ProductFormErrors {
                name: Some("Product Name is required"),
                category: Some("Category is required"),
                price: Some("Price is required"),
                details: Some("Details is required"),
                image: Some("Image is required"),
            }
        );
    }

    #[test]
    fn test_validate_new_accepts_complete_form() {
        let valid = form("MT Thunder", "Helmet", "5500.50", "DOT certified", true)
            .validate_new()
            .unwrap();
        assert_eq!(valid.category, Some(ProductCategory::Helmet));
        assert_eq!(valid.price, Price::parse("5500.50").unwrap());
    }

    #[test]
    fn test_validate_new_rejects_bad_price() {
        let errors = form("Chain", "SpareParts", "abc", "x", true)
            .validate_new()
            .unwrap_err();
        assert_eq!(errors.price, Some("Price must be a positive number"));
    }

    #[test]
    fn test_validate_edit_ignores_category_and_image() {
        assert!(form("Chain", "", "850", "O-ring", false).validate_edit().is_ok());
    }

    mod delete_route {
        use axum::http::{Method, StatusCode, header};
        use serde_json::json;

        use super::*;
        use crate::middleware::take_flashes;
        use crate::testing::{MockApi, admin, session};

        async fn delete_visor(mock: &MockApi, category: &str) -> (Response, Vec<Flash>) {
            let state = mock.state().await;
            let session = session();
            let redirect = delete(
                State(state),
                session.clone(),
                RequireAdmin(admin("admin@example.com")),
                Path("p1".to_string()),
                Form(DeleteForm {
                    category: category.to_string(),
                }),
            )
            .await
            .unwrap();
            (redirect.into_response(), take_flashes(&session).await)
        }

        fn visor() -> serde_json::Value {
            json!({"_id": "p1", "name": "Visor", "category": "Helmet", "price": 1200})
        }

        #[tokio::test]
        async fn test_nothing_deleted_reports_missing_product() {
            let mock = MockApi::new()
                .ok(Method::GET, "/allproducts/p1", visor())
                .ok(Method::DELETE, "/allproducts/p1", json!({"deletedCount": 0}));

            let (response, flashes) = delete_visor(&mock, "helmet").await;
            assert_eq!(response.headers()[header::LOCATION], MANAGE_PAGE);
            assert_eq!(flashes, [Flash::error("Product not found or already deleted")]);
            assert_eq!(mock.calls(&Method::DELETE, "/helmet/p1"), 0);
        }

        #[tokio::test]
        async fn test_failed_category_delete_is_only_logged() {
            let mock = MockApi::new()
                .ok(Method::GET, "/allproducts/p1", visor())
                .ok(Method::DELETE, "/allproducts/p1", json!({"deletedCount": 1}))
                .respond(
                    Method::DELETE,
                    "/helmet/p1",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"message": "write failed"}),
                );

            let (response, flashes) = delete_visor(&mock, "helmet").await;
            assert_eq!(response.headers()[header::LOCATION], MANAGE_PAGE);
            assert_eq!(
                flashes,
                [Flash::success("Your product has been deleted successfully.")]
            );
            assert_eq!(mock.calls(&Method::DELETE, "/helmet/p1"), 1);
        }

        #[tokio::test]
        async fn test_category_comes_from_stored_product() {
            let mock = MockApi::new()
                .ok(Method::GET, "/allproducts/p1", visor())
                .ok(Method::DELETE, "/allproducts/p1", json!({"deletedCount": 1}))
                .ok(Method::DELETE, "/helmet/p1", json!({"deletedCount": 1}));

            let (_, flashes) = delete_visor(&mock, "tyre").await;
            assert_eq!(flashes[0].kind, crate::models::FlashKind::Success);
            assert_eq!(mock.calls(&Method::DELETE, "/helmet/p1"), 1);
            assert_eq!(mock.calls(&Method::DELETE, "/tyre/p1"), 0);
        }

        #[tokio::test]
        async fn test_vanished_product_is_not_deleted() {
            let mock = MockApi::new();

            let (_, flashes) = delete_visor(&mock, "helmet").await;
            assert!(flashes[0].message.starts_with("Product no longer exists."));
            assert_eq!(mock.calls(&Method::DELETE, "/allproducts/p1"), 0);
        }
    }
}
