//! Product listing route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use grips_gears_core::ProductCategory;

use crate::api::Product;
use crate::error::AppError;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/category.html")]
pub struct CategoryTemplate {
    pub page: PageContext,
    pub category: ProductCategory,
    pub products: Vec<Product>,
    pub error: Option<String>,
}

/// Placeholder for categories not stocked yet.
#[derive(Template, WebTemplate)]
#[template(path = "products/coming_soon.html")]
pub struct ComingSoonTemplate {
    pub page: PageContext,
    pub title: &'static str,
}

/// Display the product grid of a category.
#[instrument(skip(state, page))]
pub async fn category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: PageContext,
) -> Result<Response, AppError> {
    if matches!(slug.as_str(), "engine-oil" | "engineoil" | "oil") {
        return Ok(ComingSoonTemplate {
            page,
            title: "Engine Oil & Fluids",
        }
        .into_response());
    }

    let category: ProductCategory = slug
        .parse()
        .map_err(|_| AppError::NotFound(format!("Category {slug}")))?;

    let (products, error) = match state.api().category_products(category).await {
        Ok(products) => (products.as_ref().clone(), None),
        Err(e) => {
            tracing::error!(error = %e, %category, "Failed to load category");
            (Vec::new(), Some("Failed to load products. Please try again later.".to_string()))
        }
    };

    Ok(CategoryTemplate {
        page,
        category,
        products,
        error,
    }
    .into_response())
}
