//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use grips_gears_core::ProductCategory;

use crate::api::Product;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// A promotional tile in the home page banner.
#[derive(Clone)]
pub struct Banner {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub href: &'static str,
    pub image: &'static str,
}

/// Banner tiles, in display order.
pub const BANNERS: [Banner; 4] = [
    Banner {
        title: "Engine Oil & Fluids",
        subtitle: "Keep your engine running smooth",
        href: "/products/engine-oil",
        image: "/static/images/banner-oil.svg",
    },
    Banner {
        title: "Helmets",
        subtitle: "Certified protection for every ride",
        href: "/products/helmet",
        image: "/static/images/banner-helmet.svg",
    },
    Banner {
        title: "Spare Parts",
        subtitle: "Chains, brakes, filters and more",
        href: "/products/spareparts",
        image: "/static/images/banner-parts.svg",
    },
    Banner {
        title: "Tyres",
        subtitle: "Grip for city streets and highways",
        href: "/products/tyre",
        image: "/static/images/banner-tyre.svg",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub banners: &'static [Banner],
    pub category: ProductCategory,
    pub products: Vec<Product>,
    pub error: Option<String>,
}

/// Display the home page: banner and the helmet grid.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let (products, error) = match state.api().category_products(ProductCategory::Helmet).await {
        Ok(products) => (products.as_ref().clone(), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load helmets for home page");
            (Vec::new(), Some("Failed to load products. Please try again later.".to_string()))
        }
    };

    HomeTemplate {
        page,
        banners: &BANNERS,
        category: ProductCategory::Helmet,
        products,
        error,
    }
}
