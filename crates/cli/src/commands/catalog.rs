//! Catalog listing.

use grips_gears_core::ProductCategory;
use grips_gears_storefront::api::Product;

use super::{CommandError, api_client};

/// Print one category, or every product when `category` is `None`.
///
/// # Errors
///
/// Fails when the catalog request fails.
pub async fn print(category: Option<ProductCategory>) -> Result<(), CommandError> {
    let api = api_client()?;
    let products = match category {
        Some(category) => api.category_products(category).await?,
        None => api.all_products().await?,
    };

    if products.is_empty() {
        tracing::info!("No products found");
        return Ok(());
    }

    print_products(&products);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product]) {
    println!("{:<26} {:<12} {:>12}  Name", "Id", "Category", "Price");
    for product in products {
        println!(
            "{:<26} {:<12} {:>12}  {}",
            product.id_str(),
            product
                .category()
                .map_or_else(|| product.category.clone().unwrap_or_default(), |c| c.to_string()),
            product.price.display(),
            product.name
        );
    }
}
