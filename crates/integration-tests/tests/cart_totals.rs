//! Cart and checkout rules exercised through the storefront library.

use grips_gears_core::Price;
use grips_gears_storefront::api::Product;
use grips_gears_storefront::cart::{CartSummary, LocalCart};
use grips_gears_storefront::checkout::{CheckoutError, ShippingForm};

fn product(id: &str, name: &str, price: i64) -> Product {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "name": name,
        "category": "Helmet",
        "price": price,
        "image": "https://i.ibb.co/helmet.png",
    }))
    .unwrap()
}

#[test]
fn test_visitor_cart_totals() {
    let mut cart = LocalCart::default();
    cart.add(&product("h1", "Full Face Helmet", 4500));
    cart.add(&product("t1", "Road Tyre", 2500));
    cart.add(&product("h1", "Full Face Helmet", 4500));

    let summary = CartSummary::of(cart.lines());
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.items_label(), "2 items");
    assert_eq!(summary.subtotal, Price::from_taka(11_500));
    assert_eq!(summary.shipping_label(), "FREE");
    assert_eq!(summary.total, summary.subtotal);
}

#[test]
fn test_quantity_never_drops_below_one() {
    let mut cart = LocalCart::default();
    cart.add(&product("h1", "Full Face Helmet", 4500));
    assert!(cart.update_quantity("h1", -1));
    assert!(cart.update_quantity("h1", -1));
    assert_eq!(cart.lines().first().map(|l| l.quantity), Some(1));

    assert!(cart.remove("h1"));
    assert!(cart.is_empty());
    assert!(CartSummary::of(cart.lines()).is_empty());
}

#[test]
fn test_prefilled_checkout_form_still_needs_phone() {
    let form = ShippingForm::prefilled("Rider", "rider@example.com");
    assert!(matches!(
        form.validate(),
        Err(CheckoutError::MissingField("phone"))
    ));
}
