//! Live tests for the visitor (session) cart.
//!
//! Require a running storefront with at least one helmet in the catalog.

use grips_gears_integration_tests::{TestContext, location};

/// First `product_id` hidden input on a page.
fn first_product_id(html: &str) -> Option<String> {
    let marker = "name=\"product_id\" value=\"";
    let start = html.find(marker)? + marker.len();
    let rest = html.get(start..)?;
    let end = rest.find('"')?;
    rest.get(..end).map(ToString::to_string)
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_add_to_cart_as_visitor() {
    let ctx = TestContext::new();
    let html = ctx.get("/products/helmet").await.unwrap().text().await.unwrap();
    let product_id = first_product_id(&html).expect("no helmet listed");

    let resp = ctx
        .post_form(
            "/cart/add",
            &[
                ("product_id", &product_id),
                ("category", "Helmet"),
                ("return_to", "/products/helmet"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), Some("/products/helmet"));

    // Flash and badge show up on the next page
    let html = ctx.get("/products/helmet").await.unwrap().text().await.unwrap();
    assert!(html.contains("added to your cart"));
    assert!(html.contains("badge-secondary\">1<"));
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_buy_now_goes_to_cart() {
    let ctx = TestContext::new();
    let html = ctx.get("/products/helmet").await.unwrap().text().await.unwrap();
    let product_id = first_product_id(&html).expect("no helmet listed");

    let resp = ctx
        .post_form(
            "/cart/add",
            &[
                ("product_id", &product_id),
                ("category", "Helmet"),
                ("buy_now", "1"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), Some("/dashboard/cart"));

    // The cart page itself needs a signed-in user
    let resp = ctx.get("/dashboard/cart").await.unwrap();
    assert_eq!(location(&resp), Some("/login?from=%2Fdashboard%2Fcart"));
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_add_unknown_product() {
    let ctx = TestContext::new();
    let resp = ctx
        .post_form("/cart/add", &[("product_id", "does-not-exist")])
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[test]
fn test_first_product_id() {
    let html = r#"<input type="hidden" name="product_id" value="665f1c2a9b">"#;
    assert_eq!(first_product_id(html).as_deref(), Some("665f1c2a9b"));
    assert_eq!(first_product_id("<p>none</p>"), None);
}
