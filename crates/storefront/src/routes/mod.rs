//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page (banner + helmets)
//! GET  /products/{category}           - Category product grid
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (remote API)
//!
//! # Auth
//! GET  /login                         - Login page (?from=, ?expired=1)
//! POST /login                         - Login action (rate limited)
//! GET  /signup                        - Sign-up page
//! POST /signup                        - Sign-up action (rate limited)
//! POST /logout                        - Logout action
//!
//! # Cart
//! POST /cart/add                      - Add a product (rate limited)
//! POST /cart/{id}/increase            - Quantity + 1
//! POST /cart/{id}/decrease            - Quantity - 1 (never below 1)
//! POST /cart/{id}/remove              - Remove a line
//! POST /cart/checkout                 - Proceed to checkout
//!
//! # Checkout & payment
//! GET  /checkout                      - Shipping form + order summary
//! POST /checkout                      - Validate, start gateway payment
//! GET  /payment/success/{tran_id}     - Order confirmation
//! GET  /payment/fail[/{tran_id}]      - Payment failed
//! GET  /payment/cancel[/{tran_id}]    - Payment cancelled
//! GET  /payment/error                 - Payment error
//! GET  /orders/{tran_id}/invoice.pdf  - PDF invoice (paid orders)
//!
//! # Dashboard (signed in)
//! GET  /dashboard                     - Role home redirect
//! GET  /dashboard/user                - User home
//! GET  /dashboard/cart                - My Cart
//! GET  /dashboard/orders              - My Orders
//! GET  /dashboard/orders/{tran_id}    - Order details
//!
//! # Dashboard (admin)
//! GET  /dashboard/admin               - Admin home (?revenue=&orders=)
//! GET  /dashboard/items               - Manage Items
//! GET  /dashboard/items/new           - Add Items form
//! POST /dashboard/items/new           - Create product (multipart)
//! GET  /dashboard/items/{id}/edit     - Edit form
//! POST /dashboard/items/{id}/edit     - Update product (multipart)
//! POST /dashboard/items/{id}/delete   - Delete product
//! GET  /dashboard/users               - All Users
//! POST /dashboard/users/{id}/admin    - Promote to admin
//! POST /dashboard/users/{id}/delete   - Delete user
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod health;
pub mod home;
pub mod items;
pub mod orders;
pub mod payment;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let pages = Router::new()
        .route("/login", get(auth::login_page))
        .route("/signup", get(auth::signup_page))
        .route("/logout", post(auth::logout));

    let actions = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .layer(auth_rate_limiter());

    pages.merge(actions)
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/{id}/increase", post(cart::increase))
        .route("/{id}/decrease", post(cart::decrease))
        .route("/{id}/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
        .layer(cart_rate_limiter())
}

/// Create the payment result routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/success/{tran_id}", get(payment::success))
        .route("/fail", get(payment::fail))
        .route("/fail/{tran_id}", get(payment::fail_transaction))
        .route("/cancel", get(payment::cancel))
        .route("/cancel/{tran_id}", get(payment::cancel_transaction))
        .route("/error", get(payment::error))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/admin", get(dashboard::admin_home))
        .route("/user", get(dashboard::user_home))
        .route("/cart", get(cart::show))
        .route("/orders", get(orders::index))
        .route("/orders/{tran_id}", get(orders::show))
        .nest("/items", item_routes())
        .nest("/users", user_routes())
}

/// Create the product administration routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(items::index))
        .route("/new", get(items::new_page).post(items::create))
        .route("/{id}/edit", get(items::edit_page).post(items::update))
        .route("/{id}/delete", post(items::delete))
        .layer(DefaultBodyLimit::max(items::MAX_UPLOAD_BYTES))
}

/// Create the user administration routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}/admin", post(users::promote))
        .route("/{id}/delete", post(users::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Health checks
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Catalog
        .route("/products/{category}", get(products::category))
        // Auth routes
        .merge(auth_routes())
        // Cart actions
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::submit))
        // Payment results
        .nest("/payment", payment_routes())
        // Invoice download
        .route("/orders/{tran_id}/invoice.pdf", get(orders::invoice))
        // Dashboard
        .nest("/dashboard", dashboard_routes())
}

/// Accept a redirect target only if it stays on this site.
///
/// Returns `None` for absolute URLs, protocol-relative `//host` paths and
/// anything not starting with `/`.
#[must_use]
pub fn local_path(candidate: Option<&str>) -> Option<&str> {
    candidate
        .map(str::trim)
        .filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.starts_with("/\\"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path() {
        assert_eq!(local_path(Some("/products/tyre")), Some("/products/tyre"));
        assert_eq!(local_path(Some("/")), Some("/"));
        assert_eq!(local_path(Some("//evil.example")), None);
        assert_eq!(local_path(Some("/\\evil.example")), None);
        assert_eq!(local_path(Some("https://evil.example")), None);
        assert_eq!(local_path(Some("")), None);
        assert_eq!(local_path(None), None);
    }
}
