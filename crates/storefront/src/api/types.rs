//! Wire types exchanged with the remote storefront API.
//!
//! Field names follow the remote API (`camelCase`, Mongo `_id`).

use serde::{Deserialize, Serialize};

use grips_gears_core::{
    CartItemId, OrderStatus, PaymentStatus, Price, ProductCategory, ProductId, TransactionId,
    UserId, UserRole,
};

// =============================================================================
// Products
// =============================================================================

/// A product record from a category collection or `allproducts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// The product's category, when it names a known one.
    #[must_use]
    pub fn category(&self) -> Option<ProductCategory> {
        self.category.as_deref().and_then(|c| c.parse().ok())
    }

    /// The product id, or an empty string for records without one.
    #[must_use]
    pub fn id_str(&self) -> &str {
        self.id.as_ref().map_or("", ProductId::as_str)
    }
}

/// Decode a listing record by record, skipping the ones that do not parse.
#[must_use]
pub fn decode_listing(records: Vec<serde_json::Value>) -> Vec<Product> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Product>(record) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed product record");
                None
            }
        })
        .collect()
}

/// Give every product an id, falling back to its position in the listing.
#[must_use]
pub fn with_fallback_ids(products: Vec<Product>) -> Vec<Product> {
    products
        .into_iter()
        .enumerate()
        .map(|(index, mut product)| {
            if product.id.as_ref().is_none_or(ProductId::is_empty) {
                product.id = Some(ProductId::new(index.to_string()));
            }
            product
        })
        .collect()
}

/// Body for creating or updating a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub category: ProductCategory,
    pub price: Price,
    pub details: String,
    pub image: String,
}

/// A product mirrored into `allproducts` under the id its category issued.
#[derive(Debug, Clone, Serialize)]
pub struct MirroredProduct<'a> {
    #[serde(rename = "_id")]
    pub id: &'a str,
    #[serde(flatten)]
    pub product: &'a ProductInput,
}

// =============================================================================
// Write results
// =============================================================================

/// Result of an insert (`POST`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    #[serde(default)]
    pub inserted_id: Option<String>,
    /// Set by `POST /carts` when an existing line's quantity was bumped.
    #[serde(default)]
    pub modified: Option<serde_json::Value>,
}

impl InsertResult {
    /// Whether the API reports the write took effect.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.inserted_id.as_deref().is_some_and(|id| !id.is_empty())
            || self.modified.as_ref().is_some_and(is_truthy)
    }
}

/// Result of an update (`PUT`/`PATCH`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    #[serde(default)]
    pub modified_count: u64,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    #[serde(default)]
    pub deleted_count: u64,
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

// =============================================================================
// Carts
// =============================================================================

/// A cart line stored remotely for a signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: CartItemId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub price: Price,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body for `POST /carts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem<'a> {
    pub product_id: &'a str,
    pub name: &'a str,
    pub image: &'a str,
    pub price: Price,
    pub email: &'a str,
    pub quantity: u32,
}

// =============================================================================
// Checkout & orders
// =============================================================================

/// Shipping details captured at checkout and stored on the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
}

impl CustomerInfo {
    /// Second address line, when given.
    #[must_use]
    pub fn address2(&self) -> Option<&str> {
        non_empty(&self.address2)
    }

    /// State or division, when given.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        non_empty(&self.state)
    }

    /// Country, defaulting to Bangladesh.
    #[must_use]
    pub fn country(&self) -> &str {
        non_empty(&self.country).unwrap_or("Bangladesh")
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// Body for `POST /payment/init`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitRequest<'a> {
    pub email: &'a str,
    pub cart_items: &'a [CartItem],
    pub total_amount: Price,
    pub customer_info: &'a CustomerInfo,
}

/// Response of `POST /payment/init`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /payment/verify/{tran_id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// A line of an order's cart snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub price: Price,
    #[serde(default)]
    pub quantity: u32,
}

impl OrderLine {
    /// Unit price × quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Gateway settlement details attached to paid orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(default)]
    pub gateway_fees: Option<Price>,
    #[serde(default)]
    pub total_paid_by_customer: Option<Price>,
}

/// A transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub transaction_id: TransactionId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub cart_items: Vec<OrderLine>,
    pub total_amount: Price,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub payment_details: Option<PaymentDetails>,
}

impl Order {
    /// Whether the order was placed with `email` (case-insensitive).
    #[must_use]
    pub fn belongs_to(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }

    /// Order date as `M/D/YYYY`, or the raw value when it is not RFC 3339.
    #[must_use]
    pub fn date_label(&self) -> String {
        let Some(raw) = self.created_at.as_deref() else {
            return String::new();
        };
        chrono::DateTime::parse_from_rfc3339(raw).map_or_else(
            |_| raw.to_string(),
            |dt| dt.format("%-m/%-d/%Y").to_string(),
        )
    }

    /// "1 item" / "3 items".
    #[must_use]
    pub fn items_label(&self) -> String {
        let n = self.cart_items.len();
        format!("{n} item{}", if n == 1 { "" } else { "s" })
    }

    /// Sum of the line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.cart_items.iter().map(OrderLine::total).sum()
    }

    /// Gateway fees, when the payment details carry a non-zero amount.
    #[must_use]
    pub fn gateway_fees(&self) -> Option<Price> {
        self.payment_details
            .as_ref()
            .and_then(|d| d.gateway_fees)
            .filter(|fee| !fee.is_zero())
    }

    /// What the customer paid: the gateway's figure when known, else the order total.
    #[must_use]
    pub fn total_paid(&self) -> Price {
        self.payment_details
            .as_ref()
            .and_then(|d| d.total_paid_by_customer)
            .filter(|p| !p.is_zero())
            .unwrap_or(self.total_amount)
    }
}

// =============================================================================
// Dashboard statistics
// =============================================================================

/// Month bucket key produced by the API's aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

/// One month of orders and revenue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    #[serde(rename = "_id")]
    pub key: MonthKey,
    #[serde(default)]
    pub monthly_revenue: Price,
    #[serde(default)]
    pub order_count: u64,
}

/// Number of products in a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(rename = "_id", default)]
    pub category: Option<String>,
    #[serde(default)]
    pub count: u64,
}

/// A best-selling product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_sold: u64,
}

/// Response of `GET /stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default)]
    pub total_revenue: Price,
    #[serde(default)]
    pub total_customers: u64,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub monthly_stats: Vec<MonthlyStat>,
    #[serde(default)]
    pub product_categories: Vec<CategoryCount>,
    #[serde(default)]
    pub top_selling_products: Vec<TopProduct>,
}

/// One month of a user's orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyOrders {
    #[serde(rename = "_id")]
    pub key: MonthKey,
    #[serde(default)]
    pub order_count: u64,
}

/// Response of `GET /user/home`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHomeStats {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub total_orders: Option<u64>,
    #[serde(default)]
    pub completed_orders: Option<u64>,
    #[serde(default)]
    pub pending_orders: Option<u64>,
    #[serde(default)]
    pub monthly_orders: Vec<MonthlyOrders>,
}

// =============================================================================
// Users
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserRecord {
    /// The user's role; anything but `admin` is a regular user.
    #[must_use]
    pub fn role(&self) -> UserRole {
        match self.role.as_deref() {
            Some(r) if r.eq_ignore_ascii_case("admin") => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

/// Body for `POST /users`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// Response of `GET /users/admin/{email}`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AdminCheck {
    #[serde(default)]
    pub admin: bool,
}

/// Response of `POST /jwt`.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token", &"[REDACTED]")
            .finish()
    }
}
