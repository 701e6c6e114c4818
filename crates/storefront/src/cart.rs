//! Cart state and totals.
//!
//! Visitors keep a [`LocalCart`] in their session; signed-in users' carts
//! live in the remote cart store. Both are rendered through [`CartLine`] and
//! totalled by [`CartSummary`].

use serde::{Deserialize, Serialize};

use grips_gears_core::{Price, ProductId};

use crate::api::{CartItem, Product};

/// A cart line as rendered on the cart and checkout pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line id: the remote cart item id, or the product id for session carts.
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub price: Price,
    pub quantity: u32,
}

impl CartLine {
    /// Quantity used for totals; a missing (zero) quantity counts as one.
    #[must_use]
    pub const fn effective_quantity(&self) -> u32 {
        if self.quantity == 0 { 1 } else { self.quantity }
    }

    /// Price × effective quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.price.times(self.effective_quantity())
    }

    /// Whether the quantity can still be decreased.
    #[must_use]
    pub const fn can_decrease(&self) -> bool {
        self.quantity > 1
    }
}

impl From<CartItem> for CartLine {
    fn from(item: CartItem) -> Self {
        Self {
            product_id: item
                .product_id
                .map_or_else(String::new, |id| id.as_str().to_string()),
            id: item.id.as_str().to_string(),
            name: item.name,
            image: item.image,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// Visitor cart held in the session until sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCart {
    lines: Vec<CartLine>,
}

impl LocalCart {
    /// Add a product: bumps the quantity of an existing line, otherwise
    /// appends a new line with quantity 1.
    pub fn add(&mut self, product: &Product) {
        let id = product.id_str();
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }
        self.lines.push(CartLine {
            id: id.to_string(),
            product_id: id.to_string(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price,
            quantity: 1,
        });
    }

    /// Change a line's quantity by `delta`, never going below 1.
    ///
    /// Returns `false` when no line has this id.
    pub fn update_quantity(&mut self, id: &str, delta: i32) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        let next = i64::from(line.quantity) + i64::from(delta);
        line.quantity = u32::try_from(next.max(1)).unwrap_or(u32::MAX);
        true
    }

    /// Remove a line. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        self.lines.len() != before
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Take the lines out, leaving the cart empty (used when merging on login).
    pub fn drain(&mut self) -> Vec<CartLine> {
        std::mem::take(&mut self.lines)
    }
}

/// Totals for a set of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    pub item_count: usize,
}

impl CartSummary {
    /// Compute totals. Shipping is always free.
    #[must_use]
    pub fn of(lines: &[CartLine]) -> Self {
        let subtotal: Price = lines.iter().map(CartLine::total).sum();
        let shipping = Price::ZERO;
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
            item_count: lines.len(),
        }
    }

    /// "1 item" / "N items".
    #[must_use]
    pub fn items_label(&self) -> String {
        let n = self.item_count;
        format!("{n} item{}", if n == 1 { "" } else { "s" })
    }

    /// Shipping as shown in the summary.
    #[must_use]
    pub fn shipping_label(&self) -> String {
        if self.shipping.is_zero() {
            "FREE".to_string()
        } else {
            self.shipping.display()
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

/// Lines of a remote cart in the shape `POST /payment/init` expects.
#[must_use]
pub fn to_payment_items(lines: &[CartLine]) -> Vec<CartItem> {
    lines
        .iter()
        .map(|line| CartItem {
            id: line.id.as_str().into(),
            product_id: (!line.product_id.is_empty())
                .then(|| ProductId::new(line.product_id.clone())),
            name: line.name.clone(),
            image: line.image.clone(),
            price: line.price,
            quantity: line.effective_quantity(),
            email: None,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, price: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "name": name,
            "price": price,
            "image": format!("https://i.ibb.co/{id}.jpg"),
        }))
        .unwrap()
    }

    #[test]
    fn test_add_appends_then_increments() {
        let mut cart = LocalCart::default();
        cart.add(&product("h1", "MT Thunder", 5500));
        cart.add(&product("t1", "IRC Tyre", 3200));
        cart.add(&product("h1", "MT Thunder", 5500));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.lines()[1].quantity, 1);
    }

    #[test]
    fn test_update_quantity_clamps_at_one() {
        let mut cart = LocalCart::default();
        cart.add(&product("h1", "MT Thunder", 5500));
        assert!(cart.update_quantity("h1", 2));
        assert_eq!(cart.lines()[0].quantity, 3);
        assert!(cart.update_quantity("h1", -10));
        assert_eq!(cart.lines()[0].quantity, 1);
        assert!(!cart.update_quantity("missing", 1));
    }

    #[test]
    fn test_remove() {
        let mut cart = LocalCart::default();
        cart.add(&product("h1", "MT Thunder", 5500));
        assert!(cart.remove("h1"));
        assert!(!cart.remove("h1"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_summary_counts_missing_quantity_as_one() {
        let lines = vec![
            CartLine {
                id: "a".into(),
                product_id: "p1".into(),
                name: "Helmet".into(),
                image: String::new(),
                price: Price::from_taka(2500),
                quantity: 2,
            },
            CartLine {
                id: "b".into(),
                product_id: "p2".into(),
                name: "Chain".into(),
                image: String::new(),
                price: Price::from_taka(300),
                quantity: 0,
            },
        ];
        let summary = CartSummary::of(&lines);
        assert_eq!(summary.subtotal, Price::from_taka(5300));
        assert_eq!(summary.total, Price::from_taka(5300));
        assert_eq!(summary.shipping_label(), "FREE");
        assert_eq!(summary.items_label(), "2 items");
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::of(&[]);
        assert!(summary.is_empty());
        assert!(summary.total.is_zero());
        assert_eq!(summary.items_label(), "0 items");
    }

    #[test]
    fn test_remote_item_conversion() {
        let item: CartItem = serde_json::from_str(
            r#"{"_id":"c1","productId":"p9","name":"Visor","price":800,"quantity":3,"email":"a@b.com"}"#,
        )
        .unwrap();
        let line = CartLine::from(item);
        assert_eq!(line.id, "c1");
        assert_eq!(line.product_id, "p9");
        assert_eq!(line.total(), Price::from_taka(2400));
        assert!(line.can_decrease());

        let payment = to_payment_items(&[line]);
        assert_eq!(payment[0].quantity, 3);
        assert_eq!(payment[0].id.as_str(), "c1");
    }
}
