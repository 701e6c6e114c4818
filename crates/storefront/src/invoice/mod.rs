//! PDF invoices for paid orders.
//!
//! The page is first laid out as a flat list of [`DrawOp`]s in millimetres
//! from the top-left corner ([`InvoiceLayout`]); [`pdf`] then renders those
//! operations. Keeping the layout pure lets it be tested without parsing PDF.

mod pdf;

use thiserror::Error;

use crate::api::Order;
use crate::config::StoreDetails;

/// A4 width in millimetres.
pub const PAGE_WIDTH: f32 = 210.0;
/// A4 height in millimetres.
pub const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - MARGIN * 2.0;
const LINE: f32 = 6.0;
const ROW: f32 = 12.0;

const INK: Rgb8 = (40, 40, 40);
const BODY: Rgb8 = (60, 60, 60);
const MUTED: Rgb8 = (100, 100, 100);

/// An RGB colour with 8-bit channels.
pub type Rgb8 = (u8, u8, u8);

/// Errors that can occur when producing an invoice.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Invoices are only issued once payment has cleared.
    #[error("order {0} has not been paid")]
    NotPaid(String),

    /// The PDF backend failed.
    #[error("failed to render PDF: {0}")]
    Render(String),
}

/// Horizontal anchoring of a text operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// One drawing instruction. Coordinates are millimetres from the top-left
/// corner; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Rgb8,
        align: Align,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb8>,
        stroke: Option<Rgb8>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb8,
    },
}

/// Estimated width of Helvetica text in millimetres.
///
/// Uses an average glyph advance of half an em; good enough to centre
/// short labels and amounts.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * 0.3528
}

/// File name offered for download: `Grips_Gears_Invoice_{first 12 chars}.pdf`.
#[must_use]
pub fn file_name(order: &Order) -> String {
    format!(
        "Grips_Gears_Invoice_{}.pdf",
        order.transaction_id.short(12)
    )
}

/// Lay out and render the invoice for a paid order.
///
/// # Errors
///
/// Returns `InvoiceError::NotPaid` for orders whose payment has not cleared,
/// and `InvoiceError::Render` if the PDF backend fails.
pub fn render(order: &Order, store: &StoreDetails) -> Result<Vec<u8>, InvoiceError> {
    if !order.payment_status.is_paid() {
        return Err(InvoiceError::NotPaid(order.transaction_id.to_string()));
    }
    let layout = InvoiceLayout::build(order, store);
    pdf::render(&layout, &format!("Invoice {}", order.transaction_id))
}

/// The invoice page as draw operations.
#[derive(Debug, Clone, Default)]
pub struct InvoiceLayout {
    pub ops: Vec<DrawOp>,
}

impl InvoiceLayout {
    /// Lay out the invoice for an order.
    #[must_use]
    pub fn build(order: &Order, store: &StoreDetails) -> Self {
        let mut page = Self::default();
        page.header(order);
        let bill_end = page.bill_to(order);
        let info_end = page.order_info(order);
        let table_end = page.items(order, bill_end.max(info_end) + 25.0);
        let totals_end = page.totals(order, table_end + 10.0);
        page.footer(store, totals_end + 30.0);
        page
    }

    /// Text of every text operation, top to bottom as drawn.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, color: Rgb8) {
        self.ops.push(DrawOp::Text {
            text: text.into(),
            x,
            y,
            size,
            color,
            align: Align::Left,
        });
    }

    fn centered(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, color: Rgb8) {
        self.ops.push(DrawOp::Text {
            text: text.into(),
            x,
            y,
            size,
            color,
            align: Align::Center,
        });
    }

    fn header(&mut self, order: &Order) {
        self.text("GRIPS & GEARS", MARGIN, 30.0, 24.0, INK);
        self.text("Motorcycle Parts & Accessories", MARGIN, 40.0, 12.0, MUTED);
        self.text("INVOICE", PAGE_WIDTH - MARGIN - 50.0, 30.0, 18.0, INK);

        let (bx, by) = (PAGE_WIDTH - MARGIN - 70.0, 35.0);
        self.ops.push(DrawOp::Rect {
            x: bx,
            y: by,
            width: 65.0,
            height: 30.0,
            fill: Some((250, 250, 250)),
            stroke: Some((200, 200, 200)),
        });
        let id = order.transaction_id.short(12);
        self.text(format!("Invoice #: {id}"), bx + 3.0, by + 8.0, 10.0, BODY);
        self.text(format!("Date: {}", order.date_label()), bx + 3.0, by + 16.0, 10.0, BODY);
        self.text(
            format!("Status: {}", order.payment_status.as_str().to_uppercase()),
            bx + 3.0,
            by + 24.0,
            10.0,
            BODY,
        );
    }

    /// Returns the baseline of the last line written.
    fn bill_to(&mut self, order: &Order) -> f32 {
        let info = &order.customer_info;
        let mut y = 80.0;
        self.text("BILL TO:", MARGIN, y, 14.0, INK);

        y += 10.0;
        let mut lines = vec![info.name.clone(), info.address.clone()];
        if let Some(address2) = info.address2() {
            lines.push(address2.to_string());
        }
        lines.push(format!("{}, {}", info.city, info.postcode));
        if let Some(state) = info.state() {
            lines.push(state.to_string());
        }
        lines.push(info.country().to_string());
        lines.push(format!("Phone: {}", info.phone));
        lines.push(format!("Email: {}", order.email));

        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                y += LINE;
            }
            self.text(line, MARGIN, y, 11.0, INK);
        }
        y
    }

    fn order_info(&mut self, order: &Order) -> f32 {
        let x = PAGE_WIDTH - MARGIN - 80.0;
        let mut y = 80.0;
        self.text("ORDER INFO:", x, y, 14.0, INK);

        y += 10.0;
        self.text("Order ID:", x, y, 10.0, INK);
        self.text(order.transaction_id.as_str(), x, y + 4.0, 10.0, INK);
        y += ROW;
        self.text("Payment Method: SSL Commerz", x, y, 10.0, INK);
        y += LINE;
        self.text(
            format!("Order Status: {}", order.status.as_str().to_uppercase()),
            x,
            y,
            10.0,
            INK,
        );
        y
    }

    /// Column centres: quantity, unit price, total.
    const fn columns() -> (f32, f32, f32) {
        let item = CONTENT_WIDTH * 0.45;
        let qty = CONTENT_WIDTH * 0.15;
        let price = CONTENT_WIDTH * 0.2;
        let total = CONTENT_WIDTH * 0.2;
        (
            MARGIN + item + qty / 2.0,
            MARGIN + item + qty + price / 2.0,
            MARGIN + item + qty + price + total / 2.0,
        )
    }

    /// Returns the y position after the last row.
    fn items(&mut self, order: &Order, top: f32) -> f32 {
        let (qty_x, price_x, total_x) = Self::columns();
        let mut y = top;

        self.ops.push(DrawOp::Rect {
            x: MARGIN,
            y,
            width: CONTENT_WIDTH,
            height: 10.0,
            fill: Some((240, 240, 240)),
            stroke: None,
        });
        self.text("Item", MARGIN + 3.0, y + 7.0, 11.0, INK);
        self.centered("Qty", qty_x, y + 7.0, 11.0, INK);
        self.centered("Unit Price", price_x, y + 7.0, 11.0, INK);
        self.centered("Total", total_x, y + 7.0, 11.0, INK);
        y += ROW;

        for (index, line) in order.cart_items.iter().enumerate() {
            if index % 2 == 0 {
                self.ops.push(DrawOp::Rect {
                    x: MARGIN,
                    y: y - 2.0,
                    width: CONTENT_WIDTH,
                    height: 10.0,
                    fill: Some((252, 252, 252)),
                    stroke: None,
                });
            }
            self.text(item_name(&line.name), MARGIN + 3.0, y + 6.0, 10.0, BODY);
            self.centered(line.quantity.to_string(), qty_x, y + 6.0, 10.0, BODY);
            self.centered(line.price.invoice(), price_x, y + 6.0, 10.0, BODY);
            self.centered(line.total().invoice(), total_x, y + 6.0, 10.0, BODY);
            y += ROW;
        }
        y
    }

    fn totals(&mut self, order: &Order, top: f32) -> f32 {
        let (_, _, value_x) = Self::columns();
        let label_x = MARGIN + CONTENT_WIDTH * 0.6;
        let mut y = top;

        self.ops.push(DrawOp::Line {
            x1: label_x,
            y1: y - 5.0,
            x2: MARGIN + CONTENT_WIDTH,
            y2: y - 5.0,
            color: (200, 200, 200),
        });

        self.text("Subtotal:", label_x, y, 11.0, INK);
        self.centered(order.subtotal().invoice(), value_x, y, 11.0, INK);

        if let Some(fees) = order.gateway_fees() {
            y += 8.0;
            self.text("Gateway Fees:", label_x, y, 10.0, MUTED);
            self.centered(fees.invoice(), value_x, y, 10.0, MUTED);
            y += ROW;
            self.text("TOTAL PAID:", label_x, y, 14.0, INK);
            self.centered(order.total_paid().invoice(), value_x, y, 14.0, INK);
        } else {
            y += ROW;
            self.text("TOTAL:", label_x, y, 14.0, INK);
            self.centered(order.total_amount.invoice(), value_x, y, 14.0, INK);
        }
        y
    }

    fn footer(&mut self, store: &StoreDetails, top: f32) {
        let mut y = top;
        self.text("Thank you for shopping with Grips & Gears!", MARGIN, y, 12.0, BODY);
        y += 8.0;
        self.text(
            format!("For support, contact us at {}", store.support_email),
            MARGIN,
            y,
            10.0,
            MUTED,
        );
        y += 5.0;
        self.text(format!("Visit us at {}", store.website), MARGIN, y, 10.0, MUTED);

        self.ops.push(DrawOp::Rect {
            x: 10.0,
            y: 10.0,
            width: PAGE_WIDTH - 20.0,
            height: PAGE_HEIGHT - 20.0,
            fill: None,
            stroke: Some((180, 180, 180)),
        });
    }
}

/// Names longer than 35 characters are cut to 32 plus an ellipsis.
fn item_name(name: &str) -> String {
    if name.chars().count() > 35 {
        let head: String = name.chars().take(32).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(json: serde_json::Value) -> Order {
        serde_json::from_value(json).unwrap()
    }

    fn paid_order() -> Order {
        order(serde_json::json!({
            "transactionId": "SSLCZ_TEST_6650a1b2c3d4e5f6",
            "email": "rider@example.com",
            "createdAt": "2025-03-07T10:00:00.000Z",
            "cartItems": [
                {"name": "MT Thunder 3 Helmet", "price": 5500, "quantity": 1},
                {"name": "Heavy Duty O-Ring Chain Kit with Sprockets 428H", "price": 1250.5, "quantity": 2}
            ],
            "totalAmount": 8001,
            "paymentStatus": "paid",
            "status": "confirmed",
            "customerInfo": {
                "name": "Rahim Uddin", "phone": "01712345678",
                "address": "House 12, Road 5", "address2": "Dhanmondi",
                "city": "Dhaka", "postcode": "1205", "country": ""
            }
        }))
    }

    #[test]
    fn test_header_and_details_box() {
        let layout = InvoiceLayout::build(&paid_order(), &StoreDetails::default());
        let texts: Vec<&str> = layout.texts().collect();
        assert_eq!(texts[0], "GRIPS & GEARS");
        assert!(texts.contains(&"Invoice #: SSLCZ_TEST_6"));
        assert!(texts.contains(&"Date: 3/7/2025"));
        assert!(texts.contains(&"Status: PAID"));
        assert!(texts.contains(&"Order Status: CONFIRMED"));
    }

    #[test]
    fn test_bill_to_block() {
        let layout = InvoiceLayout::build(&paid_order(), &StoreDetails::default());
        let texts: Vec<&str> = layout.texts().collect();
        let start = texts.iter().position(|t| *t == "Rahim Uddin").unwrap();
        assert_eq!(
            &texts[start..start + 7],
            &[
                "Rahim Uddin",
                "House 12, Road 5",
                "Dhanmondi",
                "Dhaka, 1205",
                "Bangladesh",
                "Phone: 01712345678",
                "Email: rider@example.com",
            ]
        );
    }

    #[test]
    fn test_items_truncated_and_totalled() {
        let layout = InvoiceLayout::build(&paid_order(), &StoreDetails::default());
        let texts: Vec<&str> = layout.texts().collect();
        assert!(texts.contains(&"Heavy Duty O-Ring Chain Kit with..."));
        assert!(texts.contains(&"Tk 2501.00"));
        assert!(texts.contains(&"Subtotal:"));
        assert!(texts.contains(&"TOTAL:"));
        assert!(!texts.contains(&"Gateway Fees:"));
        assert!(texts.contains(&"Tk 8001.00"));
    }

    #[test]
    fn test_gateway_fees_switch_total_label() {
        let mut o = paid_order();
        o.payment_details = Some(
            serde_json::from_value(
                serde_json::json!({"gateway_fees": 200, "total_paid_by_customer": 8201}),
            )
            .unwrap(),
        );
        let layout = InvoiceLayout::build(&o, &StoreDetails::default());
        let texts: Vec<&str> = layout.texts().collect();
        assert!(texts.contains(&"Gateway Fees:"));
        assert!(texts.contains(&"Tk 200.00"));
        assert!(texts.contains(&"TOTAL PAID:"));
        assert!(texts.contains(&"Tk 8201.00"));
    }

    #[test]
    fn test_table_starts_below_lower_block() {
        let layout = InvoiceLayout::build(&paid_order(), &StoreDetails::default());
        // BILL TO has seven lines: last baseline at 90 + 6 * 6 = 126.
        let header_rect = layout
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Rect {
                    y,
                    fill: Some((240, 240, 240)),
                    ..
                } => Some(*y),
                _ => None,
            })
            .unwrap();
        assert!((header_rect - 151.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_footer_and_border() {
        let store = StoreDetails::default();
        let layout = InvoiceLayout::build(&paid_order(), &store);
        let texts: Vec<&str> = layout.texts().collect();
        assert!(texts.contains(&"Thank you for shopping with Grips & Gears!"));
        let support = format!("For support, contact us at {}", store.support_email);
        assert!(texts.contains(&support.as_str()));
        assert!(matches!(
            layout.ops.last(),
            Some(DrawOp::Rect { fill: None, .. })
        ));
    }

    #[test]
    fn test_unpaid_order_refused() {
        let mut o = paid_order();
        o.payment_status = "pending".into();
        assert!(matches!(
            render(&o, &StoreDetails::default()),
            Err(InvoiceError::NotPaid(_))
        ));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(&paid_order()),
            "Grips_Gears_Invoice_SSLCZ_TEST_6.pdf"
        );
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render(&paid_order(), &StoreDetails::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
