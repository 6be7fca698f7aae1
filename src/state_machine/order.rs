//! Order totals and payment methods

use super::event::{LineItem, Order};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Computed view of an order, lines kept in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub total: f64,
    pub currency: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub subtotal: f64,
}

impl From<&LineItem> for SummaryLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal(),
        }
    }
}

impl OrderSummary {
    /// Currency comes from the first line; empty orders use `fallback_currency`.
    pub fn compute(order: &Order, fallback_currency: &str) -> Self {
        let lines: Vec<SummaryLine> = order.items.iter().map(SummaryLine::from).collect();
        // Folded from +0.0; an empty f64 sum is -0.0 and would render as "-0.00"
        let total = lines.iter().fold(0.0, |acc, line| acc + line.subtotal);
        let currency = order
            .items
            .first()
            .map_or_else(|| fallback_currency.to_string(), |item| item.currency.clone());

        Self {
            lines,
            total,
            currency,
            note: order.note.clone().filter(|note| !note.trim().is_empty()),
        }
    }

    /// Customer-facing summary text
    pub fn render(&self) -> String {
        let mut out = String::from("🧾 Order summary\n");
        for (index, line) in self.lines.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} x{} @ {} {:.2} = {} {:.2}",
                index + 1,
                line.product_id,
                line.quantity,
                self.currency,
                line.unit_price,
                self.currency,
                line.subtotal
            );
        }
        if let Some(note) = &self.note {
            let _ = writeln!(out, "Note: {note}");
        }
        let _ = write!(out, "Total: {} {:.2}", self.currency, self.total);
        out
    }
}

/// Payment options offered after an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Upi,
    Card,
    CashOnDelivery,
}

impl PaymentMethod {
    /// Match order decides which method wins when a body names several
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Upi,
        PaymentMethod::Card,
        PaymentMethod::CashOnDelivery,
    ];

    /// Reply id carried by the payment button
    pub fn reply_id(self) -> &'static str {
        match self {
            PaymentMethod::Upi => "pay_upi",
            PaymentMethod::Card => "pay_card",
            PaymentMethod::CashOnDelivery => "pay_cod",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "Card",
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
        }
    }

    /// Find a payment reply id anywhere in `body`, ignoring case
    pub fn detect(body: &str) -> Option<Self> {
        let lowered = body.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|method| lowered.contains(method.reply_id()))
    }
}
