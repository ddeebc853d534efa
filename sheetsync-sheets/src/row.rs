//! Order → ordered cell values, per layout variant.
//!
//! Pure and deterministic. Absent values always render as empty strings so
//! the literal text "null" can never land in a partner's sheet.

use chrono::NaiveDate;

use sheetsync_core::{Order, OrderStatus};

use crate::schema::SchemaVariant;

/// Render an order into one row of cells laid out for `variant`.
///
/// The returned vector always has exactly `variant.layout().width()` cells,
/// ordered from the layout's first column.
pub fn build_row(order: &Order, variant: SchemaVariant) -> Vec<String> {
    match variant {
        SchemaVariant::Standard => standard_row(order),
        SchemaVariant::Fulfilment => fulfilment_row(order),
    }
}

/// Window `A..N`: one unconditional delivery-date column (K).
fn standard_row(order: &Order) -> Vec<String> {
    vec![
        order.order_number.0.clone(),
        date_cell(order.order_date),
        order.client_name.clone(),
        order.client_phone.clone(),
        order.delivery_address.clone(),
        order.city.clone(),
        order.product.clone(),
        order.quantity.to_string(),
        amount_cell(order.amount),
        status_cell(&order.status).to_string(),
        date_cell(order.delivery_date),
        order.agent.clone(),
        order.merchant.clone(),
        order.instructions.clone(),
    ]
}

/// Window `B..P`: the delivery date lands in exactly one of two columns —
/// "delivered on" (L) when the order is delivered, "scheduled for" (M)
/// otherwise. The partner reads confirmed completions from one column and
/// upcoming drops from the other.
fn fulfilment_row(order: &Order) -> Vec<String> {
    let delivered = order.status == OrderStatus::Delivered;
    let (delivered_on, scheduled_for) = if delivered {
        (date_cell(order.delivery_date), String::new())
    } else {
        (String::new(), date_cell(order.delivery_date))
    };

    vec![
        order.order_number.0.clone(),
        date_cell(order.order_date),
        order.client_name.clone(),
        order.client_phone.clone(),
        order.delivery_address.clone(),
        order.city.clone(),
        order.product.clone(),
        order.quantity.to_string(),
        amount_cell(order.amount),
        status_cell(&order.status).to_string(),
        delivered_on,
        scheduled_for,
        order.agent.clone(),
        order.merchant.clone(),
        order.instructions.clone(),
    ]
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn amount_cell(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Sheet-facing status labels (title case, as the partners' dropdowns use).
fn status_cell(status: &OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Pending",
        OrderStatus::Confirmed => "Confirmed",
        OrderStatus::Dispatched => "Dispatched",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Cancelled",
    }
}
