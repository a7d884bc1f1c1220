//! Schema checks for order tables.
//!
//! RULE: every table is validated before the retention pass runs
//! and before anything is written. A violation aborts the run.

use crate::{
    error::{CohortError, CohortResult},
    order::{Order, FACT_ORDERS_COLUMNS},
};

/// Largest tolerated gap between gross and item + freight after
/// each has been rounded to cents.
const GROSS_TOLERANCE: f64 = 0.005 + 1e-9;

/// The header row must match the fact table columns exactly, in order.
pub fn validate_header(header: &csv::StringRecord) -> CohortResult<()> {
    let matches = header.len() == FACT_ORDERS_COLUMNS.len()
        && header
            .iter()
            .zip(FACT_ORDERS_COLUMNS.iter())
            .all(|(actual, expected)| actual.trim() == *expected);
    if matches {
        return Ok(());
    }
    Err(CohortError::SchemaHeader {
        expected: FACT_ORDERS_COLUMNS.join(", "),
        actual: header.iter().collect::<Vec<_>>().join(", "),
    })
}

/// Check the row-level invariants of one order. `row` is 1-based.
pub fn validate_order(row: u64, order: &Order) -> CohortResult<()> {
    let fail = |message: String| CohortError::Schema { row, message };

    if order.order_id != row {
        return Err(fail(format!(
            "order_id {} out of sequence, expected {row}",
            order.order_id
        )));
    }
    if order.customer_id == 0 {
        return Err(fail("customer_id must be >= 1".into()));
    }
    for (column, value) in [
        ("item_value", order.item_value),
        ("freight_value", order.freight_value),
        ("gross_value", order.gross_value),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(fail(format!("{column} must be a non-negative amount, got {value}")));
        }
    }
    if (order.gross_value - (order.item_value + order.freight_value)).abs() > GROSS_TOLERANCE {
        return Err(fail(format!(
            "gross_value {} != item_value {} + freight_value {}",
            order.gross_value, order.item_value, order.freight_value
        )));
    }
    if order.order_date != order.order_purchase_ts.date() {
        return Err(fail(format!(
            "order_date {} does not match order_purchase_ts {}",
            order.order_date, order.order_purchase_ts
        )));
    }

    let expected_flag =
        Order::on_time_flag(order.order_status, order.delivered_minus_estimated_days);
    if order.on_time_delivery_flag != expected_flag {
        return Err(fail(format!(
            "on_time_delivery_flag {:?} inconsistent with status {} and delivered_minus_estimated_days {}",
            order.on_time_delivery_flag, order.order_status, order.delivered_minus_estimated_days
        )));
    }
    Ok(())
}

/// Validate a whole table in row order, stopping at the first violation.
pub fn validate_orders(orders: &[Order]) -> CohortResult<()> {
    for (idx, order) in orders.iter().enumerate() {
        validate_order(idx as u64 + 1, order)?;
    }
    Ok(())
}
