//! The order fact table: one row per synthetic purchase.

use crate::{
    calendar::{month_start, ymd, ymd_hms},
    types::{CustomerId, OrderId},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names of `fact_orders`, in file order.
pub const FACT_ORDERS_COLUMNS: [&str; 11] = [
    "order_id",
    "customer_id",
    "order_purchase_ts",
    "order_date",
    "order_status",
    "item_value",
    "freight_value",
    "gross_value",
    "delivery_days",
    "delivered_minus_estimated_days",
    "on_time_delivery_flag",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderStatus {
    Delivered,
    Canceled,
    Processing,
}

impl OrderStatus {
    /// Fixed order used for weighted status picks.
    pub const ALL: [OrderStatus; 3] = [Self::Delivered, Self::Canceled, Self::Processing];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered => "Delivered",
            Self::Canceled => "Canceled",
            Self::Processing => "Processing",
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    #[serde(with = "ymd_hms")]
    pub order_purchase_ts: NaiveDateTime,
    #[serde(with = "ymd")]
    pub order_date: NaiveDate,
    pub order_status: OrderStatus,
    pub item_value: f64,
    pub freight_value: f64,
    pub gross_value: f64,
    pub delivery_days: i64,
    pub delivered_minus_estimated_days: i64,
    /// Only present for delivered orders.
    #[serde(with = "on_time_flag")]
    pub on_time_delivery_flag: Option<u8>,
}

impl Order {
    /// 1 when delivered on or before the estimate, 0 when late,
    /// absent when the order was never delivered.
    pub fn on_time_flag(status: OrderStatus, delivered_minus_estimated_days: i64) -> Option<u8> {
        if !status.is_delivered() {
            return None;
        }
        Some(u8::from(delivered_minus_estimated_days <= 0))
    }

    pub fn order_month(&self) -> NaiveDate {
        month_start(self.order_date)
    }
}

/// serde adapter for `on_time_delivery_flag`.
///
/// Written as `1`/`0`/empty. Read leniently: dataframe exports store the
/// column as floats (`1.0`/`0.0`) because of the missing values.
pub mod on_time_flag {
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(flag: &Option<u8>, s: S) -> Result<S::Ok, S::Error> {
        flag.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u8>, D::Error> {
        match Option::<f64>::deserialize(d)? {
            None => Ok(None),
            Some(v) if v == 0.0 => Ok(Some(0)),
            Some(v) if v == 1.0 => Ok(Some(1)),
            Some(v) => Err(D::Error::custom(format!(
                "on_time_delivery_flag must be 0, 1 or empty, got {v}"
            ))),
        }
    }
}

/// Round half-to-even at the given number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
