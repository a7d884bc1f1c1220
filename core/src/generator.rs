//! Order table generator — synthesizes the `fact_orders` table.
//!
//! Every column draws from its own RNG stream (see rng.rs), so a row's
//! status never depends on how its item value was drawn and vice versa.
//! Same seed + same config = byte-identical table.

use crate::{
    config::{GammaModel, GeneratorConfig, NormalModel},
    error::{CohortError, CohortResult},
    order::{round_to, Order, OrderStatus},
    rng::{ColumnRng, ColumnSlot, RngBank},
    types::{CustomerId, OrderId, Seed},
};
use chrono::Duration;
use rand::distributions::WeightedIndex;

/// One RNG per generated column.
struct ColumnStreams {
    customer: ColumnRng,
    purchase_ts: ColumnRng,
    status: ColumnRng,
    item_value: ColumnRng,
    freight_value: ColumnRng,
    delivery_days: ColumnRng,
    estimated_days: ColumnRng,
}

impl ColumnStreams {
    fn new(bank: &RngBank) -> Self {
        Self {
            customer: bank.for_column(ColumnSlot::CustomerId),
            purchase_ts: bank.for_column(ColumnSlot::PurchaseTs),
            status: bank.for_column(ColumnSlot::Status),
            item_value: bank.for_column(ColumnSlot::ItemValue),
            freight_value: bank.for_column(ColumnSlot::FreightValue),
            delivery_days: bank.for_column(ColumnSlot::DeliveryDays),
            estimated_days: bank.for_column(ColumnSlot::EstimatedDays),
        }
    }
}

pub struct OrderGenerator<'a> {
    config: &'a GeneratorConfig,
    rng_bank: RngBank,
}

impl<'a> OrderGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig, seed: Seed) -> Self {
        Self {
            config,
            rng_bank: RngBank::new(seed),
        }
    }

    /// Produce exactly `n_orders` rows. Fails only on an invalid config.
    pub fn generate(&self) -> CohortResult<Vec<Order>> {
        self.config.validate()?;

        let cfg = self.config;
        let mut streams = ColumnStreams::new(&self.rng_bank);
        let window_seconds = cfg.window_seconds() as u64;
        let status_dist = WeightedIndex::new(cfg.status_weights.as_array()).map_err(|e| {
            CohortError::InvalidConfig {
                field: "status_weights",
                reason: e.to_string(),
            }
        })?;

        let mut orders = Vec::with_capacity(cfg.n_orders as usize);
        for order_id in 1..=cfg.n_orders {
            orders.push(self.generate_order(
                order_id,
                &mut streams,
                window_seconds,
                &status_dist,
            ));
        }

        log::info!(
            "generator: {} orders over {} customers ({} .. {})",
            orders.len(),
            cfg.n_customers,
            cfg.window_start,
            cfg.window_end
        );
        Ok(orders)
    }

    fn generate_order(
        &self,
        order_id: OrderId,
        streams: &mut ColumnStreams,
        window_seconds: u64,
        status_dist: &WeightedIndex<f64>,
    ) -> Order {
        let cfg = self.config;

        let customer_id =
            1 + streams.customer.next_u64_below(u64::from(cfg.n_customers)) as CustomerId;

        // Inclusive upper bound: the window end itself is a valid instant.
        let offset = streams.purchase_ts.next_u64_below(window_seconds + 1);
        let order_purchase_ts = cfg.window_start + Duration::seconds(offset as i64);

        let order_status = OrderStatus::ALL[streams.status.sample(status_dist)];

        let item_value = round_to(draw_gamma(&mut streams.item_value, &cfg.item_value), 2);
        let freight_value =
            round_to(draw_normal(&mut streams.freight_value, &cfg.freight_value), 2);
        let gross_value = round_to(item_value + freight_value, 2);

        let delivery_days =
            round_to(draw_normal(&mut streams.delivery_days, &cfg.delivery_days), 0) as i64;
        let estimated_days =
            round_to(draw_normal(&mut streams.estimated_days, &cfg.estimated_days), 0) as i64;
        let delivered_minus_estimated_days = delivery_days - estimated_days;

        Order {
            order_id,
            customer_id,
            order_purchase_ts,
            order_date: order_purchase_ts.date(),
            order_status,
            item_value,
            freight_value,
            gross_value,
            delivery_days,
            delivered_minus_estimated_days,
            on_time_delivery_flag: Order::on_time_flag(order_status, delivered_minus_estimated_days),
        }
    }
}

fn draw_gamma(rng: &mut ColumnRng, model: &GammaModel) -> f64 {
    rng.gamma(model.shape, model.scale).clamp(model.min, model.max)
}

fn draw_normal(rng: &mut ColumnRng, model: &NormalModel) -> f64 {
    rng.normal(model.mean, model.std_dev).clamp(model.min, model.max)
}
