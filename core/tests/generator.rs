//! Order table generation tests.

use cohort_core::{
    config::GeneratorConfig,
    generator::OrderGenerator,
    order::{Order, OrderStatus},
    schema,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn generate(config: &GeneratorConfig, seed: u64) -> Vec<Order> {
    OrderGenerator::new(config, seed).generate().unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn generates_exact_row_count_with_gapless_ids() {
    let config = GeneratorConfig::default_test();
    let orders = generate(&config, 42);

    assert_eq!(orders.len() as u64, config.n_orders);
    for (idx, o) in orders.iter().enumerate() {
        assert_eq!(o.order_id, idx as u64 + 1, "order ids must run 1..N");
    }
}

#[test]
fn customers_and_timestamps_stay_in_range() {
    let config = GeneratorConfig::default_test();
    let orders = generate(&config, 11);

    for o in &orders {
        assert!(
            (1..=config.n_customers).contains(&o.customer_id),
            "customer_id {} out of range",
            o.customer_id
        );
        assert!(o.order_purchase_ts >= config.window_start);
        assert!(o.order_purchase_ts <= config.window_end);
        assert_eq!(o.order_date, o.order_purchase_ts.date());
    }
}

#[test]
fn money_columns_respect_clips_and_sum() {
    let config = GeneratorConfig::default_test();
    let orders = generate(&config, 3);

    for o in &orders {
        assert!(o.item_value >= config.item_value.min && o.item_value <= config.item_value.max);
        assert!(
            o.freight_value >= config.freight_value.min
                && o.freight_value <= config.freight_value.max
        );
        assert!(
            (o.gross_value - (o.item_value + o.freight_value)).abs() < 0.006,
            "gross {} != {} + {}",
            o.gross_value,
            o.item_value,
            o.freight_value
        );
        // Two decimal places.
        assert!(((o.item_value * 100.0).round() - o.item_value * 100.0).abs() < 1e-6);
    }
}

#[test]
fn delivery_columns_respect_clips() {
    let config = GeneratorConfig::default_test();
    let orders = generate(&config, 8);

    for o in &orders {
        assert!((1..=30).contains(&o.delivery_days));
        // delivery in [1, 30], estimate in [2, 30]
        assert!((-29..=28).contains(&o.delivered_minus_estimated_days));
    }
}

#[test]
fn on_time_flag_only_for_delivered_orders() {
    let orders = generate(&GeneratorConfig::default_test(), 21);

    for o in &orders {
        match o.order_status {
            OrderStatus::Delivered => {
                let expected = u8::from(o.delivered_minus_estimated_days <= 0);
                assert_eq!(o.on_time_delivery_flag, Some(expected));
            }
            _ => assert_eq!(o.on_time_delivery_flag, None),
        }
    }
}

#[test]
fn on_time_boundary_counts_as_on_time() {
    assert_eq!(Order::on_time_flag(OrderStatus::Delivered, 0), Some(1));
    assert_eq!(Order::on_time_flag(OrderStatus::Delivered, -3), Some(1));
    assert_eq!(Order::on_time_flag(OrderStatus::Delivered, 1), Some(0));
    assert_eq!(Order::on_time_flag(OrderStatus::Canceled, 0), None);
    assert_eq!(Order::on_time_flag(OrderStatus::Processing, -2), None);
}

#[test]
fn delivered_is_the_majority_status() {
    let config = GeneratorConfig {
        n_orders: 5_000,
        ..GeneratorConfig::default_test()
    };
    let orders = generate(&config, 77);

    let delivered = orders
        .iter()
        .filter(|o| o.order_status.is_delivered())
        .count() as f64;
    let share = delivered / orders.len() as f64;
    assert!(
        (share - 0.88).abs() < 0.03,
        "delivered share {share:.3} too far from 0.88"
    );
    for status in [OrderStatus::Canceled, OrderStatus::Processing] {
        assert!(
            orders.iter().any(|o| o.order_status == status),
            "no {status} rows generated"
        );
    }
}

#[test]
fn zero_weight_status_never_generated() {
    let mut config = GeneratorConfig::default_test();
    config.status_weights.processing = 0.0;
    let orders = generate(&config, 4);
    assert!(orders
        .iter()
        .all(|o| o.order_status != OrderStatus::Processing));
}

#[test]
fn generated_table_passes_schema_checks() {
    let orders = generate(&GeneratorConfig::default_test(), 1234);
    schema::validate_orders(&orders).unwrap();
}
