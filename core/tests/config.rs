use cohort_core::{
    config::GeneratorConfig,
    error::CohortError,
    generator::OrderGenerator,
    pipeline::Pipeline,
};
use std::fs;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn rejected_field(config: &GeneratorConfig) -> &'static str {
    match config.validate() {
        Err(CohortError::InvalidConfig { field, .. }) => field,
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn shipped_config_file_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/generator_config.json");
    let loaded = GeneratorConfig::load(path).unwrap();
    assert_eq!(loaded, GeneratorConfig::default());
    loaded.validate().unwrap();
}

#[test]
fn partial_config_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.json");
    fs::write(&path, r#"{ "n_customers": 10, "n_orders": 25 }"#).unwrap();

    let loaded = GeneratorConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded.n_customers, 10);
    assert_eq!(loaded.n_orders, 25);
    assert_eq!(loaded.window_start, GeneratorConfig::default().window_start);
    assert_eq!(loaded.status_weights, GeneratorConfig::default().status_weights);

    let pipeline = Pipeline::build(path.to_str(), 1).unwrap();
    assert_eq!(pipeline.generate().unwrap().len(), 25);
}

#[test]
fn missing_config_file_is_an_error() {
    assert!(GeneratorConfig::load("/nonexistent/generator_config.json").is_err());
    assert!(Pipeline::build(Some("/nonexistent/generator_config.json"), 1).is_err());
}

#[test]
fn invalid_configs_are_rejected() {
    let base = GeneratorConfig::default_test();

    let mut c = base.clone();
    c.n_customers = 0;
    assert_eq!(rejected_field(&c), "n_customers");

    let mut c = base.clone();
    c.n_orders = 0;
    assert_eq!(rejected_field(&c), "n_orders");

    let mut c = base.clone();
    c.window_end = c.window_start;
    assert_eq!(rejected_field(&c), "window_end");

    let mut c = base.clone();
    c.status_weights.canceled = -0.1;
    assert_eq!(rejected_field(&c), "status_weights");

    let mut c = base.clone();
    c.status_weights.delivered = 0.0;
    c.status_weights.canceled = 0.0;
    c.status_weights.processing = 0.0;
    assert_eq!(rejected_field(&c), "status_weights");

    let mut c = base.clone();
    c.item_value.shape = 0.0;
    assert_eq!(rejected_field(&c), "item_value");

    let mut c = base.clone();
    c.delivery_days.min = 40.0;
    assert_eq!(rejected_field(&c), "delivery_days");

    let mut c = base;
    c.freight_value.min = -5.0;
    assert_eq!(rejected_field(&c), "freight_value");
}

#[test]
fn generator_refuses_invalid_config() {
    let mut config = GeneratorConfig::default_test();
    config.n_orders = 0;
    assert!(OrderGenerator::new(&config, 42).generate().is_err());
}

#[test]
fn weights_need_not_sum_to_one() {
    let mut config = GeneratorConfig::default_test();
    config.status_weights.delivered = 88.0;
    config.status_weights.canceled = 7.0;
    config.status_weights.processing = 5.0;
    config.validate().unwrap();
    assert_eq!(OrderGenerator::new(&config, 42).generate().unwrap().len(), 600);
}
