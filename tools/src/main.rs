//! cohort-gen: one-shot batch runner.
//!
//! Usage:
//!   cohort-gen                                   (seed 42, writes into .)
//!   cohort-gen --seed 7 --out-dir out --config data/generator_config.json
//!   cohort-gen --orders out/fact_orders.csv --out-dir out

use anyhow::{bail, Result};
use cohort_core::{
    pipeline::{Pipeline, RunSummary, DEFAULT_SEED},
    types::Seed,
};
use std::env;
use std::path::Path;

const FLAGS: [&str; 4] = ["--seed", "--out-dir", "--config", "--orders"];

#[derive(Debug, PartialEq)]
struct RunArgs {
    seed: Option<Seed>,
    out_dir: String,
    config_path: Option<String>,
    orders_path: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let run = parse_args(&args)?;
    let out_dir = Path::new(&run.out_dir);

    let summary = match &run.orders_path {
        Some(orders) => Pipeline::recompute(Path::new(orders), out_dir)?,
        None => Pipeline::build(run.config_path.as_deref(), run.seed.unwrap_or(DEFAULT_SEED))?
            .run(out_dir)?,
    };

    print_summary(&summary);
    Ok(())
}

/// Parse `--flag value` pairs. Unknown flags, missing values and
/// unparsable seeds are errors rather than silent defaults.
fn parse_args(args: &[String]) -> Result<RunArgs> {
    let mut run = RunArgs {
        seed: None,
        out_dir: ".".into(),
        config_path: None,
        orders_path: None,
    };

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        if !FLAGS.contains(&flag.as_str()) {
            bail!("unknown argument '{flag}' (expected one of: {})", FLAGS.join(", "));
        }
        let value = match iter.next() {
            Some(v) if !v.starts_with("--") => v.clone(),
            _ => bail!("{flag} requires a value"),
        };
        match flag.as_str() {
            "--seed" => run.seed = Some(parse_seed(&value)?),
            "--out-dir" => run.out_dir = value,
            "--config" => run.config_path = Some(value),
            _ => run.orders_path = Some(value),
        }
    }

    if run.orders_path.is_some() && (run.seed.is_some() || run.config_path.is_some()) {
        bail!("--orders recomputes from an existing table and cannot be combined with --seed or --config");
    }
    Ok(run)
}

fn parse_seed(value: &str) -> Result<Seed> {
    match value.parse() {
        Ok(seed) => Ok(seed),
        Err(_) => bail!("invalid --seed value '{value}'"),
    }
}

fn print_summary(summary: &RunSummary) {
    println!("Saved files:");
    if let Some(path) = &summary.fact_orders_path {
        println!("  {}", resolve(path));
    }
    println!("  {}", resolve(&summary.metrics_path));
    println!();
    println!("Rows:");
    if summary.fact_orders_path.is_some() {
        println!("  fact_orders: {}", summary.orders);
    }
    println!("  metrics_cohort_retention_monthly: {}", summary.retention_rows);
    log::info!(
        "delivered orders: {} of {}, cohorts: {}",
        summary.delivered_orders,
        summary.orders,
        summary.cohorts
    );
}

fn resolve(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_uses_defaults() {
        let run = parse_args(&[]).unwrap();
        assert_eq!(run.seed, None);
        assert_eq!(run.out_dir, ".");
        assert_eq!(run.config_path, None);
        assert_eq!(run.orders_path, None);
    }

    #[test]
    fn parses_all_generation_flags() {
        let run = parse_args(&args(&["--seed", "7", "--out-dir", "out", "--config", "c.json"]))
            .unwrap();
        assert_eq!(run.seed, Some(7));
        assert_eq!(run.out_dir, "out");
        assert_eq!(run.config_path.as_deref(), Some("c.json"));
    }

    #[test]
    fn malformed_seed_is_an_error() {
        let err = parse_args(&args(&["--seed", "notanumber"])).unwrap_err();
        assert!(err.to_string().contains("invalid --seed value 'notanumber'"), "{err}");
        assert!(parse_seed("-1").is_err());
        assert_eq!(parse_seed("42").unwrap(), 42);
    }

    #[test]
    fn flag_without_value_is_an_error() {
        assert!(parse_args(&args(&["--seed"])).is_err());
        assert!(parse_args(&args(&["--out-dir", "--seed", "3"])).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let err = parse_args(&args(&["--out_dir", "x"])).unwrap_err();
        assert!(err.to_string().contains("unknown argument '--out_dir'"), "{err}");
        assert!(parse_args(&args(&["stray"])).is_err());
    }

    #[test]
    fn orders_cannot_be_combined_with_generation_flags() {
        assert!(parse_args(&args(&["--orders", "f.csv", "--seed", "1"])).is_err());
        assert!(parse_args(&args(&["--orders", "f.csv", "--config", "c.json"])).is_err());

        let run = parse_args(&args(&["--orders", "f.csv", "--out-dir", "out"])).unwrap();
        assert_eq!(run.orders_path.as_deref(), Some("f.csv"));
    }
}
