use crate::{
    calendar::ymd_hms,
    error::{CohortError, CohortResult},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusWeights {
    pub delivered: f64,
    pub canceled: f64,
    pub processing: f64,
}

impl StatusWeights {
    /// Weights in `OrderStatus::ALL` order.
    pub fn as_array(&self) -> [f64; 3] {
        [self.delivered, self.canceled, self.processing]
    }
}

/// Gamma draw clipped to [min, max].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaModel {
    pub shape: f64,
    pub scale: f64,
    pub min: f64,
    pub max: f64,
}

/// Normal draw clipped to [min, max].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalModel {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub n_customers: u32,
    pub n_orders: u64,
    #[serde(with = "ymd_hms")]
    pub window_start: NaiveDateTime,
    #[serde(with = "ymd_hms")]
    pub window_end: NaiveDateTime,
    pub status_weights: StatusWeights,
    pub item_value: GammaModel,
    pub freight_value: NormalModel,
    pub delivery_days: NormalModel,
    pub estimated_days: NormalModel,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_customers: 3000,
            n_orders: 45_000,
            window_start: midnight(2016, 9, 4),
            window_end: midnight(2018, 10, 17),
            status_weights: StatusWeights {
                delivered: 0.88,
                canceled: 0.07,
                processing: 0.05,
            },
            item_value: GammaModel {
                shape: 2.2,
                scale: 35.0,
                min: 8.0,
                max: 800.0,
            },
            freight_value: NormalModel {
                mean: 12.0,
                std_dev: 6.0,
                min: 0.0,
                max: 60.0,
            },
            delivery_days: NormalModel {
                mean: 7.5,
                std_dev: 3.0,
                min: 1.0,
                max: 30.0,
            },
            estimated_days: NormalModel {
                mean: 8.0,
                std_dev: 2.5,
                min: 2.0,
                max: 30.0,
            },
        }
    }
}

impl GeneratorConfig {
    /// Load a config from a JSON file. Fields missing from the file
    /// keep their reference defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GeneratorConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Config with a small population for use in tests.
    pub fn default_test() -> Self {
        Self {
            n_customers: 50,
            n_orders: 600,
            ..Self::default()
        }
    }

    /// Window length in whole seconds.
    pub fn window_seconds(&self) -> i64 {
        (self.window_end - self.window_start).num_seconds()
    }

    /// Reject configs the generator cannot honour.
    pub fn validate(&self) -> CohortResult<()> {
        if self.n_customers == 0 {
            return Err(invalid("n_customers", "must be > 0"));
        }
        if self.n_orders == 0 {
            return Err(invalid("n_orders", "must be > 0"));
        }
        if self.window_end <= self.window_start {
            return Err(invalid(
                "window_end",
                format!("{} is not after {}", self.window_end, self.window_start),
            ));
        }

        let weights = self.status_weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(invalid("status_weights", "weights must be finite and >= 0"));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(invalid("status_weights", "weights must not all be zero"));
        }

        let gamma = &self.item_value;
        if !(gamma.shape.is_finite() && gamma.shape > 0.0) {
            return Err(invalid("item_value", "shape must be > 0"));
        }
        if !(gamma.scale.is_finite() && gamma.scale > 0.0) {
            return Err(invalid("item_value", "scale must be > 0"));
        }
        check_range("item_value", gamma.min, gamma.max)?;

        for (field, model) in [
            ("freight_value", &self.freight_value),
            ("delivery_days", &self.delivery_days),
            ("estimated_days", &self.estimated_days),
        ] {
            if !model.mean.is_finite() {
                return Err(invalid(field, "mean must be finite"));
            }
            if !(model.std_dev.is_finite() && model.std_dev >= 0.0) {
                return Err(invalid(field, "std_dev must be >= 0"));
            }
            check_range(field, model.min, model.max)?;
        }

        // Money must never go negative.
        if self.item_value.min < 0.0 {
            return Err(invalid("item_value", "min must be >= 0"));
        }
        if self.freight_value.min < 0.0 {
            return Err(invalid("freight_value", "min must be >= 0"));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, min: f64, max: f64) -> CohortResult<()> {
    if !(min.is_finite() && max.is_finite()) || min > max {
        return Err(invalid(field, format!("clip range [{min}, {max}] is empty")));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> CohortError {
    CohortError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}
