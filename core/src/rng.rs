//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through ColumnRng instances derived
//! from the single master seed of the run.
//!
//! Each generated column gets its own RNG stream, seeded deterministically
//! from (master_seed XOR column_index). This means:
//!   - Changing one column's model never shifts another column's values.
//!   - Each column's stream is fully reproducible in isolation.

use rand::{distributions::Distribution, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single column.
pub struct ColumnRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl ColumnRng {
    /// Create a column RNG from the master seed and a stable
    /// column index. The index must never change once assigned.
    pub fn new(master_seed: u64, column_index: u64) -> Self {
        let derived_seed = master_seed ^ (column_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in (0.0, 1.0]. Safe to pass to `ln`.
    pub fn next_f64_open(&mut self) -> f64 {
        1.0 - self.next_f64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::Rng;
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Draw from any `rand` distribution using this column's stream.
    pub fn sample<T, D: Distribution<T>>(&mut self, dist: &D) -> T {
        dist.sample(&mut self.inner)
    }

    /// Standard normal draw (Box-Muller, cosine branch only).
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = self.next_f64_open();
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// Sample from a normal distribution with the given mean and std dev.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }

    /// Sample from a gamma distribution (Marsaglia-Tsang).
    /// Mean is shape * scale.
    pub fn gamma(&mut self, shape: f64, scale: f64) -> f64 {
        if shape < 1.0 {
            // Boost: Gamma(a) = Gamma(a + 1) * U^(1/a)
            let u = self.next_f64_open();
            return self.gamma(shape + 1.0, scale) * u.powf(1.0 / shape);
        }
        let d = shape - 1.0 / 3.0;
        let c = 1.0 / (9.0 * d).sqrt();
        loop {
            let x = self.standard_normal();
            let v = 1.0 + c * x;
            if v <= 0.0 {
                continue;
            }
            let v = v * v * v;
            let u = self.next_f64_open();
            if u < 1.0 - 0.0331 * x.powi(4) || u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
                return d * v * scale;
            }
        }
    }
}

/// All column RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_column(&self, slot: ColumnSlot) -> ColumnRng {
        ColumnRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable column slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every column's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum ColumnSlot {
    CustomerId = 0,
    PurchaseTs = 1,
    Status = 2,
    ItemValue = 3,
    FreightValue = 4,
    DeliveryDays = 5,
    EstimatedDays = 6,
    // Add new columns here — append only.
}

impl ColumnSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CustomerId => "customer_id",
            Self::PurchaseTs => "order_purchase_ts",
            Self::Status => "order_status",
            Self::ItemValue => "item_value",
            Self::FreightValue => "freight_value",
            Self::DeliveryDays => "delivery_days",
            Self::EstimatedDays => "estimated_days",
        }
    }
}
