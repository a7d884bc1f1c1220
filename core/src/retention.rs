//! Cohort retention calculator.
//!
//! A customer's cohort is the month of their earliest delivered order.
//! For every (cohort month, order month) pair with at least one active
//! customer we emit one row; months without activity produce no row.
//!
//! Passes:
//!   1. Keep delivered orders, bucket each by month.
//!   2. customer -> min(order month)                 (cohort assignment)
//!   3. cohort -> distinct members                   (cohort size)
//!   4. (cohort, age, order month) -> distinct ids   (activity)
//!   5. rate = active / size, rounded to 6 places.
//!
//! RULE: every count is a count of DISTINCT customers, never of rows.

use crate::{
    calendar::{months_between, ymd},
    order::{round_to, Order},
    types::CustomerId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Column names of `metrics_cohort_retention_monthly`, in file order.
pub const RETENTION_COLUMNS: [&str; 6] = [
    "cohort_month",
    "order_month",
    "cohort_age_months",
    "active_customers",
    "cohort_customers",
    "retention_rate",
];

pub const RATE_DECIMALS: i32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionRow {
    #[serde(with = "ymd")]
    pub cohort_month: NaiveDate,
    #[serde(with = "ymd")]
    pub order_month: NaiveDate,
    pub cohort_age_months: u32,
    pub active_customers: usize,
    pub cohort_customers: usize,
    pub retention_rate: f64,
}

/// Per-cohort roll-up of the retention table.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortSummary {
    pub cohort_month: NaiveDate,
    pub cohort_customers: usize,
    pub observed_months: usize,
    pub max_age_months: u32,
}

#[derive(Default)]
struct CohortAccumulator {
    members: BTreeSet<CustomerId>,
    // Keyed by age first so iteration is already in output order.
    activity: BTreeMap<(u32, NaiveDate), BTreeSet<CustomerId>>,
}

/// The computed table, sorted by (cohort_month, cohort_age_months).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetentionTable {
    rows: Vec<RetentionRow>,
}

impl RetentionTable {
    pub fn compute(orders: &[Order]) -> Self {
        let delivered: Vec<(CustomerId, NaiveDate)> = orders
            .iter()
            .filter(|o| o.order_status.is_delivered())
            .map(|o| (o.customer_id, o.order_month()))
            .collect();

        if delivered.is_empty() {
            log::warn!("retention: no delivered orders among {} rows", orders.len());
            return Self::default();
        }

        let mut cohort_of: BTreeMap<CustomerId, NaiveDate> = BTreeMap::new();
        for &(customer, month) in &delivered {
            cohort_of
                .entry(customer)
                .and_modify(|first| *first = (*first).min(month))
                .or_insert(month);
        }

        let mut cohorts: BTreeMap<NaiveDate, CohortAccumulator> = BTreeMap::new();
        for (&customer, &cohort_month) in &cohort_of {
            cohorts.entry(cohort_month).or_default().members.insert(customer);
        }

        for &(customer, order_month) in &delivered {
            let Some(&cohort_month) = cohort_of.get(&customer) else {
                continue;
            };
            let age = months_between(cohort_month, order_month);
            debug_assert!(age >= 0, "order month precedes its own cohort");
            if let Some(acc) = cohorts.get_mut(&cohort_month) {
                acc.activity
                    .entry((age.max(0) as u32, order_month))
                    .or_default()
                    .insert(customer);
            }
        }

        let mut rows = Vec::new();
        for (cohort_month, acc) in &cohorts {
            let cohort_customers = acc.members.len();
            log::debug!(
                "retention: cohort {cohort_month} size={cohort_customers} months={}",
                acc.activity.len()
            );
            for ((age, order_month), active) in &acc.activity {
                rows.push(RetentionRow {
                    cohort_month: *cohort_month,
                    order_month: *order_month,
                    cohort_age_months: *age,
                    active_customers: active.len(),
                    cohort_customers,
                    retention_rate: retention_rate(active.len(), cohort_customers),
                });
            }
        }

        log::info!(
            "retention: {} delivered orders, {} customers, {} cohorts, {} rows",
            delivered.len(),
            cohort_of.len(),
            cohorts.len(),
            rows.len()
        );
        Self { rows }
    }

    pub fn rows(&self) -> &[RetentionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rate for a cohort at a given age, if that month saw any activity.
    pub fn rate(&self, cohort_month: NaiveDate, age: u32) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.cohort_month == cohort_month && r.cohort_age_months == age)
            .map(|r| r.retention_rate)
    }

    pub fn cohorts(&self) -> Vec<CohortSummary> {
        let mut out: Vec<CohortSummary> = Vec::new();
        for row in &self.rows {
            match out.last_mut() {
                Some(last) if last.cohort_month == row.cohort_month => {
                    last.observed_months += 1;
                    last.max_age_months = last.max_age_months.max(row.cohort_age_months);
                }
                _ => out.push(CohortSummary {
                    cohort_month: row.cohort_month,
                    cohort_customers: row.cohort_customers,
                    observed_months: 1,
                    max_age_months: row.cohort_age_months,
                }),
            }
        }
        out
    }
}

/// active / size rounded half-to-even. `size` is never zero for a
/// cohort that exists.
pub fn retention_rate(active: usize, size: usize) -> f64 {
    if size == 0 {
        return 0.0;
    }
    round_to(active as f64 / size as f64, RATE_DECIMALS)
}
