//! Shared primitive types used across the entire pipeline.

/// A synthetic customer. Ids run 1..=n_customers.
pub type CustomerId = u32;

/// A synthetic order. Ids run 1..=n_orders with no gaps.
pub type OrderId = u64;

/// The master seed for a run.
pub type Seed = u64;
