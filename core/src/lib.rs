//! Synthetic e-commerce orders and the monthly cohort retention table
//! derived from them.

pub mod calendar;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod order;
pub mod pipeline;
pub mod retention;
pub mod rng;
pub mod schema;
pub mod types;
