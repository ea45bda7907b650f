#![forbid(unsafe_code)]

//! Estimate tracking with a local mirror and best-effort remote sync.

pub mod analytics;
pub mod audit;
pub mod config;
pub mod errors;
pub mod mode;
pub mod models;
pub mod persistence;
pub mod remote;
pub mod startup;
pub mod store;
pub mod timefmt;
pub mod views;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
pub use store::EstimateStore;
