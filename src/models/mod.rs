//! Domain model module declarations.

pub mod estimate;

pub use estimate::{Estimate, EstimateStatus, EstimateType, IntakeForm, LooseNumber};
