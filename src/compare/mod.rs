//! Cross-checking of solving strategies.
//!
//! Sampler output is never trusted on energy alone: slack bits are
//! stripped and every result, whatever its origin, is re-evaluated
//! against the instance. The enumerator, when registered, is the
//! authority on true infeasibility.

mod runner;
mod types;

pub use runner::StrategyComparison;
pub use types::{ComparisonReport, StrategyKind, StrategyOutcome};
