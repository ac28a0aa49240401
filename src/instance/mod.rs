//! Problem instances for constrained object-to-box assignment.
//!
//! A [`ProblemInstance`] holds the objects, boxes, per-pair cost/profit
//! tables, and a list of typed constraints:
//!
//! - **assignment-cardinality**: each object sits in at most / exactly one box
//! - **occupancy-bound**: each box holds between `lb` and `ub` objects
//! - **linear-budget**: a cost-weighted sum lies in `[lb, ub]`
//!
//! Incompatible pairs (absent table entries) never get a
//! [`DecisionVar`]; compatibility is structural, not a constraint.
//!
//! Every constraint kind reduces to one [`LinearForm`] through
//! [`ProblemInstance::linear_form`], which is what the evaluator, the
//! linear model, and the penalty encoder consume.

mod assignment;
mod constraint;
mod model;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use assignment::CandidateAssignment;
pub use constraint::{BudgetScope, ConstraintKind, ConstraintSpec, LinearForm, ACTIVITY_TOLERANCE};
pub use model::{InstanceBuilder, ProblemInstance, Table};
pub use types::{Cardinality, DecisionVar, Hardness, OccupancyPolicy, Sense};
