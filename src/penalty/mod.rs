//! Penalty-function encoding into a quadratic unconstrained binary model.
//!
//! Every hard constraint is restated as `lb <= Σ a_k x_k <= ub` and turned
//! into a squared residual weighted by λ. Equalities square directly;
//! inequalities gain integer slack spelled by binary or unary bits.
//!
//! The resulting [`QuboModel`] is consumed by the samplers in
//! [`crate::sampler`]. Decoded samples must be re-checked with
//! [`SolutionEvaluator`](crate::evaluate::SolutionEvaluator): a low energy
//! is never a proof of feasibility.

mod builder;
mod compiled;
mod config;
mod model;
mod slack;

pub use builder::PenaltyModelBuilder;
pub use compiled::CompiledQubo;
pub use config::{LambdaPolicy, PenaltyConfig, SlackEncoding};
pub use model::{
    ConstraintEncoding, EncodingRule, PenaltyTerm, QuboModel, QuboSample, QuboVar, SlackVar,
};
pub use slack::{slack_bit_count, slack_weights};
