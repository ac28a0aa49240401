//! Solution evaluation and ranking.
//!
//! [`SolutionEvaluator`] checks any [`CandidateAssignment`](crate::instance::CandidateAssignment)
//! against the constraints of its instance and produces an
//! [`EvaluationReport`]: feasibility, itemized violations with magnitudes,
//! total cost and profit, and the objective value. The same evaluator serves
//! enumerated candidates, linear-program output, and sampler output after
//! slack stripping.
//!
//! [`group_by_value`] and [`SolutionEvaluator::degenerate_optima`] surface
//! every equally-good assignment instead of an arbitrary one.

mod degeneracy;
mod evaluator;
mod report;

pub use degeneracy::{
    group_by_value, DegenerateGroup, ScoredCandidate, ValueGroup, DEFAULT_VALUE_TOLERANCE,
};
pub use evaluator::SolutionEvaluator;
pub use report::{EvaluationReport, Violation, ViolationSource};
