//! Exact 0/1 linear formulation.
//!
//! [`LinearProgram`] restates the hard constraints one-to-one as rows over
//! the compatible pairs. Any [`LpSolver`] can consume it; the bundled
//! [`BinaryBranchAndBound`] is a small exact back end for tests and toy
//! instances. Its output goes through the same
//! [`SolutionEvaluator`](crate::evaluate::SolutionEvaluator) as every other
//! strategy via [`LpSolution::to_candidate`].

mod model;
mod solver;

pub use model::{LinearProgram, LpRow, RowSense};
pub use solver::{BinaryBranchAndBound, LpSolution, LpSolver, LpStatus};
