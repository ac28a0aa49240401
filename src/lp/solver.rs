//! LP solver interface and a reference 0/1 branch-and-bound.

use super::model::{LinearProgram, RowSense};
use crate::instance::{CandidateAssignment, DecisionVar, Sense, ACTIVITY_TOLERANCE};
use log::debug;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LpStatus {
    /// Proven optimal solution found.
    Optimal,
    /// No assignment satisfies the rows.
    Infeasible,
    /// Objective unbounded in the solver's direction.
    Unbounded,
    /// Solver stopped without a proof (limit reached, crash, ...).
    NotSolved,
}

/// Output of an [`LpSolver`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpSolution {
    pub status: LpStatus,
    /// Column values; may be empty when no solution was found.
    pub values: Vec<(DecisionVar, f64)>,
    /// Objective in the program's own sense.
    pub objective: Option<f64>,
}

impl LpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: LpStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: None,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == LpStatus::Optimal
    }

    /// Pairs whose column value rounds to 1.
    pub fn to_candidate(&self) -> CandidateAssignment {
        self.values
            .iter()
            .filter(|(_, x)| *x > 0.5)
            .map(|(v, _)| *v)
            .collect()
    }
}

/// Trait for linear-programming back ends.
///
/// Implementors may wrap an external MILP solver; the caller owns any
/// timeout or cancellation policy around the call.
pub trait LpSolver {
    fn solve(&self, program: &LinearProgram) -> LpSolution;
}

/// Depth-first 0/1 branch-and-bound with row-activity pruning.
///
/// Columns are fixed in order. A branch is cut when some row can no longer
/// be met by any completion of the free columns, or when the best possible
/// completion cannot beat the incumbent. Exact, but exponential in the
/// worst case; meant for tests and small instances.
#[derive(Debug, Clone)]
pub struct BinaryBranchAndBound {
    /// Node budget; reaching it yields [`LpStatus::NotSolved`].
    pub max_nodes: u64,
}

impl BinaryBranchAndBound {
    pub fn new() -> Self {
        Self {
            max_nodes: 10_000_000,
        }
    }

    pub fn with_max_nodes(mut self, n: u64) -> Self {
        self.max_nodes = n;
        self
    }
}

impl Default for BinaryBranchAndBound {
    fn default() -> Self {
        Self::new()
    }
}

impl LpSolver for BinaryBranchAndBound {
    fn solve(&self, program: &LinearProgram) -> LpSolution {
        let n = program.num_columns();
        // minimization form
        let cost: Vec<f64> = match program.sense() {
            Sense::MinimizeCost => program.objective().to_vec(),
            Sense::MaximizeProfit => program.objective().iter().map(|c| -c).collect(),
        };

        let mut incidence: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for (r, row) in program.rows().iter().enumerate() {
            for &(k, a) in &row.coefficients {
                incidence[k].push((r, a));
            }
        }
        let mut free_neg = vec![0.0; program.rows().len()];
        let mut free_pos = vec![0.0; program.rows().len()];
        for (r, row) in program.rows().iter().enumerate() {
            for &(_, a) in &row.coefficients {
                if a < 0.0 {
                    free_neg[r] += a;
                } else {
                    free_pos[r] += a;
                }
            }
        }
        // optimistic objective of the suffix k..n
        let mut suffix_bound = vec![0.0; n + 1];
        for k in (0..n).rev() {
            suffix_bound[k] = suffix_bound[k + 1] + cost[k].min(0.0);
        }

        let mut search = Search {
            program,
            cost: &cost,
            incidence: &incidence,
            suffix_bound: &suffix_bound,
            activity: vec![0.0; program.rows().len()],
            free_neg,
            free_pos,
            values: vec![false; n],
            best: None,
            nodes: 0,
            max_nodes: self.max_nodes,
        };
        let completed = search.descend(0, 0.0);
        debug!(
            "branch-and-bound visited {} nodes over {} columns",
            search.nodes, n
        );

        let (status, best) = match (completed, search.best) {
            (true, Some(best)) => (LpStatus::Optimal, Some(best)),
            (true, None) => (LpStatus::Infeasible, None),
            (false, best) => (LpStatus::NotSolved, best),
        };
        let Some((_, bits)) = best else {
            return LpSolution::empty(status);
        };
        let values: Vec<f64> = bits.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
        LpSolution {
            status,
            objective: Some(program.objective_value(&values)),
            values: program.columns().iter().copied().zip(values).collect(),
        }
    }
}

struct Search<'p> {
    program: &'p LinearProgram,
    cost: &'p [f64],
    incidence: &'p [Vec<(usize, f64)>],
    suffix_bound: &'p [f64],
    activity: Vec<f64>,
    free_neg: Vec<f64>,
    free_pos: Vec<f64>,
    values: Vec<bool>,
    best: Option<(f64, Vec<bool>)>,
    nodes: u64,
    max_nodes: u64,
}

impl Search<'_> {
    /// Explores columns `k..`; `false` if the node budget ran out.
    fn descend(&mut self, k: usize, objective: f64) -> bool {
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return false;
        }
        if let Some((best, _)) = &self.best {
            if objective + self.suffix_bound[k] >= best - ACTIVITY_TOLERANCE {
                return true;
            }
        }
        if k == self.values.len() {
            if self.rows_reachable() {
                self.best = Some((objective, self.values.clone()));
            }
            return true;
        }

        self.release(k);
        let order = if self.cost[k] < 0.0 { [true, false] } else { [false, true] };
        for value in order {
            self.values[k] = value;
            if value {
                self.apply(k, 1.0);
            }
            let step = if value { self.cost[k] } else { 0.0 };
            let ok = !self.rows_reachable() || self.descend(k + 1, objective + step);
            if value {
                self.apply(k, -1.0);
            }
            if !ok {
                self.values[k] = false;
                self.capture(k);
                return false;
            }
        }
        self.values[k] = false;
        self.capture(k);
        true
    }

    /// Moves column `k` out of the free pool.
    fn release(&mut self, k: usize) {
        for &(r, a) in &self.incidence[k] {
            if a < 0.0 {
                self.free_neg[r] -= a;
            } else {
                self.free_pos[r] -= a;
            }
        }
    }

    /// Returns column `k` to the free pool.
    fn capture(&mut self, k: usize) {
        for &(r, a) in &self.incidence[k] {
            if a < 0.0 {
                self.free_neg[r] += a;
            } else {
                self.free_pos[r] += a;
            }
        }
    }

    fn apply(&mut self, k: usize, sign: f64) {
        for &(r, a) in &self.incidence[k] {
            self.activity[r] += sign * a;
        }
    }

    /// Whether every row can still be met by some completion.
    fn rows_reachable(&self) -> bool {
        self.program.rows().iter().enumerate().all(|(r, row)| {
            let lo = self.activity[r] + self.free_neg[r];
            let hi = self.activity[r] + self.free_pos[r];
            match row.sense {
                RowSense::Le => lo <= row.rhs + ACTIVITY_TOLERANCE,
                RowSense::Ge => hi >= row.rhs - ACTIVITY_TOLERANCE,
                RowSense::Eq => {
                    lo <= row.rhs + ACTIVITY_TOLERANCE && hi >= row.rhs - ACTIVITY_TOLERANCE
                }
            }
        })
    }
}
