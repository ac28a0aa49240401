//! Typed constraint specifications and their shared linear form.

use super::types::{Cardinality, DecisionVar, Hardness};

/// Tolerance used when comparing a constraint activity with its bounds.
pub const ACTIVITY_TOLERANCE: f64 = 1e-9;

/// Which pairs a budget constraint sums over.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BudgetScope {
    /// Every compatible pair of the instance.
    All,
    /// An explicit list of pairs; each must be compatible.
    Pairs(Vec<DecisionVar>),
}

/// The closed set of constraint kinds an instance can carry.
///
/// Adding a kind means adding a variant here and one arm in
/// [`ProblemInstance::linear_form`](super::ProblemInstance::linear_form);
/// every consumer works from the resulting [`LinearForm`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// Number of boxes holding `object`.
    AssignmentCardinality {
        object: usize,
        cardinality: Cardinality,
    },

    /// Number of objects held by `box_idx` lies in `[lb, ub]`.
    ///
    /// `ub = None` leaves the upper side open.
    OccupancyBound {
        box_idx: usize,
        lb: u32,
        ub: Option<u32>,
    },

    /// Cost-weighted sum over `scope` lies in `[lb, ub]`.
    ///
    /// Either side may be infinite.
    LinearBudget { scope: BudgetScope, lb: f64, ub: f64 },
}

/// A labelled constraint with its hardness.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintSpec {
    /// Human-readable label, unique within an instance by convention.
    pub label: String,
    /// What the constraint restricts.
    pub kind: ConstraintKind,
    /// Whether violations decide feasibility.
    pub hardness: Hardness,
}

impl ConstraintSpec {
    pub fn new(label: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            label: label.into(),
            kind,
            hardness: Hardness::Hard,
        }
    }

    /// Marks the constraint as soft.
    pub fn soft(mut self) -> Self {
        self.hardness = Hardness::Soft;
        self
    }

    pub fn is_hard(&self) -> bool {
        self.hardness == Hardness::Hard
    }

    /// Short name of the constraint kind, used in logs and reports.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ConstraintKind::AssignmentCardinality { .. } => "assignment-cardinality",
            ConstraintKind::OccupancyBound { .. } => "occupancy-bound",
            ConstraintKind::LinearBudget { .. } => "linear-budget",
        }
    }
}

/// `lb <= Σ a_k x_k <= ub` over compatible decision variables.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearForm {
    /// `(variable, coefficient)` pairs, each variable at most once.
    pub terms: Vec<(DecisionVar, f64)>,
    /// Lower bound, possibly `-inf`.
    pub lb: f64,
    /// Upper bound, possibly `+inf`.
    pub ub: f64,
}

impl LinearForm {
    /// Sums the coefficients of the variables for which `is_set` holds.
    pub fn activity(&self, mut is_set: impl FnMut(DecisionVar) -> bool) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| is_set(*v))
            .map(|(_, a)| a)
            .sum()
    }

    /// Range of activities reachable by some 0/1 assignment of the terms.
    pub fn achievable_range(&self) -> (f64, f64) {
        self.terms.iter().fold((0.0, 0.0), |(lo, hi), &(_, a)| {
            if a < 0.0 {
                (lo + a, hi)
            } else {
                (lo, hi + a)
            }
        })
    }

    /// Distance of `activity` from `[lb, ub]`; zero inside the interval.
    pub fn violation(&self, activity: f64) -> f64 {
        if activity < self.lb - ACTIVITY_TOLERANCE {
            self.lb - activity
        } else if activity > self.ub + ACTIVITY_TOLERANCE {
            activity - self.ub
        } else {
            0.0
        }
    }

    pub fn is_equality(&self) -> bool {
        self.lb == self.ub
    }
}
