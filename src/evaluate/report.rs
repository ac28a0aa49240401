//! Evaluation report types.

use crate::instance::DecisionVar;

/// What a violation refers to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViolationSource {
    /// A constraint of the instance, by position and label.
    Constraint { index: usize, label: String },
    /// The candidate sets a pair that has no decision variable.
    IncompatiblePair(DecisionVar),
}

/// One itemized violation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Violation {
    pub source: ViolationSource,
    /// Left-hand side value observed in the candidate.
    pub activity: f64,
    /// Distance from the allowed interval; always positive.
    pub magnitude: f64,
}

/// Result of evaluating one candidate against an instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationReport {
    /// `true` iff `violations` is empty.
    pub feasible: bool,
    /// Hard-constraint and incompatibility violations.
    pub violations: Vec<Violation>,
    /// Soft-constraint violations; reported but never decide feasibility.
    pub soft_violations: Vec<Violation>,
    /// Sum of costs over set compatible pairs.
    pub total_cost: f64,
    /// Sum of profits over set compatible pairs.
    pub total_profit: f64,
    /// Objective in the instance's own direction (cost, or profit).
    pub objective: f64,
    /// Objective in minimization form (cost, or negated profit).
    pub score: f64,
}

impl EvaluationReport {
    /// Sum of hard violation magnitudes.
    pub fn total_violation(&self) -> f64 {
        self.violations.iter().map(|v| v.magnitude).sum()
    }

    /// Labels of the violated hard constraints.
    pub fn violated_labels(&self) -> Vec<&str> {
        self.violations
            .iter()
            .filter_map(|v| match &v.source {
                ViolationSource::Constraint { label, .. } => Some(label.as_str()),
                ViolationSource::IncompatiblePair(_) => None,
            })
            .collect()
    }
}
