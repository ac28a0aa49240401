//! Comparison outcome types.

use crate::evaluate::{DegenerateGroup, EvaluationReport};
use crate::instance::CandidateAssignment;
use crate::lp::LpStatus;
use std::fmt;

/// Which solving strategy produced an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrategyKind {
    Enumeration,
    LinearProgram,
    /// A QUBO sampler, by the name it was registered under.
    Sampler(String),
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Enumeration => write!(f, "enumeration"),
            StrategyKind::LinearProgram => write!(f, "linear program"),
            StrategyKind::Sampler(name) => write!(f, "sampler `{name}`"),
        }
    }
}

/// What one strategy returned, after re-evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategyOutcome {
    pub strategy: StrategyKind,
    /// Best assignment the strategy offers (lowest evaluator score among
    /// its feasible results), if any.
    pub best: Option<CandidateAssignment>,
    /// Evaluation of `best`.
    pub report: Option<EvaluationReport>,
    /// Minimal group of the strategy's own ranking: every optimum for
    /// enumeration, the lowest-energy samples for a sampler.
    pub optima: Option<DegenerateGroup>,
    pub lp_status: Option<LpStatus>,
    /// Energy of the sampler's lowest sample.
    pub lowest_energy: Option<f64>,
}

impl StrategyOutcome {
    pub(super) fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            best: None,
            report: None,
            optima: None,
            lp_status: None,
            lowest_energy: None,
        }
    }

    /// Score of `best` when it is feasible.
    pub fn feasible_score(&self) -> Option<f64> {
        self.report.as_ref().filter(|r| r.feasible).map(|r| r.score)
    }
}

/// Side-by-side result of all strategies run on one instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonReport {
    pub outcomes: Vec<StrategyOutcome>,
    /// Lowest feasible score over all strategies.
    pub best_score: Option<f64>,
    /// Every strategy with a feasible result reached `best_score`.
    pub agree: bool,
    /// Every strategy produced a feasible result.
    pub all_feasible: bool,
}

impl ComparisonReport {
    pub fn outcome(&self, strategy: &StrategyKind) -> Option<&StrategyOutcome> {
        self.outcomes.iter().find(|o| &o.strategy == strategy)
    }
}
