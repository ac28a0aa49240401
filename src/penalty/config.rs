//! Penalty encoding configuration.

use crate::error::{AssignError, Result};
use std::collections::BTreeMap;

/// How penalty coefficients (λ) are chosen for hard constraints.
///
/// Larger λ excludes infeasible assignments more strongly but steepens the
/// energy landscape, which slows heuristic samplers down. The built model
/// records the applied λ next to the derived safe bound for every
/// constraint so the trade-off stays visible.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LambdaPolicy {
    /// Same λ for every hard constraint.
    Fixed(f64),

    /// λ per constraint kind.
    PerKind {
        cardinality: f64,
        occupancy: f64,
        budget: f64,
    },

    /// `safety_factor * (objective span + 1)`, where the span is the sum of
    /// absolute objective coefficients. With integral constraint data any
    /// factor `>= 1` makes every feasible energy lower than every
    /// infeasible one.
    Derived { safety_factor: f64 },
}

impl Default for LambdaPolicy {
    fn default() -> Self {
        LambdaPolicy::Derived { safety_factor: 1.0 }
    }
}

/// How an integer slack range `[0, r]` is spelled in binary variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlackEncoding {
    /// Weights `1, 2, 4, ...` with the last weight truncated so the
    /// weights sum to exactly `r`; `floor(log2 r) + 1` bits.
    #[default]
    Binary,
    /// `r` bits of weight 1.
    Unary,
}

/// Configuration for [`PenaltyModelBuilder`](super::PenaltyModelBuilder).
///
/// # Examples
///
/// ```
/// use u_assign::penalty::{LambdaPolicy, PenaltyConfig, SlackEncoding};
///
/// let config = PenaltyConfig::default()
///     .with_lambda(LambdaPolicy::Fixed(600.0))
///     .with_override("total_cost", 900.0)
///     .with_slack_encoding(SlackEncoding::Binary);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PenaltyConfig {
    /// λ for hard constraints.
    pub lambda: LambdaPolicy,

    /// λ by constraint label; wins over `lambda` and `soft_lambda`.
    pub overrides: BTreeMap<String, f64>,

    /// λ for soft constraints.
    pub soft_lambda: f64,

    /// Slack spelling for inequalities.
    pub slack: SlackEncoding,

    /// Refuse to allocate more slack bits than this for one constraint.
    pub max_slack_bits: usize,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            lambda: LambdaPolicy::default(),
            overrides: BTreeMap::new(),
            soft_lambda: 1.0,
            slack: SlackEncoding::default(),
            max_slack_bits: 64,
        }
    }
}

impl PenaltyConfig {
    pub fn with_lambda(mut self, lambda: LambdaPolicy) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_override(mut self, label: impl Into<String>, lambda: f64) -> Self {
        self.overrides.insert(label.into(), lambda);
        self
    }

    pub fn with_soft_lambda(mut self, lambda: f64) -> Self {
        self.soft_lambda = lambda;
        self
    }

    pub fn with_slack_encoding(mut self, slack: SlackEncoding) -> Self {
        self.slack = slack;
        self
    }

    pub fn with_max_slack_bits(mut self, n: usize) -> Self {
        self.max_slack_bits = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(AssignError::config(format!(
                    "{name} must be positive and finite, got {v}"
                )))
            }
        };
        match self.lambda {
            LambdaPolicy::Fixed(v) => positive("fixed lambda", v)?,
            LambdaPolicy::PerKind {
                cardinality,
                occupancy,
                budget,
            } => {
                positive("cardinality lambda", cardinality)?;
                positive("occupancy lambda", occupancy)?;
                positive("budget lambda", budget)?;
            }
            LambdaPolicy::Derived { safety_factor } => {
                if !(safety_factor.is_finite() && safety_factor >= 1.0) {
                    return Err(AssignError::config(format!(
                        "safety_factor must be at least 1, got {safety_factor}"
                    )));
                }
            }
        }
        positive("soft_lambda", self.soft_lambda)?;
        for (label, &v) in &self.overrides {
            positive(&format!("lambda override for `{label}`"), v)?;
        }
        if self.max_slack_bits == 0 {
            return Err(AssignError::config("max_slack_bits must be at least 1"));
        }
        Ok(())
    }
}
