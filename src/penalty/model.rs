//! The frozen quadratic model produced by penalty encoding.

use super::compiled::CompiledQubo;
use super::config::SlackEncoding;
use super::slack::spell;
use crate::instance::{CandidateAssignment, DecisionVar, Hardness};
use std::collections::BTreeMap;

/// An auxiliary slack bit owned by the quadratic model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlackVar {
    /// Index of the constraint in the instance's constraint list.
    pub constraint: usize,
    /// Bit position within that constraint's slack register.
    pub bit: usize,
}

/// A binary variable of the quadratic model.
///
/// Decision variables order before slack bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuboVar {
    Decision(DecisionVar),
    Slack(SlackVar),
}

impl QuboVar {
    pub fn is_slack(&self) -> bool {
        matches!(self, QuboVar::Slack(_))
    }

    pub fn as_decision(&self) -> Option<DecisionVar> {
        match self {
            QuboVar::Decision(v) => Some(*v),
            QuboVar::Slack(_) => None,
        }
    }
}

impl std::fmt::Display for QuboVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuboVar::Decision(v) => write!(f, "{v}"),
            QuboVar::Slack(s) => write!(f, "s[{},{}]", s.constraint, s.bit),
        }
    }
}

/// Values of model variables; variables not present are 0.
pub type QuboSample = BTreeMap<QuboVar, bool>;

/// How one constraint was turned into a penalty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncodingRule {
    /// `(Σ a_k x_k - target)^2`.
    Equality,
    /// `(Σ a_k x_k + slack - target)^2` with `slack ∈ [0, range]`.
    Inequality { range: u64, slack: SlackEncoding },
    /// Every assignment satisfies the constraint; no penalty term.
    Trivial,
}

/// Record of one constraint's penalty term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintEncoding {
    /// Index of the constraint in the instance.
    pub index: usize,
    pub label: String,
    pub hardness: Hardness,
    pub rule: EncodingRule,
    /// Applied penalty coefficient (0 for trivial constraints).
    pub lambda: f64,
    /// λ above which infeasible energies provably exceed feasible ones;
    /// `None` when no bound applies (soft or non-integral constraints).
    pub safe_lambda: Option<f64>,
    /// Terms of the squared row, slack bits included, with their weights.
    pub terms: Vec<(QuboVar, f64)>,
    /// Right-hand side of the squared row.
    pub target: f64,
}

impl ConstraintEncoding {
    /// Unweighted penalty `(Σ a_k v_k - target)^2` for `sample`.
    pub fn raw_penalty(&self, sample: &QuboSample) -> f64 {
        if self.rule == EncodingRule::Trivial {
            return 0.0;
        }
        let residual: f64 = self
            .terms
            .iter()
            .filter(|(v, _)| value_of(sample, *v))
            .map(|(_, a)| a)
            .sum::<f64>()
            - self.target;
        residual * residual
    }

    /// Slack bits of this constraint, in bit order.
    pub fn slack_bits(&self) -> impl Iterator<Item = (SlackVar, f64)> + '_ {
        self.terms.iter().filter_map(|(v, a)| match v {
            QuboVar::Slack(s) => Some((*s, *a)),
            QuboVar::Decision(_) => None,
        })
    }

    /// Whether `λ` reaches the safe bound; `None` when no bound applies.
    pub fn is_lambda_safe(&self) -> Option<bool> {
        self.safe_lambda.map(|bound| self.lambda >= bound)
    }
}

/// One line of [`QuboModel::penalty_breakdown`].
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyTerm {
    pub index: usize,
    pub label: String,
    /// Squared residual.
    pub raw: f64,
    /// `lambda * raw`.
    pub weighted: f64,
}

/// Quadratic unconstrained binary objective
/// `H(x) = offset + Σ_v linear[v] x_v + Σ_{u<v} quadratic[(u, v)] x_u x_v`.
///
/// Built by [`PenaltyModelBuilder`](super::PenaltyModelBuilder) and
/// immutable afterwards; safe to share with concurrent samplers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuboModel {
    pub(super) variables: Vec<QuboVar>,
    pub(super) linear: BTreeMap<QuboVar, f64>,
    pub(super) quadratic: BTreeMap<(QuboVar, QuboVar), f64>,
    pub(super) offset: f64,
    pub(super) objective: BTreeMap<DecisionVar, f64>,
    pub(super) encodings: Vec<ConstraintEncoding>,
    pub(super) slack: Vec<SlackVar>,
}

impl QuboModel {
    /// Every variable, decision variables first, in key order.
    pub fn variables(&self) -> &[QuboVar] {
        &self.variables
    }

    /// Linear coefficient of every variable (self-pairs folded in).
    pub fn linear(&self) -> &BTreeMap<QuboVar, f64> {
        &self.linear
    }

    /// Coefficients of unordered distinct pairs, keyed `(smaller, larger)`.
    pub fn quadratic(&self) -> &BTreeMap<(QuboVar, QuboVar), f64> {
        &self.quadratic
    }

    /// Constant term; makes the penalty part vanish exactly when satisfied.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Slack bits created by the encoding.
    pub fn slack_variables(&self) -> &[SlackVar] {
        &self.slack
    }

    /// Objective coefficient of each decision variable (minimization form).
    pub fn objective(&self) -> &BTreeMap<DecisionVar, f64> {
        &self.objective
    }

    /// Per-constraint encoding records, in constraint order.
    pub fn encodings(&self) -> &[ConstraintEncoding] {
        &self.encodings
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_interactions(&self) -> usize {
        self.quadratic.len()
    }

    /// Coefficient of a pair in either order.
    pub fn interaction(&self, u: QuboVar, v: QuboVar) -> f64 {
        let key = if u <= v { (u, v) } else { (v, u) };
        self.quadratic.get(&key).copied().unwrap_or(0.0)
    }

    /// `H(sample)`.
    pub fn energy(&self, sample: &QuboSample) -> f64 {
        let linear: f64 = self
            .linear
            .iter()
            .filter(|(v, _)| value_of(sample, **v))
            .map(|(_, a)| a)
            .sum();
        let quadratic: f64 = self
            .quadratic
            .iter()
            .filter(|((u, v), _)| value_of(sample, *u) && value_of(sample, *v))
            .map(|(_, b)| b)
            .sum();
        self.offset + linear + quadratic
    }

    /// Objective part of the energy (no penalties).
    pub fn objective_value(&self, sample: &QuboSample) -> f64 {
        self.objective
            .iter()
            .filter(|(v, _)| value_of(sample, QuboVar::Decision(**v)))
            .map(|(_, c)| c)
            .sum()
    }

    /// Weighted penalty of every non-trivial constraint for `sample`.
    pub fn penalty_breakdown(&self, sample: &QuboSample) -> Vec<PenaltyTerm> {
        self.encodings
            .iter()
            .filter(|e| e.rule != EncodingRule::Trivial)
            .map(|e| {
                let raw = e.raw_penalty(sample);
                PenaltyTerm {
                    index: e.index,
                    label: e.label.clone(),
                    raw,
                    weighted: e.lambda * raw,
                }
            })
            .collect()
    }

    /// Unweighted penalty of the constraint at `index` for `sample`; `None`
    /// if the instance has no such constraint.
    pub fn constraint_penalty(&self, index: usize, sample: &QuboSample) -> Option<f64> {
        self.encodings.get(index).map(|e| e.raw_penalty(sample))
    }

    /// Total weighted penalty of hard constraints for `sample`.
    pub fn hard_penalty(&self, sample: &QuboSample) -> f64 {
        self.encodings
            .iter()
            .filter(|e| e.hardness == Hardness::Hard)
            .map(|e| e.lambda * e.raw_penalty(sample))
            .sum()
    }

    /// Indexed adjacency form for samplers.
    pub fn compile(&self) -> CompiledQubo {
        CompiledQubo::new(self)
    }

    /// Drops slack bits and keeps the decision variables set to 1.
    pub fn strip_slack(&self, sample: &QuboSample) -> CandidateAssignment {
        sample
            .iter()
            .filter(|(_, &on)| on)
            .filter_map(|(v, _)| v.as_decision())
            .collect()
    }

    /// Sample for `candidate` with every slack register set to minimize its
    /// constraint's residual.
    ///
    /// The penalty of a satisfied inequality is zero under this completion.
    pub fn best_slack_completion(&self, candidate: &CandidateAssignment) -> QuboSample {
        let mut sample: QuboSample = self
            .variables
            .iter()
            .filter_map(|v| v.as_decision().map(|d| (*v, candidate.is_set(d))))
            .collect();
        for enc in &self.encodings {
            let EncodingRule::Inequality { slack, .. } = enc.rule else {
                continue;
            };
            let activity: f64 = enc
                .terms
                .iter()
                .filter_map(|(v, a)| v.as_decision().map(|d| (d, a)))
                .filter(|(d, _)| candidate.is_set(*d))
                .map(|(_, a)| a)
                .sum();
            let wanted = (enc.target - activity).round().max(0.0) as u64;
            let bits: Vec<(SlackVar, f64)> = enc.slack_bits().collect();
            let weights: Vec<u64> = bits.iter().map(|(_, w)| *w as u64).collect();
            for ((s, _), on) in bits.iter().zip(spell(wanted, &weights, slack)) {
                sample.insert(QuboVar::Slack(*s), on);
            }
        }
        sample
    }
}

fn value_of(sample: &QuboSample, var: QuboVar) -> bool {
    sample.get(&var).copied().unwrap_or(false)
}
