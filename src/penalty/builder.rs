//! Constraint-to-penalty encoding.

use super::config::{LambdaPolicy, PenaltyConfig};
use super::model::{ConstraintEncoding, EncodingRule, QuboModel, QuboVar, SlackVar};
use super::slack::{slack_bit_count, slack_weights};
use crate::error::{AssignError, Result};
use crate::instance::{
    ConstraintKind, ConstraintSpec, DecisionVar, Hardness, LinearForm, ProblemInstance,
    ACTIVITY_TOLERANCE,
};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Encodes a [`ProblemInstance`] as a [`QuboModel`]:
/// `H(x) = Objective(x) + Σ_c λ_c · Penalty_c(x)`.
///
/// Per constraint, after clipping `[lb, ub]` to the range its terms can
/// reach:
///
/// - interval covers the reachable range: no term ([`EncodingRule::Trivial`])
/// - `lb == ub`: `(Σ a_k x_k - lb)^2`
/// - otherwise: slack bits spelling `[0, ub - lb]` and
///   `(Σ a_k x_k + slack - ub)^2`
///
/// Incompatible pairs have no variable, so compatibility never costs a
/// penalty term.
///
/// # Examples
///
/// ```
/// use u_assign::instance::{Cardinality, InstanceBuilder, OccupancyPolicy};
/// use u_assign::penalty::{PenaltyConfig, PenaltyModelBuilder};
///
/// let instance = InstanceBuilder::new()
///     .costs(vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0), None]])
///     .object_cardinality(Cardinality::AtMostOne)
///     .occupancy(OccupancyPolicy::ExactlyOne)
///     .build()
///     .unwrap();
///
/// let model = PenaltyModelBuilder::new(&instance, PenaltyConfig::default())
///     .build()
///     .unwrap();
/// // object 0 gets one slack bit for its at-most-one constraint
/// assert_eq!(model.slack_variables().len(), 1);
/// assert_eq!(model.num_variables(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct PenaltyModelBuilder<'a> {
    instance: &'a ProblemInstance,
    config: PenaltyConfig,
}

impl<'a> PenaltyModelBuilder<'a> {
    pub fn new(instance: &'a ProblemInstance, config: PenaltyConfig) -> Self {
        Self { instance, config }
    }

    /// Runs one encoding pass and freezes the result.
    pub fn build(&self) -> Result<QuboModel> {
        self.config.validate()?;

        let mut acc = Accumulator::default();
        let mut objective = BTreeMap::new();
        for &var in self.instance.variables() {
            let coef = self.instance.objective_coefficient(var);
            acc.add_linear(QuboVar::Decision(var), coef);
            objective.insert(var, coef);
        }
        let span: f64 = objective.values().map(|c| c.abs()).sum();
        let safe_lambda = span + 1.0;

        let mut encodings = Vec::with_capacity(self.instance.constraints().len());
        let mut slack = Vec::new();
        for (index, spec) in self.instance.constraints().iter().enumerate() {
            let form = self.instance.linear_form(spec);
            let plan = plan_constraint(index, spec, &form, &self.config)?;
            let encoding = match plan {
                Plan::Trivial => ConstraintEncoding {
                    index,
                    label: spec.label.clone(),
                    hardness: spec.hardness,
                    rule: EncodingRule::Trivial,
                    lambda: 0.0,
                    safe_lambda: None,
                    terms: Vec::new(),
                    target: 0.0,
                },
                Plan::Squared {
                    rule,
                    terms,
                    target,
                    integral,
                } => {
                    let lambda = self.lambda_for(spec, safe_lambda);
                    let bound = (spec.hardness == Hardness::Hard && integral).then_some(safe_lambda);
                    if bound.is_some_and(|b| lambda < b) {
                        warn!(
                            "lambda {lambda} for `{}` is below the safe bound {safe_lambda}; \
                             infeasible assignments may reach lower energy than feasible ones",
                            spec.label
                        );
                    }
                    slack.extend(terms.iter().filter_map(|(v, _)| match v {
                        QuboVar::Slack(s) => Some(*s),
                        QuboVar::Decision(_) => None,
                    }));
                    acc.add_squared(lambda, &terms, target);
                    ConstraintEncoding {
                        index,
                        label: spec.label.clone(),
                        hardness: spec.hardness,
                        rule,
                        lambda,
                        safe_lambda: bound,
                        terms,
                        target,
                    }
                }
            };
            encodings.push(encoding);
        }

        let model = acc.freeze(objective, encodings, slack);
        info!(
            "penalty model: {} variables ({} slack), {} interactions, objective span {}",
            model.num_variables(),
            model.slack_variables().len(),
            model.num_interactions(),
            span
        );
        Ok(model)
    }

    fn lambda_for(&self, spec: &ConstraintSpec, safe_lambda: f64) -> f64 {
        if let Some(&v) = self.config.overrides.get(&spec.label) {
            return v;
        }
        if spec.hardness == Hardness::Soft {
            return self.config.soft_lambda;
        }
        match self.config.lambda {
            LambdaPolicy::Fixed(v) => v,
            LambdaPolicy::PerKind {
                cardinality,
                occupancy,
                budget,
            } => match spec.kind {
                ConstraintKind::AssignmentCardinality { .. } => cardinality,
                ConstraintKind::OccupancyBound { .. } => occupancy,
                ConstraintKind::LinearBudget { .. } => budget,
            },
            LambdaPolicy::Derived { safety_factor } => safety_factor * safe_lambda,
        }
    }
}

/// What a single constraint turns into.
enum Plan {
    Trivial,
    Squared {
        rule: EncodingRule,
        terms: Vec<(QuboVar, f64)>,
        target: f64,
        integral: bool,
    },
}

fn plan_constraint(
    index: usize,
    spec: &ConstraintSpec,
    form: &LinearForm,
    config: &PenaltyConfig,
) -> Result<Plan> {
    let label = spec.label.as_str();
    if form.lb.is_nan() || form.ub.is_nan() {
        return Err(AssignError::unbounded(label, "bound is NaN"));
    }
    if form.lb > form.ub {
        return Err(AssignError::unbounded(
            label,
            format!("inverted interval [{}, {}]", form.lb, form.ub),
        ));
    }

    if form.terms.is_empty() {
        if form.violation(0.0) == 0.0 {
            debug!("`{label}` has no terms and is satisfied by the empty sum");
            return Ok(Plan::Trivial);
        }
        if matches!(spec.kind, ConstraintKind::LinearBudget { .. }) {
            return Err(AssignError::unbounded(
                label,
                format!(
                    "budget references no compatible pair but requires [{}, {}]",
                    form.lb, form.ub
                ),
            ));
        }
        return unreachable_interval(spec, form, (0.0, 0.0));
    }

    let (lo, hi) = form.achievable_range();
    let integral = form.terms.iter().all(|(_, a)| a.fract() == 0.0);
    let (mut lb, mut ub) = (form.lb.max(lo), form.ub.min(hi));
    if integral {
        lb = (lb - ACTIVITY_TOLERANCE).ceil();
        ub = (ub + ACTIVITY_TOLERANCE).floor();
    }
    if lb > ub + ACTIVITY_TOLERANCE {
        return unreachable_interval(spec, form, (lo, hi));
    }
    if lb <= lo + ACTIVITY_TOLERANCE && ub >= hi - ACTIVITY_TOLERANCE {
        debug!("`{label}` holds for every assignment of its {} terms", form.terms.len());
        return Ok(Plan::Trivial);
    }

    let mut terms: Vec<(QuboVar, f64)> = form
        .terms
        .iter()
        .map(|&(v, a)| (QuboVar::Decision(v), a))
        .collect();

    if (ub - lb).abs() <= ACTIVITY_TOLERANCE {
        debug!("`{label}`: equality with target {lb}");
        return Ok(Plan::Squared {
            rule: EncodingRule::Equality,
            terms,
            target: lb,
            integral,
        });
    }

    if !integral {
        return Err(AssignError::unbounded(
            label,
            "inequality with non-integral coefficients cannot be closed by integer slack",
        ));
    }
    let range = (ub - lb) as u64;
    let bits = slack_bit_count(range, config.slack);
    if bits > config.max_slack_bits as u64 {
        return Err(AssignError::unbounded(
            label,
            format!(
                "slack range {range} needs {bits} bits, limit is {}",
                config.max_slack_bits
            ),
        ));
    }
    let weights = slack_weights(range, config.slack);
    debug!(
        "`{label}`: inequality [{lb}, {ub}] with {} slack bits {:?}",
        weights.len(),
        weights
    );
    terms.extend(weights.iter().enumerate().map(|(bit, &w)| {
        (
            QuboVar::Slack(SlackVar {
                constraint: index,
                bit,
            }),
            w as f64,
        )
    }));
    Ok(Plan::Squared {
        rule: EncodingRule::Inequality {
            range,
            slack: config.slack,
        },
        terms,
        target: ub,
        integral,
    })
}

/// A constraint no assignment can meet.
fn unreachable_interval(spec: &ConstraintSpec, form: &LinearForm, reach: (f64, f64)) -> Result<Plan> {
    if spec.hardness == Hardness::Soft {
        warn!(
            "soft constraint `{}` can never be met; it contributes a constant and is skipped",
            spec.label
        );
        return Ok(Plan::Trivial);
    }
    Err(AssignError::infeasible(format!(
        "constraint `{}` ({}) needs [{}, {}] but only [{}, {}] is reachable over {} compatible pairs",
        spec.label,
        spec.kind_name(),
        form.lb,
        form.ub,
        reach.0,
        reach.1,
        form.terms.len()
    )))
}

/// Mutable coefficient accumulator scoped to one encoding pass.
#[derive(Debug, Default)]
struct Accumulator {
    linear: BTreeMap<QuboVar, f64>,
    quadratic: BTreeMap<(QuboVar, QuboVar), f64>,
    offset: f64,
}

impl Accumulator {
    fn add_linear(&mut self, v: QuboVar, coef: f64) {
        *self.linear.entry(v).or_insert(0.0) += coef;
    }

    fn add_quadratic(&mut self, u: QuboVar, v: QuboVar, coef: f64) {
        debug_assert!(u != v, "self-pairs fold into the linear term");
        let key = if u < v { (u, v) } else { (v, u) };
        *self.quadratic.entry(key).or_insert(0.0) += coef;
    }

    /// Adds `lambda * (Σ a_k v_k - target)^2`, using `v^2 = v`.
    fn add_squared(&mut self, lambda: f64, terms: &[(QuboVar, f64)], target: f64) {
        for (k, &(v, a)) in terms.iter().enumerate() {
            self.add_linear(v, lambda * (a * a - 2.0 * target * a));
            for &(u, b) in &terms[k + 1..] {
                self.add_quadratic(v, u, 2.0 * lambda * a * b);
            }
        }
        self.offset += lambda * target * target;
    }

    fn freeze(
        mut self,
        objective: BTreeMap<DecisionVar, f64>,
        encodings: Vec<ConstraintEncoding>,
        slack: Vec<SlackVar>,
    ) -> QuboModel {
        self.quadratic.retain(|_, b| *b != 0.0);
        QuboModel {
            variables: self.linear.keys().copied().collect(),
            linear: self.linear,
            quadratic: self.quadratic,
            offset: self.offset,
            objective,
            encodings,
            slack,
        }
    }
}
