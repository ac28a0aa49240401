//! Candidate validation, scoring, and ranking.

use super::report::{EvaluationReport, Violation, ViolationSource};
use crate::instance::{CandidateAssignment, LinearForm, ProblemInstance, Sense};
use std::cmp::Ordering;

/// Validates and scores candidates against one instance.
///
/// The evaluator treats every candidate the same way regardless of where
/// it came from. Linear forms are derived once per evaluator; reports are
/// computed fresh on every call.
///
/// # Examples
///
/// ```
/// use u_assign::evaluate::SolutionEvaluator;
/// use u_assign::instance::{CandidateAssignment, Cardinality, InstanceBuilder, OccupancyPolicy};
///
/// let instance = InstanceBuilder::new()
///     .costs(vec![vec![Some(3.0), Some(4.0)], vec![Some(1.0), None]])
///     .object_cardinality(Cardinality::AtMostOne)
///     .occupancy(OccupancyPolicy::ExactlyOne)
///     .build()
///     .unwrap();
/// let evaluator = SolutionEvaluator::new(&instance);
///
/// let report = evaluator.evaluate(&CandidateAssignment::from_choices(&[Some(1), Some(0)]));
/// assert!(report.feasible);
/// assert_eq!(report.total_cost, 5.0);
///
/// let report = evaluator.evaluate(&CandidateAssignment::from_choices(&[Some(1), None]));
/// assert!(!report.feasible);
/// assert_eq!(report.violated_labels(), vec!["box_0_occupancy"]);
/// ```
#[derive(Debug, Clone)]
pub struct SolutionEvaluator<'a> {
    instance: &'a ProblemInstance,
    forms: Vec<LinearForm>,
}

impl<'a> SolutionEvaluator<'a> {
    pub fn new(instance: &'a ProblemInstance) -> Self {
        let forms = instance
            .constraints()
            .iter()
            .map(|c| instance.linear_form(c))
            .collect();
        Self { instance, forms }
    }

    pub fn instance(&self) -> &'a ProblemInstance {
        self.instance
    }

    /// Produces the full report for `candidate`. Never fails.
    pub fn evaluate(&self, candidate: &CandidateAssignment) -> EvaluationReport {
        let mut violations = Vec::new();
        let mut soft_violations = Vec::new();

        for var in candidate.iter() {
            if !self.instance.compatible(var.object, var.box_idx) {
                violations.push(Violation {
                    source: ViolationSource::IncompatiblePair(var),
                    activity: 1.0,
                    magnitude: 1.0,
                });
            }
        }

        for (index, (spec, form)) in self.instance.constraints().iter().zip(&self.forms).enumerate() {
            let activity = form.activity(|v| candidate.is_set(v));
            let magnitude = form.violation(activity);
            if magnitude > 0.0 {
                let violation = Violation {
                    source: ViolationSource::Constraint {
                        index,
                        label: spec.label.clone(),
                    },
                    activity,
                    magnitude,
                };
                if spec.is_hard() {
                    violations.push(violation);
                } else {
                    soft_violations.push(violation);
                }
            }
        }

        let (total_cost, total_profit) = candidate
            .iter()
            .filter(|v| self.instance.compatible(v.object, v.box_idx))
            .fold((0.0, 0.0), |(c, p), v| {
                (
                    c + self.instance.cost(v.object, v.box_idx).unwrap_or(0.0),
                    p + self.instance.profit(v.object, v.box_idx).unwrap_or(0.0),
                )
            });
        let (objective, score) = match self.instance.sense() {
            Sense::MinimizeCost => (total_cost, total_cost),
            Sense::MaximizeProfit => (total_profit, -total_profit),
        };

        EvaluationReport {
            feasible: violations.is_empty(),
            violations,
            soft_violations,
            total_cost,
            total_profit,
            objective,
            score,
        }
    }

    /// Short-circuiting hard feasibility check, equivalent to
    /// `evaluate(candidate).feasible`.
    pub fn is_feasible(&self, candidate: &CandidateAssignment) -> bool {
        candidate
            .iter()
            .all(|v| self.instance.compatible(v.object, v.box_idx))
            && self
                .instance
                .constraints()
                .iter()
                .zip(&self.forms)
                .filter(|(spec, _)| spec.is_hard())
                .all(|(_, form)| form.violation(form.activity(|v| candidate.is_set(v))) == 0.0)
    }

    /// Evaluates and orders candidates: feasible first, then by score, then
    /// by total violation.
    pub fn rank(
        &self,
        candidates: impl IntoIterator<Item = CandidateAssignment>,
    ) -> Vec<(CandidateAssignment, EvaluationReport)> {
        let mut ranked: Vec<_> = candidates
            .into_iter()
            .map(|c| {
                let report = self.evaluate(&c);
                (c, report)
            })
            .collect();
        ranked.sort_by(|(_, a), (_, b)| compare_reports(a, b));
        ranked
    }
}

fn compare_reports(a: &EvaluationReport, b: &EvaluationReport) -> Ordering {
    b.feasible
        .cmp(&a.feasible)
        .then_with(|| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal))
        .then_with(|| {
            a.total_violation()
                .partial_cmp(&b.total_violation())
                .unwrap_or(Ordering::Equal)
        })
}
