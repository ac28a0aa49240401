//! Grouping of equally-valued candidates.
//!
//! Samplers and exact solvers can return several distinct assignments with
//! the same energy or objective. Instead of silently keeping the first,
//! callers group by value and inspect the whole minimal group.

use super::evaluator::SolutionEvaluator;
use crate::instance::CandidateAssignment;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Default tolerance for treating two values as equal.
pub const DEFAULT_VALUE_TOLERANCE: f64 = 1e-9;

/// A candidate with the value it was ranked by (energy or objective).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredCandidate {
    pub assignment: CandidateAssignment,
    pub value: f64,
}

impl ScoredCandidate {
    pub fn new(assignment: CandidateAssignment, value: f64) -> Self {
        Self { assignment, value }
    }
}

/// Distinct candidates sharing one value (within tolerance).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueGroup {
    /// Smallest value in the group.
    pub value: f64,
    /// Distinct assignments, in first-seen order.
    pub members: Vec<CandidateAssignment>,
}

/// The minimal-value group split by feasibility.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DegenerateGroup {
    pub value: f64,
    /// Every distinct feasible assignment in the group.
    pub feasible: Vec<CandidateAssignment>,
    /// Number of distinct infeasible assignments in the group.
    pub infeasible: usize,
}

impl DegenerateGroup {
    /// Whether more than one feasible optimum exists.
    pub fn is_degenerate(&self) -> bool {
        self.feasible.len() > 1
    }

    /// Re-scores the feasible members with the group value, so the group
    /// can be regrouped.
    pub fn to_scored(&self) -> Vec<ScoredCandidate> {
        self.feasible
            .iter()
            .map(|a| ScoredCandidate::new(a.clone(), self.value))
            .collect()
    }
}

/// Partitions candidates into ascending value groups.
///
/// Values are sorted and a new group starts whenever a value exceeds the
/// current group's first value by more than `tolerance`. Duplicate
/// assignments within a group are kept once.
pub fn group_by_value(candidates: &[ScoredCandidate], tolerance: f64) -> Vec<ValueGroup> {
    let mut order: Vec<&ScoredCandidate> = candidates.iter().collect();
    order.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal));

    let mut groups: Vec<ValueGroup> = Vec::new();
    let mut seen: BTreeSet<&CandidateAssignment> = BTreeSet::new();
    for cand in order {
        let starts_new = groups
            .last()
            .is_none_or(|g| cand.value - g.value > tolerance);
        if starts_new {
            seen.clear();
            groups.push(ValueGroup {
                value: cand.value,
                members: Vec::new(),
            });
        }
        if seen.insert(&cand.assignment) {
            if let Some(group) = groups.last_mut() {
                group.members.push(cand.assignment.clone());
            }
        }
    }
    groups
}

impl SolutionEvaluator<'_> {
    /// Returns every distinct feasible assignment in the minimal-value
    /// group of `candidates`, or `None` when `candidates` is empty.
    ///
    /// Regrouping [`DegenerateGroup::to_scored`] yields the same group.
    pub fn degenerate_optima(
        &self,
        candidates: &[ScoredCandidate],
        tolerance: f64,
    ) -> Option<DegenerateGroup> {
        let minimal = group_by_value(candidates, tolerance).into_iter().next()?;
        let (feasible, infeasible): (Vec<_>, Vec<_>) = minimal
            .members
            .into_iter()
            .partition(|a| self.is_feasible(a));
        Some(DegenerateGroup {
            value: minimal.value,
            feasible,
            infeasible: infeasible.len(),
        })
    }

    /// Best feasible group: groups only the feasible candidates, so an
    /// infeasible low-energy sample cannot hide the feasible optimum.
    pub fn feasible_optima(
        &self,
        candidates: &[ScoredCandidate],
        tolerance: f64,
    ) -> Option<DegenerateGroup> {
        let feasible: Vec<ScoredCandidate> = candidates
            .iter()
            .filter(|c| self.is_feasible(&c.assignment))
            .cloned()
            .collect();
        self.degenerate_optima(&feasible, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{fixtures, OccupancyPolicy};
    use proptest::prelude::*;

    fn cand(choices: &[Option<usize>], value: f64) -> ScoredCandidate {
        ScoredCandidate::new(CandidateAssignment::from_choices(choices), value)
    }

    #[test]
    fn test_group_by_value() {
        let cands = vec![
            cand(&[Some(0)], 3.0),
            cand(&[Some(1)], 1.0),
            cand(&[Some(2)], 1.0 + 1e-12),
            cand(&[Some(1)], 1.0),
            cand(&[None], 2.0),
        ];
        let groups = group_by_value(&cands, DEFAULT_VALUE_TOLERANCE);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].members.len(), 2, "duplicate must be dropped");
        assert_eq!(groups[0].value, 1.0);
        assert_eq!(groups[1].value, 2.0);
        assert_eq!(groups[2].members[0], CandidateAssignment::from_choices(&[Some(0)]));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_value(&[], 0.0).is_empty());
        let inst = fixtures::cost_instance(OccupancyPolicy::ExactlyOne);
        let eval = SolutionEvaluator::new(&inst);
        assert!(eval.degenerate_optima(&[], 0.0).is_none());
    }

    #[test]
    fn test_degenerate_optima_filters_infeasible() {
        let inst = fixtures::global_budget_instance();
        let eval = SolutionEvaluator::new(&inst);
        let cands = vec![
            cand(&[None, Some(0), None, Some(1), Some(2), None, None, None], -22.0),
            cand(&[None, Some(0), None, None, Some(1), Some(2), None, None], -22.0),
            cand(&[None, Some(0), None, Some(1), None, Some(2), None, None], -22.0),
            cand(&[None; 8], -22.0),
            cand(&[None, None, Some(0), Some(1), Some(2), None, None, None], -20.0),
        ];
        let group = eval
            .degenerate_optima(&cands, DEFAULT_VALUE_TOLERANCE)
            .expect("non-empty input");
        assert_eq!(group.value, -22.0);
        assert_eq!(group.feasible.len(), 3);
        assert_eq!(group.infeasible, 1);
        assert!(group.is_degenerate());
    }

    #[test]
    fn test_feasible_optima_skips_infeasible_low_energy() {
        let inst = fixtures::global_budget_instance();
        let eval = SolutionEvaluator::new(&inst);
        let cands = vec![
            cand(&[None; 8], -100.0),
            cand(&[None, None, Some(0), Some(1), Some(2), None, None, None], -20.0),
        ];
        let group = eval.feasible_optima(&cands, 1e-9).expect("one feasible");
        assert_eq!(group.value, -20.0);
        assert_eq!(group.feasible.len(), 1);
        assert!(!group.is_degenerate());
    }

    proptest! {
        #[test]
        fn prop_regrouping_is_idempotent(
            raw in proptest::collection::vec(
                (proptest::collection::vec(proptest::option::of(0usize..3), 8), -3i32..3),
                0..30,
            )
        ) {
            let inst = fixtures::cost_instance(OccupancyPolicy::AtLeastOne);
            let eval = SolutionEvaluator::new(&inst);
            let cands: Vec<ScoredCandidate> = raw
                .iter()
                .map(|(choices, v)| cand(choices, f64::from(*v)))
                .collect();
            if let Some(group) = eval.degenerate_optima(&cands, DEFAULT_VALUE_TOLERANCE) {
                let again = eval
                    .degenerate_optima(&group.to_scored(), DEFAULT_VALUE_TOLERANCE);
                if group.feasible.is_empty() {
                    prop_assert!(again.is_none());
                } else {
                    let again = again.unwrap();
                    prop_assert_eq!(&again.feasible, &group.feasible);
                    prop_assert_eq!(again.value, group.value);
                    prop_assert_eq!(again.infeasible, 0);
                }
            }
        }
    }
}
