//! Exhaustive search over the assignment space.

use super::config::EnumeratorConfig;
use crate::error::{AssignError, Result};
use crate::evaluate::{DegenerateGroup, ScoredCandidate, SolutionEvaluator, DEFAULT_VALUE_TOLERANCE};
use crate::instance::{
    CandidateAssignment, Cardinality, ConstraintKind, DecisionVar, ProblemInstance,
};
use log::{debug, info};
use std::ops::Range;

/// Ground-truth solver that walks every candidate assignment.
///
/// Each object picks one option from a per-object list:
///
/// - hard `ExactlyOne` cardinality: one of its compatible boxes
/// - hard `AtMostOne` cardinality: unassigned, or one compatible box
/// - otherwise: any subset of its compatible boxes
///
/// Candidates are indexed in mixed radix with object 0 as the most
/// significant digit, so index order is lexicographic over the options of
/// each object. Options list "unassigned" (the empty set) first, then boxes
/// in ascending order. This is enumeration order, not best-first order.
///
/// Every assignment satisfying the hard cardinality constraints is in the
/// space, so filtering it with [`SolutionEvaluator::is_feasible`] yields
/// exactly the feasible set.
///
/// Only meant for small instances; [`ExactEnumerator::new`] refuses spaces
/// larger than [`EnumeratorConfig::max_candidates`].
#[derive(Debug, Clone)]
pub struct ExactEnumerator<'a> {
    evaluator: SolutionEvaluator<'a>,
    /// Choices of each object; box sets are decoded from a digit on demand.
    options: Vec<ObjectOptions>,
    total: u128,
    config: EnumeratorConfig,
}

impl<'a> ExactEnumerator<'a> {
    pub fn new(instance: &'a ProblemInstance, config: EnumeratorConfig) -> Result<Self> {
        config.validate()?;

        let options: Vec<ObjectOptions> = (0..instance.num_objects())
            .map(|i| ObjectOptions {
                mode: object_mode(instance, i),
                boxes: instance.compatible_boxes(i).collect(),
            })
            .collect();

        let mut total: u128 = 1;
        for opts in &options {
            total = match opts.radix().and_then(|r| total.checked_mul(r)) {
                Some(t) => t,
                None => {
                    return Err(AssignError::EnumerationTooLarge {
                        candidates: u128::MAX,
                        limit: config.max_candidates,
                    })
                }
            };
        }
        if total > config.max_candidates {
            return Err(AssignError::EnumerationTooLarge {
                candidates: total,
                limit: config.max_candidates,
            });
        }

        debug!(
            "enumerator over {} objects: {} candidates",
            instance.num_objects(),
            total
        );

        Ok(Self {
            evaluator: SolutionEvaluator::new(instance),
            options,
            total,
            config,
        })
    }

    pub fn instance(&self) -> &'a ProblemInstance {
        self.evaluator.instance()
    }

    /// Size of the candidate space (feasible or not).
    pub fn candidate_count(&self) -> u128 {
        self.total
    }

    /// Decodes candidate number `index` (`< candidate_count()`).
    pub fn candidate(&self, index: u128) -> CandidateAssignment {
        debug_assert!(index < self.total);
        let mut digits = vec![0u128; self.options.len()];
        let mut rest = index;
        for (i, opts) in self.options.iter().enumerate().rev() {
            // total > 0 here, so no radix is zero
            let radix = opts.radix().unwrap_or(1).max(1);
            digits[i] = rest % radix;
            rest /= radix;
        }
        let mut candidate = CandidateAssignment::new();
        for (i, (opts, &digit)) in self.options.iter().zip(&digits).enumerate() {
            for b in opts.boxes_for(digit) {
                candidate.insert(DecisionVar::new(i, b));
            }
        }
        candidate
    }

    /// Every candidate in index order, feasible or not.
    pub fn candidates(&self) -> impl Iterator<Item = CandidateAssignment> + '_ {
        (0..self.total).map(move |k| self.candidate(k))
    }

    /// Lazily yields feasible assignments in index order. Restartable: each
    /// call starts a fresh walk.
    ///
    /// An infeasible instance simply yields nothing here. Use
    /// [`require_feasible`](Self::require_feasible) or
    /// [`optimal`](Self::optimal) to get an `InfeasibleInstance` error that
    /// names the unreachable constraint.
    pub fn feasible(&self) -> FeasibleAssignments<'_, 'a> {
        self.shard(0..self.total)
    }

    /// Feasible assignments whose index lies in `range` (clamped to the
    /// space). Shards only read shared state and can run independently.
    pub fn shard(&self, range: Range<u128>) -> FeasibleAssignments<'_, 'a> {
        FeasibleAssignments {
            enumerator: self,
            next: range.start.min(self.total),
            end: range.end.min(self.total),
        }
    }

    /// Splits the index space into `config.shards` contiguous ranges.
    pub fn shard_ranges(&self) -> Vec<Range<u128>> {
        let shards = (self.config.shards as u128).min(self.total.max(1));
        let step = self.total.div_ceil(shards);
        (0..shards)
            .map(|s| (s * step).min(self.total)..((s + 1) * step).min(self.total))
            .filter(|r| !r.is_empty())
            .collect()
    }

    /// Feasible assignments computed shard by shard on the rayon pool,
    /// concatenated in shard order (same order as [`feasible`](Self::feasible)).
    #[cfg(feature = "parallel")]
    pub fn feasible_parallel(&self) -> Vec<CandidateAssignment> {
        use rayon::prelude::*;

        self.shard_ranges()
            .into_par_iter()
            .map(|r| self.shard(r).collect::<Vec<_>>())
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// All feasible assignments, or `InfeasibleInstance` when there are
    /// none. A structural check runs first so that obviously impossible
    /// constraints are named in the error.
    pub fn require_feasible(&self) -> Result<Vec<CandidateAssignment>> {
        self.instance().check_structural_feasibility()?;
        let found: Vec<_> = self.feasible().collect();
        info!(
            "enumerated {} candidates, {} feasible",
            self.total,
            found.len()
        );
        if found.is_empty() {
            return Err(AssignError::infeasible(format!(
                "none of the {} candidate assignments satisfies every hard constraint",
                self.total
            )));
        }
        Ok(found)
    }

    /// Every feasible assignment achieving the best objective.
    pub fn optimal(&self) -> Result<DegenerateGroup> {
        let scored: Vec<ScoredCandidate> = self
            .require_feasible()?
            .into_iter()
            .map(|c| {
                let score = self.evaluator.evaluate(&c).score;
                ScoredCandidate::new(c, score)
            })
            .collect();
        self.evaluator
            .degenerate_optima(&scored, DEFAULT_VALUE_TOLERANCE)
            .ok_or_else(|| AssignError::infeasible("no feasible assignment"))
    }
}

/// Lazy iterator over the feasible assignments of an index range.
#[derive(Debug, Clone)]
pub struct FeasibleAssignments<'e, 'a> {
    enumerator: &'e ExactEnumerator<'a>,
    next: u128,
    end: u128,
}

impl Iterator for FeasibleAssignments<'_, '_> {
    type Item = CandidateAssignment;

    fn next(&mut self) -> Option<CandidateAssignment> {
        while self.next < self.end {
            let candidate = self.enumerator.candidate(self.next);
            self.next += 1;
            if self.enumerator.evaluator.is_feasible(&candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectMode {
    Exactly,
    AtMost,
    Free,
}

fn object_mode(instance: &ProblemInstance, object: usize) -> ObjectMode {
    let mut mode = ObjectMode::Free;
    for spec in instance.constraints().iter().filter(|c| c.is_hard()) {
        if let ConstraintKind::AssignmentCardinality {
            object: o,
            cardinality,
        } = spec.kind
        {
            if o == object {
                match cardinality {
                    Cardinality::ExactlyOne => return ObjectMode::Exactly,
                    Cardinality::AtMostOne => mode = ObjectMode::AtMost,
                }
            }
        }
    }
    mode
}

/// What one object may take, in enumeration order.
#[derive(Debug, Clone)]
struct ObjectOptions {
    mode: ObjectMode,
    boxes: Vec<usize>,
}

impl ObjectOptions {
    /// Number of choices, `None` past `u128`.
    fn radix(&self) -> Option<u128> {
        let k = self.boxes.len();
        match self.mode {
            ObjectMode::Exactly => Some(k as u128),
            ObjectMode::AtMost => Some(k as u128 + 1),
            ObjectMode::Free => u32::try_from(k).ok().and_then(|k| 1u128.checked_shl(k)),
        }
    }

    /// Boxes of choice `digit`. `AtMost` lists "unassigned" first; `Free`
    /// reads the digit as a bitmask over `boxes`.
    fn boxes_for(&self, digit: u128) -> impl Iterator<Item = usize> + '_ {
        let (mask, single) = match self.mode {
            ObjectMode::Exactly => (0, Some(digit as usize)),
            ObjectMode::AtMost => (0, (digit as usize).checked_sub(1)),
            ObjectMode::Free => (digit, None),
        };
        self.boxes
            .iter()
            .enumerate()
            .filter(move |&(k, _)| single == Some(k) || (k < 128 && (mask >> k) & 1 == 1))
            .map(|(_, &b)| b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{fixtures, InstanceBuilder, OccupancyPolicy, Sense};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_candidate_count_and_order() {
        let inst = fixtures::cost_instance(OccupancyPolicy::ExactlyOne);
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        // 4^4 * 3^4 with the unassigned option
        assert_eq!(en.candidate_count(), 256 * 81);
        assert!(en.candidate(0).is_empty());
        let last = en.candidate(en.candidate_count() - 1);
        assert_eq!(last.len(), 8);
        assert!(last.is_set(DecisionVar::new(7, 1)));
        let second = en.candidate(1);
        assert_eq!(second.iter().collect::<Vec<_>>(), vec![DecisionVar::new(7, 0)]);
    }

    #[test]
    fn test_minimum_cost_scenario() {
        fixtures::init_logger();
        let inst = fixtures::cost_instance(OccupancyPolicy::ExactlyOne);
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        let best = en.optimal().unwrap();
        assert_eq!(best.value, 27.0);
        assert_eq!(best.feasible.len(), 1);
        assert_eq!(
            best.feasible[0],
            CandidateAssignment::from_choices(&[
                None,
                Some(2),
                Some(0),
                None,
                None,
                Some(1),
                None,
                None
            ])
        );
        assert_eq!(en.feasible().count(), 196);
    }

    #[test]
    fn test_budget_window_count() {
        let inst = fixtures::budget_window_instance();
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        assert_eq!(en.candidate_count(), 3u128.pow(4) * 2u128.pow(4));
        assert_eq!(en.require_feasible().unwrap().len(), 23);
        assert_eq!(en.optimal().unwrap().value, -81.0);
    }

    #[test]
    fn test_degenerate_profit_optimum() {
        let inst = fixtures::global_budget_instance();
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        assert_eq!(en.feasible().count(), 12);
        let best = en.optimal().unwrap();
        assert_eq!(best.value, -22.0);
        assert_eq!(best.feasible.len(), 3);
        assert!(best.is_degenerate());
    }

    #[test]
    fn test_restartable() {
        let inst = fixtures::global_budget_instance();
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        let first: Vec<_> = en.feasible().collect();
        let second: Vec<_> = en.feasible().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shards_cover_sequential_order() {
        let inst = fixtures::global_budget_instance();
        let en =
            ExactEnumerator::new(&inst, EnumeratorConfig::default().with_shards(5)).unwrap();
        let ranges = en.shard_ranges();
        assert_eq!(ranges.len(), 5);
        assert_eq!(ranges.first().unwrap().start, 0);
        assert_eq!(ranges.last().unwrap().end, en.candidate_count());
        let sharded: Vec<_> = ranges.into_iter().flat_map(|r| en.shard(r)).collect();
        assert_eq!(sharded, en.feasible().collect::<Vec<_>>());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let inst = fixtures::budget_window_instance();
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        assert_eq!(en.feasible_parallel(), en.feasible().collect::<Vec<_>>());
    }

    #[test]
    fn test_guard_against_blow_up() {
        let inst = fixtures::cost_instance(OccupancyPolicy::ExactlyOne);
        let err = ExactEnumerator::new(&inst, EnumeratorConfig::default().with_max_candidates(100))
            .unwrap_err();
        assert!(matches!(
            err,
            AssignError::EnumerationTooLarge {
                candidates: 20736,
                limit: 100
            }
        ));
    }

    #[test]
    fn test_empty_box_is_reported_infeasible() {
        let inst = InstanceBuilder::new()
            .costs(vec![
                vec![Some(1.0), None],
                vec![Some(2.0), None],
            ])
            .object_cardinality(Cardinality::AtMostOne)
            .occupancy(OccupancyPolicy::AtLeastOne)
            .build()
            .unwrap();
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        assert_eq!(en.feasible().count(), 0);
        let err = en.require_feasible().unwrap_err();
        assert!(matches!(err, AssignError::InfeasibleInstance(_)));
        assert!(err.to_string().contains("box_1_occupancy"));
    }

    #[test]
    fn test_search_proves_infeasibility() {
        // each box reachable, but two boxes need exactly one of a single object
        let inst = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0), Some(1.0)]])
            .object_cardinality(Cardinality::AtMostOne)
            .occupancy(OccupancyPolicy::ExactlyOne)
            .build()
            .unwrap();
        assert!(inst.check_structural_feasibility().is_ok());
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        let err = en.optimal().unwrap_err();
        assert!(matches!(err, AssignError::InfeasibleInstance(_)));
    }

    #[test]
    fn test_unconstrained_objects_enumerate_subsets() {
        let inst = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0), Some(2.0)], vec![None, Some(3.0)]])
            .occupancy(OccupancyPolicy::Range { lb: 0, ub: 2 })
            .build()
            .unwrap();
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        assert_eq!(en.candidate_count(), 8);
        assert_eq!(en.feasible().count(), 8);
    }

    #[test]
    fn test_wide_free_object_decodes_lazily() {
        let inst = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0); 64]])
            .build()
            .unwrap();
        let en =
            ExactEnumerator::new(&inst, EnumeratorConfig::default().with_max_candidates(u128::MAX))
                .unwrap();
        assert_eq!(en.candidate_count(), 1u128 << 64);
        assert!(en.candidate(0).is_empty());
        assert_eq!(
            en.candidate(5).iter().collect::<Vec<_>>(),
            vec![DecisionVar::new(0, 0), DecisionVar::new(0, 2)]
        );
        let last = en.candidate(en.candidate_count() - 1);
        assert_eq!(last.len(), 64);
        assert!(last.is_set(DecisionVar::new(0, 63)));
    }

    #[test]
    fn test_free_object_past_u128_is_too_large() {
        let inst = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0); 130]])
            .build()
            .unwrap();
        let err =
            ExactEnumerator::new(&inst, EnumeratorConfig::default().with_max_candidates(u128::MAX))
                .unwrap_err();
        assert!(matches!(err, AssignError::EnumerationTooLarge { .. }));
    }

    #[test]
    fn test_single_choice_beyond_mask_width() {
        let inst = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0); 200]])
            .object_cardinality(Cardinality::AtMostOne)
            .build()
            .unwrap();
        let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
        assert_eq!(en.candidate_count(), 201);
        assert_eq!(
            en.candidate(151).iter().collect::<Vec<_>>(),
            vec![DecisionVar::new(0, 150)]
        );
    }

    fn brute_force_feasible(inst: &ProblemInstance) -> BTreeSet<CandidateAssignment> {
        let vars = inst.variables();
        let eval = SolutionEvaluator::new(inst);
        (0u32..(1u32 << vars.len()))
            .map(|mask| {
                vars.iter()
                    .enumerate()
                    .filter(|(k, _)| (mask >> k) & 1 == 1)
                    .map(|(_, v)| *v)
                    .collect::<CandidateAssignment>()
            })
            .filter(|c| eval.evaluate(c).feasible)
            .collect()
    }

    fn small_instance() -> impl Strategy<Value = ProblemInstance> {
        (1usize..=3, 1usize..=3)
            .prop_flat_map(|(n, m)| {
                (
                    proptest::collection::vec(
                        proptest::collection::vec(proptest::option::weighted(0.8, 1u8..20), m),
                        n,
                    ),
                    prop_oneof![
                        Just(None),
                        Just(Some(Cardinality::AtMostOne)),
                        Just(Some(Cardinality::ExactlyOne))
                    ],
                    prop_oneof![
                        Just(None),
                        Just(Some(OccupancyPolicy::AtLeastOne)),
                        Just(Some(OccupancyPolicy::ExactlyOne)),
                        Just(Some(OccupancyPolicy::Range { lb: 0, ub: 1 }))
                    ],
                    proptest::option::of((0u8..20, 0u8..40)),
                )
            })
            .prop_map(|(table, card, occ, budget)| {
                let table: Vec<Vec<Option<f64>>> = table
                    .into_iter()
                    .map(|row| row.into_iter().map(|c| c.map(f64::from)).collect())
                    .collect();
                let mut b = InstanceBuilder::new().costs(table).sense(Sense::MinimizeCost);
                if let Some(card) = card {
                    b = b.object_cardinality(card);
                }
                if let Some(occ) = occ {
                    b = b.occupancy(occ);
                }
                if let Some((lo, width)) = budget {
                    b = b.budget(f64::from(lo), f64::from(lo) + f64::from(width));
                }
                b.build().expect("generated instance is well-formed")
            })
    }

    proptest! {
        #[test]
        fn prop_enumeration_is_sound_and_complete(inst in small_instance()) {
            let en = ExactEnumerator::new(&inst, EnumeratorConfig::default()).unwrap();
            let found: Vec<CandidateAssignment> = en.feasible().collect();
            let unique: BTreeSet<_> = found.iter().cloned().collect();
            prop_assert_eq!(unique.len(), found.len(), "duplicates in enumeration");
            prop_assert_eq!(unique, brute_force_feasible(&inst));
        }
    }
}
