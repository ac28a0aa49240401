//! Brute-force ground-state search.

use super::types::{QuboSampler, Sample, SampleSet};
use crate::error::{AssignError, Result};
use crate::penalty::QuboModel;
use log::debug;

/// Visits all `2^n` states of a model in Gray-code order and keeps the
/// `keep` lowest.
///
/// Exact, so it separates encoding mistakes from heuristic failures on
/// small models. Refuses models with more than `max_variables` variables.
///
/// # Examples
///
/// ```
/// use u_assign::instance::{InstanceBuilder, OccupancyPolicy};
/// use u_assign::penalty::{PenaltyConfig, PenaltyModelBuilder};
/// use u_assign::sampler::{ExhaustiveSampler, QuboSampler};
///
/// let instance = InstanceBuilder::new()
///     .costs(vec![vec![Some(3.0)], vec![Some(1.0)]])
///     .occupancy(OccupancyPolicy::ExactlyOne)
///     .build()
///     .unwrap();
/// let model = PenaltyModelBuilder::new(&instance, PenaltyConfig::default())
///     .build()
///     .unwrap();
///
/// let set = ExhaustiveSampler::new().sample(&model).unwrap();
/// assert_eq!(set.lowest().unwrap().energy, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct ExhaustiveSampler {
    pub max_variables: usize,
    /// Number of lowest states returned.
    pub keep: usize,
}

impl ExhaustiveSampler {
    pub fn new() -> Self {
        Self {
            max_variables: 24,
            keep: 32,
        }
    }

    pub fn with_max_variables(mut self, n: usize) -> Self {
        self.max_variables = n;
        self
    }

    pub fn with_keep(mut self, k: usize) -> Self {
        self.keep = k;
        self
    }
}

impl Default for ExhaustiveSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl QuboSampler for ExhaustiveSampler {
    fn sample(&self, model: &QuboModel) -> Result<SampleSet> {
        if self.keep == 0 {
            return Err(AssignError::config("keep must be at least 1"));
        }
        let n = model.num_variables();
        if n > self.max_variables.min(63) {
            return Err(AssignError::EnumerationTooLarge {
                candidates: 1u128 << n.min(127),
                limit: 1u128 << self.max_variables.min(63),
            });
        }

        let compiled = model.compile();
        let mut state = vec![false; n];
        let mut energy = compiled.energy(&state);
        // (energy, state bits), unordered
        let mut kept: Vec<(f64, u64)> = vec![(energy, 0)];
        let mut worst = (0, energy);
        let mut mask = 0u64;
        for step in 1u64..(1u64 << n) {
            let k = step.trailing_zeros() as usize;
            energy += compiled.flip_delta(&state, k);
            state[k] = !state[k];
            mask ^= 1 << k;

            if kept.len() < self.keep {
                kept.push((energy, mask));
                if energy > worst.1 {
                    worst = (kept.len() - 1, energy);
                }
            } else if energy < worst.1 {
                kept[worst.0] = (energy, mask);
                worst = highest(&kept);
            }
        }
        debug!(
            "exhaustive sampler visited {} states of {} variables",
            1u64 << n,
            n
        );

        kept.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        Ok(SampleSet::new(kept.into_iter().map(|(_, bits)| {
            let state: Vec<bool> = (0..n).map(|k| (bits >> k) & 1 == 1).collect();
            // recomputed to drop accumulated rounding
            Sample::new(compiled.to_sample(&state), compiled.energy(&state))
        })))
    }
}

/// Position and energy of the highest kept state.
fn highest(kept: &[(f64, u64)]) -> (usize, f64) {
    kept.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |acc, (k, &(e, _))| {
            if e > acc.1 {
                (k, e)
            } else {
                acc
            }
        })
}
