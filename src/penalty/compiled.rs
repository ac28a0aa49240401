//! Dense, index-addressed view of a [`QuboModel`] for samplers.

use super::model::{QuboModel, QuboSample, QuboVar};

/// A [`QuboModel`] flattened to positions `0..n` with per-variable
/// adjacency lists.
///
/// States are `&[bool]` slices indexed like [`variables`](Self::variables).
#[derive(Debug, Clone)]
pub struct CompiledQubo {
    variables: Vec<QuboVar>,
    linear: Vec<f64>,
    /// `neighbors[k]` holds `(j, b_kj)` for every non-zero interaction.
    neighbors: Vec<Vec<(usize, f64)>>,
    offset: f64,
}

impl CompiledQubo {
    pub(super) fn new(model: &QuboModel) -> Self {
        let variables = model.variables().to_vec();
        let position = |v: &QuboVar| variables.binary_search(v).ok();
        let linear = variables
            .iter()
            .map(|v| model.linear().get(v).copied().unwrap_or(0.0))
            .collect();
        let mut neighbors = vec![Vec::new(); variables.len()];
        for (&(u, v), &b) in model.quadratic() {
            if let (Some(k), Some(j)) = (position(&u), position(&v)) {
                neighbors[k].push((j, b));
                neighbors[j].push((k, b));
            }
        }
        Self {
            variables,
            linear,
            neighbors,
            offset: model.offset(),
        }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables in position order.
    pub fn variables(&self) -> &[QuboVar] {
        &self.variables
    }

    pub fn energy(&self, state: &[bool]) -> f64 {
        let mut e = self.offset;
        for (k, &on) in state.iter().enumerate() {
            if !on {
                continue;
            }
            e += self.linear[k];
            e += self.neighbors[k]
                .iter()
                .filter(|&&(j, _)| j > k && state[j])
                .map(|&(_, b)| b)
                .sum::<f64>();
        }
        e
    }

    /// Energy change from flipping bit `k` of `state`.
    pub fn flip_delta(&self, state: &[bool], k: usize) -> f64 {
        let field = self.linear[k]
            + self.neighbors[k]
                .iter()
                .filter(|&&(j, _)| state[j])
                .map(|&(_, b)| b)
                .sum::<f64>();
        if state[k] {
            -field
        } else {
            field
        }
    }

    /// `(largest possible |flip delta|, smallest non-zero coefficient
    /// magnitude)`, or `None` for a model without non-zero coefficients.
    pub fn delta_bounds(&self) -> Option<(f64, f64)> {
        let mut largest = 0.0f64;
        let mut smallest = f64::INFINITY;
        for (k, nbrs) in self.neighbors.iter().enumerate() {
            let mut reach = self.linear[k].abs();
            for &(_, b) in nbrs {
                reach += b.abs();
                smallest = smallest.min(b.abs());
            }
            if self.linear[k] != 0.0 {
                smallest = smallest.min(self.linear[k].abs());
            }
            largest = largest.max(reach);
        }
        (largest > 0.0).then_some((largest, smallest))
    }

    pub fn to_sample(&self, state: &[bool]) -> QuboSample {
        self.variables.iter().copied().zip(state.iter().copied()).collect()
    }

    /// Inverse of [`to_sample`](Self::to_sample); absent variables are 0.
    pub fn to_state(&self, sample: &QuboSample) -> Vec<bool> {
        self.variables
            .iter()
            .map(|v| sample.get(v).copied().unwrap_or(false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::instance::{fixtures, OccupancyPolicy};
    use crate::penalty::{PenaltyConfig, PenaltyModelBuilder};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_compiled_energy_matches_model() {
        let inst = fixtures::cost_instance(OccupancyPolicy::AtLeastOne);
        let model = PenaltyModelBuilder::new(&inst, PenaltyConfig::default())
            .build()
            .unwrap();
        let compiled = model.compile();
        assert_eq!(compiled.len(), model.num_variables());

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let state: Vec<bool> = (0..compiled.len()).map(|_| rng.random_bool(0.3)).collect();
            let sample = compiled.to_sample(&state);
            assert!((compiled.energy(&state) - model.energy(&sample)).abs() < 1e-6);
            assert_eq!(compiled.to_state(&sample), state);
        }
    }

    #[test]
    fn test_flip_delta() {
        let inst = fixtures::global_budget_instance();
        let model = PenaltyModelBuilder::new(&inst, PenaltyConfig::default())
            .build()
            .unwrap();
        let compiled = model.compile();
        let mut rng = StdRng::seed_from_u64(11);
        let mut state: Vec<bool> = (0..compiled.len()).map(|_| rng.random_bool(0.5)).collect();
        for _ in 0..200 {
            let k = rng.random_range(0..compiled.len());
            let before = compiled.energy(&state);
            let delta = compiled.flip_delta(&state, k);
            state[k] = !state[k];
            let after = compiled.energy(&state);
            assert!(
                (after - before - delta).abs() < 1e-6,
                "flip {k}: delta {delta} vs {}",
                after - before
            );
        }
    }
}
