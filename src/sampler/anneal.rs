//! Single-bit-flip simulated annealing over a compiled model.

use super::config::{AnnealConfig, CoolingSchedule};
use super::types::{QuboSampler, Sample, SampleSet};
use crate::error::{AssignError, Result};
use crate::penalty::{CompiledQubo, QuboModel, QuboSample};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Metropolis annealing with incremental energy deltas.
///
/// Each read starts from a uniformly random state, sweeps every variable
/// in order at each temperature level, and reports the lowest-energy state
/// it visited. Reads are independent, so they can run on the rayon pool
/// when [`AnnealConfig::parallel`] is set and the `parallel` feature is on.
///
/// # Examples
///
/// ```
/// use u_assign::instance::{InstanceBuilder, OccupancyPolicy};
/// use u_assign::penalty::{PenaltyConfig, PenaltyModelBuilder};
/// use u_assign::sampler::{AnnealConfig, AnnealingSampler, QuboSampler};
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
/// let sampler = AnnealingSampler::new(AnnealConfig::default().with_seed(7));
/// let set = sampler.sample(&model).unwrap();
/// assert_eq!(set.lowest().unwrap().energy, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnnealingSampler {
    config: AnnealConfig,
    cancel: Option<Arc<AtomicBool>>,
}

/// Outcome of one read.
struct Read {
    best: Vec<bool>,
    accepted: usize,
    flips: usize,
    cancelled: bool,
}

impl AnnealingSampler {
    pub fn new(config: AnnealConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Stops every read at its next temperature level once `flag` is set;
    /// the states reached so far are still returned.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    fn temperatures(&self, compiled: &CompiledQubo) -> Result<(f64, f64)> {
        let (derived_hot, derived_cold) = match compiled.delta_bounds() {
            Some((largest, smallest)) => (largest / 2f64.ln(), smallest / 100f64.ln()),
            None => (1.0, 1e-3),
        };
        let hot = self.config.initial_temperature.unwrap_or(derived_hot);
        let mut cold = self.config.min_temperature.unwrap_or(derived_cold);
        if cold >= hot {
            if self.config.min_temperature.is_some() {
                return Err(AssignError::config(format!(
                    "min_temperature {cold} is not below the starting temperature {hot}"
                )));
            }
            cold = hot * 1e-3;
        }
        debug!("annealing from T={hot} down to T={cold}");
        Ok((hot, cold))
    }

    fn run_reads(&self, compiled: &CompiledQubo, seed: u64, hot: f64, cold: f64) -> Vec<Read> {
        let reads = self.config.num_reads;
        #[cfg(feature = "parallel")]
        if self.config.parallel {
            use rayon::prelude::*;
            return (0..reads)
                .into_par_iter()
                .map(|r| self.anneal(compiled, seed.wrapping_add(r as u64), hot, cold))
                .collect();
        }
        #[cfg(not(feature = "parallel"))]
        if self.config.parallel {
            debug!("parallel reads need the `parallel` feature; running sequentially");
        }
        (0..reads)
            .map(|r| self.anneal(compiled, seed.wrapping_add(r as u64), hot, cold))
            .collect()
    }

    fn anneal(&self, compiled: &CompiledQubo, seed: u64, hot: f64, cold: f64) -> Read {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = compiled.len();
        let mut state: Vec<bool> = (0..n).map(|_| rng.random_bool(0.5)).collect();
        let mut energy = compiled.energy(&state);
        let mut best = state.clone();
        let mut best_energy = energy;

        let mut temperature = hot;
        let mut step = 0usize;
        let mut accepted = 0usize;
        let mut flips = 0usize;
        let mut cancelled = false;

        loop {
            if let Some(flag) = &self.cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            for _ in 0..self.config.sweeps_per_temperature {
                for k in 0..n {
                    let delta = compiled.flip_delta(&state, k);
                    // Metropolis acceptance criterion
                    let accept =
                        delta <= 0.0 || rng.random::<f64>() < (-delta / temperature).exp();
                    flips += 1;
                    if accept {
                        state[k] = !state[k];
                        energy += delta;
                        accepted += 1;
                        if energy < best_energy {
                            best_energy = energy;
                            best.copy_from_slice(&state);
                        }
                    }
                }
            }

            if temperature <= cold {
                break;
            }
            temperature = cool(temperature, &self.config.cooling, step, hot, cold);
            step += 1;
        }

        Read {
            best,
            accepted,
            flips,
            cancelled,
        }
    }
}

/// Next temperature level, never below `cold`.
fn cool(temperature: f64, cooling: &CoolingSchedule, step: usize, hot: f64, cold: f64) -> f64 {
    let next = match *cooling {
        CoolingSchedule::Geometric { alpha } => temperature * alpha,
        CoolingSchedule::Linear { steps } => hot - (step + 1) as f64 * (hot - cold) / steps as f64,
    };
    next.max(cold)
}

impl QuboSampler for AnnealingSampler {
    fn sample(&self, model: &QuboModel) -> Result<SampleSet> {
        self.config.validate()?;
        let compiled = model.compile();
        if compiled.is_empty() {
            return Ok(SampleSet::new([Sample::new(QuboSample::new(), model.offset())]));
        }
        let (hot, cold) = self.temperatures(&compiled)?;
        let seed = self.config.seed.unwrap_or_else(rand::random);

        let reads = self.run_reads(&compiled, seed, hot, cold);
        let accepted: usize = reads.iter().map(|r| r.accepted).sum();
        let flips: usize = reads.iter().map(|r| r.flips).sum();
        info!(
            "annealed {} reads over {} variables: {} flips, {:.1}% accepted{}",
            reads.len(),
            compiled.len(),
            flips,
            100.0 * accepted as f64 / flips.max(1) as f64,
            if reads.iter().any(|r| r.cancelled) { " (cancelled)" } else { "" }
        );

        Ok(SampleSet::new(reads.into_iter().map(|r| {
            Sample::new(compiled.to_sample(&r.best), compiled.energy(&r.best))
        })))
    }
}
