//! Annealing configuration and cooling schedules.

use crate::error::{AssignError, Result};

/// Cooling schedule for temperature reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// Geometric (exponential) cooling: `T_{k+1} = alpha * T_k`.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// Linear cooling from `T_0` to `T_min` in `steps` temperature levels.
    Linear { steps: usize },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.95 }
    }
}

/// Configuration for [`AnnealingSampler`](super::AnnealingSampler).
///
/// Temperatures left unset are derived from the model: the hot end accepts
/// the largest possible single-flip increase with probability 1/2, the cold
/// end accepts the smallest non-zero increase with probability 1/100.
///
/// # Examples
///
/// ```
/// use u_assign::sampler::{AnnealConfig, CoolingSchedule};
///
/// let config = AnnealConfig::default()
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.9 })
///     .with_sweeps_per_temperature(20)
///     .with_num_reads(16)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Starting temperature; derived from the model when `None`.
    pub initial_temperature: Option<f64>,

    /// Final temperature; derived from the model when `None`.
    pub min_temperature: Option<f64>,

    pub cooling: CoolingSchedule,

    /// Full passes over all variables at each temperature level.
    pub sweeps_per_temperature: usize,

    /// Independent restarts; each contributes its best state.
    pub num_reads: usize,

    /// Random seed for reproducibility. Read `r` uses `seed + r`.
    pub seed: Option<u64>,

    /// Run reads on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: None,
            min_temperature: None,
            cooling: CoolingSchedule::default(),
            sweeps_per_temperature: 10,
            num_reads: 10,
            seed: None,
            parallel: false,
        }
    }
}

impl AnnealConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = Some(t);
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = Some(t);
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_sweeps_per_temperature(mut self, n: usize) -> Self {
        self.sweeps_per_temperature = n;
        self
    }

    pub fn with_num_reads(mut self, n: usize) -> Self {
        self.num_reads = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        for (name, t) in [
            ("initial_temperature", self.initial_temperature),
            ("min_temperature", self.min_temperature),
        ] {
            if let Some(t) = t {
                if !(t.is_finite() && t > 0.0) {
                    return Err(AssignError::config(format!("{name} must be positive, got {t}")));
                }
            }
        }
        if let (Some(hot), Some(cold)) = (self.initial_temperature, self.min_temperature) {
            if cold >= hot {
                return Err(AssignError::config(
                    "min_temperature must be less than initial_temperature",
                ));
            }
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                if !(alpha > 0.0 && alpha < 1.0) {
                    return Err(AssignError::config(format!(
                        "geometric alpha must be in (0, 1), got {alpha}"
                    )));
                }
            }
            CoolingSchedule::Linear { steps } => {
                if steps == 0 {
                    return Err(AssignError::config("linear steps must be at least 1"));
                }
            }
        }
        if self.sweeps_per_temperature == 0 {
            return Err(AssignError::config("sweeps_per_temperature must be at least 1"));
        }
        if self.num_reads == 0 {
            return Err(AssignError::config("num_reads must be at least 1"));
        }
        Ok(())
    }
}
