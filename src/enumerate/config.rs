//! Exhaustive enumeration configuration.

use crate::error::{AssignError, Result};

/// Configuration for [`ExactEnumerator`](super::ExactEnumerator).
///
/// # Examples
///
/// ```
/// use u_assign::enumerate::EnumeratorConfig;
///
/// let config = EnumeratorConfig::default()
///     .with_max_candidates(1 << 20)
///     .with_shards(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumeratorConfig {
    /// Refuse candidate spaces larger than this.
    pub max_candidates: u128,

    /// Number of index ranges the space is split into for sharded runs.
    pub shards: usize,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            max_candidates: 50_000_000,
            shards: 8,
        }
    }
}

impl EnumeratorConfig {
    pub fn with_max_candidates(mut self, n: u128) -> Self {
        self.max_candidates = n;
        self
    }

    pub fn with_shards(mut self, n: usize) -> Self {
        self.shards = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_candidates == 0 {
            return Err(AssignError::config("max_candidates must be positive"));
        }
        if self.shards == 0 {
            return Err(AssignError::config("shards must be at least 1"));
        }
        Ok(())
    }
}
