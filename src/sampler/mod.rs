//! Minimizers for penalty-encoded models.
//!
//! [`QuboSampler`] is the seam for any engine that minimizes a
//! [`QuboModel`](crate::penalty::QuboModel): local search, an exact
//! brute-force reference, or a remote oracle. Two implementations ship
//! with the crate:
//!
//! - [`ExhaustiveSampler`]: every state of a small model, exact
//! - [`AnnealingSampler`]: single-bit-flip simulated annealing
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Lucas (2014), "Ising formulations of many NP problems"

mod anneal;
mod config;
mod exhaustive;
mod types;

pub use anneal::AnnealingSampler;
pub use config::{AnnealConfig, CoolingSchedule};
pub use exhaustive::ExhaustiveSampler;
pub use types::{QuboSampler, Sample, SampleSet};
