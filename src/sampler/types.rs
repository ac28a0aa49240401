//! Sampler seam and sample containers.

use crate::error::Result;
use crate::evaluate::ScoredCandidate;
use crate::penalty::{QuboModel, QuboSample};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A minimizer of a [`QuboModel`].
///
/// Implementations may be exact, heuristic, or wrap a remote oracle. The
/// model is shared read-only, so one model may be handed to several
/// samplers at once.
///
/// Returned samples include slack bits; strip them with
/// [`QuboModel::strip_slack`] and re-check the result with
/// [`SolutionEvaluator`](crate::evaluate::SolutionEvaluator) before use.
pub trait QuboSampler {
    fn sample(&self, model: &QuboModel) -> Result<SampleSet>;
}

/// One binary assignment with its energy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub values: QuboSample,
    pub energy: f64,
    /// How many reads ended in this assignment.
    pub num_occurrences: usize,
}

impl Sample {
    pub fn new(values: QuboSample, energy: f64) -> Self {
        Self {
            values,
            energy,
            num_occurrences: 1,
        }
    }
}

/// Distinct samples ordered by energy, lowest first.
///
/// Ties keep their insertion order, which is sampler-specific.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Merges identical assignments (summing occurrences) and sorts.
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        let mut merged: Vec<Sample> = Vec::new();
        let mut index: BTreeMap<QuboSample, usize> = BTreeMap::new();
        for s in samples {
            match index.get(&s.values) {
                Some(&k) => merged[k].num_occurrences += s.num_occurrences,
                None => {
                    index.insert(s.values.clone(), merged.len());
                    merged.push(s);
                }
            }
        }
        merged.sort_by(|a, b| a.energy.partial_cmp(&b.energy).unwrap_or(Ordering::Equal));
        Self { samples: merged }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn lowest(&self) -> Option<&Sample> {
        self.samples.first()
    }

    /// Total number of reads represented.
    pub fn num_reads(&self) -> usize {
        self.samples.iter().map(|s| s.num_occurrences).sum()
    }

    /// Decision parts of every sample, scored by energy.
    pub fn decode(&self, model: &QuboModel) -> Vec<ScoredCandidate> {
        self.samples
            .iter()
            .map(|s| ScoredCandidate::new(model.strip_slack(&s.values), s.energy))
            .collect()
    }
}

impl IntoIterator for SampleSet {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}
