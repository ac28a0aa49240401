//! Sparse candidate assignments.

use super::types::DecisionVar;
use std::collections::BTreeSet;

/// The set of decision variables set to 1; everything else is 0.
///
/// Candidates come from any source (enumeration, an LP solver, a sampler
/// after slack stripping) and are never mutated by evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateAssignment {
    selected: BTreeSet<DecisionVar>,
}

impl CandidateAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a candidate from one optional box per object.
    pub fn from_choices(choices: &[Option<usize>]) -> Self {
        choices
            .iter()
            .enumerate()
            .filter_map(|(object, choice)| choice.map(|b| DecisionVar::new(object, b)))
            .collect()
    }

    /// Sets `var` to 1.
    pub fn with(mut self, var: DecisionVar) -> Self {
        self.selected.insert(var);
        self
    }

    pub fn insert(&mut self, var: DecisionVar) -> bool {
        self.selected.insert(var)
    }

    pub fn is_set(&self, var: DecisionVar) -> bool {
        self.selected.contains(&var)
    }

    /// Variables set to 1, ordered object-major.
    pub fn iter(&self) -> impl Iterator<Item = DecisionVar> + '_ {
        self.selected.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Boxes holding `object`, in box order.
    pub fn boxes_of(&self, object: usize) -> impl Iterator<Item = usize> + '_ {
        self.selected
            .range(DecisionVar::new(object, 0)..=DecisionVar::new(object, usize::MAX))
            .map(|v| v.box_idx)
    }
}

impl FromIterator<DecisionVar> for CandidateAssignment {
    fn from_iter<T: IntoIterator<Item = DecisionVar>>(iter: T) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for CandidateAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .selected
            .iter()
            .map(|v| format!("{}->{}", v.object, v.box_idx))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
