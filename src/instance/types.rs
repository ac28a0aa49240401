//! Identifier and mode types for assignment instances.

/// A binary placement variable: object `object` goes into box `box_idx`.
///
/// Only defined for compatible pairs; an incompatible pair never gets a
/// variable anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionVar {
    /// Object index in `0..N`.
    pub object: usize,
    /// Box index in `0..M`.
    pub box_idx: usize,
}

impl DecisionVar {
    pub fn new(object: usize, box_idx: usize) -> Self {
        Self { object, box_idx }
    }
}

impl std::fmt::Display for DecisionVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x[{},{}]", self.object, self.box_idx)
    }
}

/// Optimization direction of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    /// Minimize total cost over placed pairs.
    #[default]
    MinimizeCost,
    /// Maximize total profit over placed pairs.
    MaximizeProfit,
}

/// Whether a constraint decides feasibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hardness {
    /// Violations make a candidate infeasible.
    #[default]
    Hard,
    /// Violations are reported and penalized but do not affect feasibility.
    Soft,
}

/// How many boxes each object may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cardinality {
    /// `Σ_j x[i,j] <= 1`: the object may stay unassigned.
    AtMostOne,
    /// `Σ_j x[i,j] = 1`: the object must be placed.
    ExactlyOne,
}

/// Box occupancy rule applied uniformly to every box by the instance builder.
///
/// Hard "exactly one" and soft "at least one" describe different problems,
/// so the rule is always chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OccupancyPolicy {
    /// Every box holds exactly one object.
    ExactlyOne,
    /// Every box holds at least one object.
    AtLeastOne,
    /// Every box holds between `lb` and `ub` objects.
    Range { lb: u32, ub: u32 },
    /// Empty boxes are discouraged but allowed.
    SoftAtLeastOne,
}
