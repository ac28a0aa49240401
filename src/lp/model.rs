//! 0/1 linear program restating an instance without penalties.

use crate::instance::{DecisionVar, ProblemInstance, Sense, ACTIVITY_TOLERANCE};
use log::debug;

/// Comparison of a row's activity against its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowSense {
    /// `Σ a_k x_k <= rhs`
    Le,
    /// `Σ a_k x_k >= rhs`
    Ge,
    /// `Σ a_k x_k == rhs`
    Eq,
}

/// A linear constraint row over column indices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpRow {
    /// Label of the constraint this row came from.
    pub label: String,
    /// `(column, coefficient)` pairs.
    pub coefficients: Vec<(usize, f64)>,
    pub sense: RowSense,
    pub rhs: f64,
}

impl LpRow {
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients.iter().map(|&(k, a)| a * values[k]).sum()
    }

    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let act = self.activity(values);
        match self.sense {
            RowSense::Le => act <= self.rhs + ACTIVITY_TOLERANCE,
            RowSense::Ge => act >= self.rhs - ACTIVITY_TOLERANCE,
            RowSense::Eq => (act - self.rhs).abs() <= ACTIVITY_TOLERANCE,
        }
    }
}

/// Binary linear program with one column per compatible pair.
///
/// The objective is stated in the instance's own sense (total cost to
/// minimize, or total profit to maximize). Soft constraints are left out;
/// a bound that every 0/1 assignment of the row already meets becomes no
/// row at all.
///
/// # Examples
///
/// ```
/// use u_assign::instance::{Cardinality, InstanceBuilder, OccupancyPolicy};
/// use u_assign::lp::{LinearProgram, RowSense};
///
/// let instance = InstanceBuilder::new()
///     .costs(vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0), None]])
///     .object_cardinality(Cardinality::AtMostOne)
///     .occupancy(OccupancyPolicy::ExactlyOne)
///     .build()
///     .unwrap();
///
/// let lp = LinearProgram::from_instance(&instance);
/// assert_eq!(lp.num_columns(), 3);
/// assert!(lp.rows().iter().any(|r| r.sense == RowSense::Eq));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearProgram {
    columns: Vec<DecisionVar>,
    objective: Vec<f64>,
    sense: Sense,
    rows: Vec<LpRow>,
}

impl LinearProgram {
    pub fn from_instance(instance: &ProblemInstance) -> Self {
        let columns = instance.variables().to_vec();
        let objective = columns
            .iter()
            .map(|v| match instance.sense() {
                Sense::MinimizeCost => instance.cost(v.object, v.box_idx).unwrap_or(0.0),
                Sense::MaximizeProfit => instance.profit(v.object, v.box_idx).unwrap_or(0.0),
            })
            .collect();

        let mut rows = Vec::new();
        for spec in instance.constraints().iter().filter(|c| c.is_hard()) {
            let form = instance.linear_form(spec);
            let coefficients: Vec<(usize, f64)> = form
                .terms
                .iter()
                .filter_map(|&(v, a)| instance.variable_index(v).map(|k| (k, a)))
                .collect();
            let (lo, hi) = form.achievable_range();
            let row = |sense, rhs| LpRow {
                label: spec.label.clone(),
                coefficients: coefficients.clone(),
                sense,
                rhs,
            };
            if form.is_equality() {
                rows.push(row(RowSense::Eq, form.lb));
                continue;
            }
            let mut added = false;
            if form.lb > lo + ACTIVITY_TOLERANCE {
                rows.push(row(RowSense::Ge, form.lb));
                added = true;
            }
            if form.ub < hi - ACTIVITY_TOLERANCE {
                rows.push(row(RowSense::Le, form.ub));
                added = true;
            }
            if !added {
                debug!("`{}` is implied by the 0/1 domain; no row", spec.label);
            }
        }

        Self {
            columns,
            objective,
            sense: instance.sense(),
            rows,
        }
    }

    /// Decision variable of each column.
    pub fn columns(&self) -> &[DecisionVar] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Objective coefficient of each column, in [`sense`](Self::sense).
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn rows(&self) -> &[LpRow] {
        &self.rows
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    pub fn is_feasible(&self, values: &[f64]) -> bool {
        self.rows.iter().all(|r| r.is_satisfied(values))
    }
}
