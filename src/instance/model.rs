//! The immutable problem instance and its builder.

use super::constraint::{
    BudgetScope, ConstraintKind, ConstraintSpec, LinearForm, ACTIVITY_TOLERANCE,
};
use super::types::{Cardinality, DecisionVar, OccupancyPolicy, Sense};
use crate::error::{AssignError, Result};

/// A cost or profit table: `table[i][j]` is `None` for incompatible pairs.
pub type Table = Vec<Vec<Option<f64>>>;

/// Objects, boxes, per-pair cost/profit, and typed constraints.
///
/// Built once through [`InstanceBuilder`] and read-only afterwards, so it
/// can be shared across threads by every solving strategy.
///
/// # Examples
///
/// ```
/// use u_assign::instance::{Cardinality, InstanceBuilder, OccupancyPolicy};
///
/// let instance = InstanceBuilder::new()
///     .costs(vec![
///         vec![Some(10.0), Some(20.0)],
///         vec![None, Some(5.0)],
///     ])
///     .object_cardinality(Cardinality::AtMostOne)
///     .occupancy(OccupancyPolicy::ExactlyOne)
///     .build()
///     .unwrap();
///
/// assert!(instance.compatible(0, 1));
/// assert!(!instance.compatible(1, 0));
/// assert_eq!(instance.cost(1, 1), Some(5.0));
/// assert_eq!(instance.constraints().len(), 4);
/// ```
///
/// With the `serde` feature the instance serializes as its builder inputs
/// (labels, tables, sense, constraints); deserializing runs
/// [`InstanceBuilder::build`] again, so a malformed payload is rejected.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    objects: Vec<String>,
    boxes: Vec<String>,
    /// Dense `N * M` cost lookup.
    costs: Option<Vec<Option<f64>>>,
    /// Dense `N * M` profit lookup.
    profits: Option<Vec<Option<f64>>>,
    /// Dense `N * M` map from pair to position in `variables`.
    var_index: Vec<Option<usize>>,
    variables: Vec<DecisionVar>,
    constraints: Vec<ConstraintSpec>,
    sense: Sense,
}

impl ProblemInstance {
    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn num_boxes(&self) -> usize {
        self.boxes.len()
    }

    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    pub fn boxes(&self) -> &[String] {
        &self.boxes
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Whether object `i` may be placed in box `j`. Out-of-range is `false`.
    pub fn compatible(&self, i: usize, j: usize) -> bool {
        self.variable_index(DecisionVar::new(i, j)).is_some()
    }

    /// Cost of placing `i` in `j`, absent for incompatible pairs or when no
    /// cost table was supplied.
    pub fn cost(&self, i: usize, j: usize) -> Option<f64> {
        self.lookup(self.costs.as_deref(), i, j)
    }

    /// Profit of placing `i` in `j`, absent like [`cost`](Self::cost).
    pub fn profit(&self, i: usize, j: usize) -> Option<f64> {
        self.lookup(self.profits.as_deref(), i, j)
    }

    pub fn has_costs(&self) -> bool {
        self.costs.is_some()
    }

    pub fn has_profits(&self) -> bool {
        self.profits.is_some()
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> &[ConstraintSpec] {
        &self.constraints
    }

    /// Every compatible pair, object-major.
    pub fn variables(&self) -> &[DecisionVar] {
        &self.variables
    }

    /// Position of `var` in [`variables`](Self::variables), if compatible.
    pub fn variable_index(&self, var: DecisionVar) -> Option<usize> {
        if var.object >= self.num_objects() || var.box_idx >= self.num_boxes() {
            return None;
        }
        self.var_index[var.object * self.num_boxes() + var.box_idx]
    }

    /// Compatible boxes of `object`, in box order.
    pub fn compatible_boxes(&self, object: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_boxes()).filter(move |&j| self.compatible(object, j))
    }

    /// Compatible objects of `box_idx`, in object order.
    pub fn compatible_objects(&self, box_idx: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_objects()).filter(move |&i| self.compatible(i, box_idx))
    }

    /// Coefficient of `var` in the minimization objective: the cost, or the
    /// negated profit when maximizing. Zero for incompatible pairs.
    pub fn objective_coefficient(&self, var: DecisionVar) -> f64 {
        match self.sense {
            Sense::MinimizeCost => self.cost(var.object, var.box_idx).unwrap_or(0.0),
            Sense::MaximizeProfit => -self.profit(var.object, var.box_idx).unwrap_or(0.0),
        }
    }

    /// Restates a constraint as `lb <= Σ a_k x_k <= ub` over compatible pairs.
    pub fn linear_form(&self, spec: &ConstraintSpec) -> LinearForm {
        match &spec.kind {
            ConstraintKind::AssignmentCardinality {
                object,
                cardinality,
            } => {
                let lb = match cardinality {
                    Cardinality::AtMostOne => 0.0,
                    Cardinality::ExactlyOne => 1.0,
                };
                LinearForm {
                    terms: self
                        .compatible_boxes(*object)
                        .map(|j| (DecisionVar::new(*object, j), 1.0))
                        .collect(),
                    lb,
                    ub: 1.0,
                }
            }
            ConstraintKind::OccupancyBound { box_idx, lb, ub } => LinearForm {
                terms: self
                    .compatible_objects(*box_idx)
                    .map(|i| (DecisionVar::new(i, *box_idx), 1.0))
                    .collect(),
                lb: f64::from(*lb),
                ub: ub.map(f64::from).unwrap_or(f64::INFINITY),
            },
            ConstraintKind::LinearBudget { scope, lb, ub } => {
                let vars: Vec<DecisionVar> = match scope {
                    BudgetScope::All => self.variables.clone(),
                    BudgetScope::Pairs(pairs) => {
                        let mut pairs = pairs.clone();
                        pairs.sort();
                        pairs.dedup();
                        pairs
                    }
                };
                LinearForm {
                    terms: vars
                        .into_iter()
                        .filter_map(|v| self.cost(v.object, v.box_idx).map(|c| (v, c)))
                        .collect(),
                    lb: *lb,
                    ub: *ub,
                }
            }
        }
    }

    /// Rejects instances whose hard constraints cannot all be met, using
    /// only per-constraint reachability (no search).
    ///
    /// Catches e.g. a box with no compatible object that must hold one.
    pub fn check_structural_feasibility(&self) -> Result<()> {
        for spec in self.constraints.iter().filter(|c| c.is_hard()) {
            let form = self.linear_form(spec);
            if form.lb > form.ub {
                return Err(AssignError::infeasible(format!(
                    "constraint `{}` has an empty interval [{}, {}]",
                    spec.label, form.lb, form.ub
                )));
            }
            let (lo, hi) = form.achievable_range();
            if hi < form.lb - ACTIVITY_TOLERANCE || lo > form.ub + ACTIVITY_TOLERANCE {
                return Err(AssignError::infeasible(format!(
                    "constraint `{}` ({}) needs [{}, {}] but only [{}, {}] is reachable over {} compatible pairs",
                    spec.label,
                    spec.kind_name(),
                    form.lb,
                    form.ub,
                    lo,
                    hi,
                    form.terms.len()
                )));
            }
        }
        Ok(())
    }

    fn lookup(&self, table: Option<&[Option<f64>]>, i: usize, j: usize) -> Option<f64> {
        if i >= self.num_objects() || j >= self.num_boxes() {
            return None;
        }
        table.and_then(|t| t[i * self.num_boxes() + j])
    }
}

/// Assembles and validates a [`ProblemInstance`].
///
/// Object and box labels default to `object 1..N` / `box 1..M` derived from
/// the table shape.
#[derive(Debug, Clone, Default)]
pub struct InstanceBuilder {
    objects: Option<Vec<String>>,
    boxes: Option<Vec<String>>,
    costs: Option<Table>,
    profits: Option<Table>,
    sense: Option<Sense>,
    cardinality: Option<Cardinality>,
    occupancy: Option<OccupancyPolicy>,
    budget: Option<(f64, f64)>,
    extra: Vec<ConstraintSpec>,
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.objects = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn boxes<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.boxes = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn costs(mut self, table: Table) -> Self {
        self.costs = Some(table);
        self
    }

    pub fn profits(mut self, table: Table) -> Self {
        self.profits = Some(table);
        self
    }

    /// Defaults to [`Sense::MinimizeCost`] with a cost table, otherwise
    /// [`Sense::MaximizeProfit`].
    pub fn sense(mut self, sense: Sense) -> Self {
        self.sense = Some(sense);
        self
    }

    /// Adds one cardinality constraint per object.
    pub fn object_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    /// Adds one occupancy constraint per box.
    pub fn occupancy(mut self, policy: OccupancyPolicy) -> Self {
        self.occupancy = Some(policy);
        self
    }

    /// Adds a total-cost window over every compatible pair.
    pub fn budget(mut self, lb: f64, ub: f64) -> Self {
        self.budget = Some((lb, ub));
        self
    }

    /// Adds an arbitrary constraint after the generated ones.
    pub fn constraint(mut self, spec: ConstraintSpec) -> Self {
        self.extra.push(spec);
        self
    }

    pub fn build(self) -> Result<ProblemInstance> {
        let shape_source = self
            .costs
            .as_ref()
            .or(self.profits.as_ref())
            .ok_or_else(|| AssignError::malformed("neither a cost nor a profit table was given"))?;

        let objects = match self.objects {
            Some(labels) => labels,
            None => (1..=shape_source.len()).map(|i| format!("object {i}")).collect(),
        };
        let boxes = match self.boxes {
            Some(labels) => labels,
            None => {
                let m = shape_source.first().map_or(0, Vec::len);
                (1..=m).map(|j| format!("box {j}")).collect()
            }
        };
        let (n, m) = (objects.len(), boxes.len());
        if n == 0 || m == 0 {
            return Err(AssignError::malformed(format!(
                "instance needs at least one object and one box, got {n}x{m}"
            )));
        }

        let costs = self
            .costs
            .as_ref()
            .map(|t| flatten("cost", t, n, m))
            .transpose()?;
        let profits = self
            .profits
            .as_ref()
            .map(|t| flatten("profit", t, n, m))
            .transpose()?;

        if let (Some(c), Some(p)) = (&costs, &profits) {
            if let Some(k) = (0..n * m).find(|&k| c[k].is_some() != p[k].is_some()) {
                return Err(AssignError::malformed(format!(
                    "cost and profit tables disagree on compatibility of object {} / box {}",
                    k / m,
                    k % m
                )));
            }
        }

        let mask = costs
            .as_ref()
            .or(profits.as_ref())
            .map(|t| t.iter().map(Option::is_some).collect::<Vec<_>>())
            .unwrap_or_default();
        let mut var_index = vec![None; n * m];
        let mut variables = Vec::new();
        for (k, compatible) in mask.into_iter().enumerate() {
            if compatible {
                var_index[k] = Some(variables.len());
                variables.push(DecisionVar::new(k / m, k % m));
            }
        }

        let sense = self.sense.unwrap_or(if costs.is_some() {
            Sense::MinimizeCost
        } else {
            Sense::MaximizeProfit
        });
        match sense {
            Sense::MinimizeCost if costs.is_none() => {
                return Err(AssignError::malformed("cost minimization needs a cost table"))
            }
            Sense::MaximizeProfit if profits.is_none() => {
                return Err(AssignError::malformed("profit maximization needs a profit table"))
            }
            _ => {}
        }

        let mut constraints = Vec::new();
        if let Some(cardinality) = self.cardinality {
            for i in 0..n {
                constraints.push(ConstraintSpec::new(
                    format!("object_{i}_assignment"),
                    ConstraintKind::AssignmentCardinality {
                        object: i,
                        cardinality,
                    },
                ));
            }
        }
        if let Some(policy) = self.occupancy {
            for j in 0..m {
                constraints.push(occupancy_constraint(j, policy));
            }
        }
        if let Some((lb, ub)) = self.budget {
            constraints.push(ConstraintSpec::new(
                "total_cost",
                ConstraintKind::LinearBudget {
                    scope: BudgetScope::All,
                    lb,
                    ub,
                },
            ));
        }
        constraints.extend(self.extra);

        let instance = ProblemInstance {
            objects,
            boxes,
            costs,
            profits,
            var_index,
            variables,
            constraints,
            sense,
        };
        for spec in &instance.constraints {
            validate_constraint(&instance, spec)?;
        }
        Ok(instance)
    }
}

fn occupancy_constraint(box_idx: usize, policy: OccupancyPolicy) -> ConstraintSpec {
    let (lb, ub, soft) = match policy {
        OccupancyPolicy::ExactlyOne => (1, Some(1), false),
        OccupancyPolicy::AtLeastOne => (1, None, false),
        OccupancyPolicy::Range { lb, ub } => (lb, Some(ub), false),
        OccupancyPolicy::SoftAtLeastOne => (1, None, true),
    };
    let spec = ConstraintSpec::new(
        format!("box_{box_idx}_occupancy"),
        ConstraintKind::OccupancyBound { box_idx, lb, ub },
    );
    if soft {
        spec.soft()
    } else {
        spec
    }
}

fn flatten(name: &str, table: &Table, n: usize, m: usize) -> Result<Vec<Option<f64>>> {
    if table.len() != n {
        return Err(AssignError::malformed(format!(
            "{name} table has {} rows for {n} objects",
            table.len()
        )));
    }
    let mut flat = Vec::with_capacity(n * m);
    for (i, row) in table.iter().enumerate() {
        if row.len() != m {
            return Err(AssignError::malformed(format!(
                "{name} table row {i} has {} entries for {m} boxes",
                row.len()
            )));
        }
        for (j, value) in row.iter().enumerate() {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(AssignError::malformed(format!(
                    "{name} of object {i} / box {j} is not finite"
                )));
            }
            flat.push(*value);
        }
    }
    Ok(flat)
}

fn validate_constraint(instance: &ProblemInstance, spec: &ConstraintSpec) -> Result<()> {
    match &spec.kind {
        ConstraintKind::AssignmentCardinality { object, .. } => {
            if *object >= instance.num_objects() {
                return Err(AssignError::malformed(format!(
                    "constraint `{}` references object {object} of {}",
                    spec.label,
                    instance.num_objects()
                )));
            }
        }
        ConstraintKind::OccupancyBound { box_idx, .. } => {
            if *box_idx >= instance.num_boxes() {
                return Err(AssignError::malformed(format!(
                    "constraint `{}` references box {box_idx} of {}",
                    spec.label,
                    instance.num_boxes()
                )));
            }
        }
        ConstraintKind::LinearBudget { scope, lb, ub } => {
            if !instance.has_costs() {
                return Err(AssignError::malformed(format!(
                    "budget constraint `{}` needs a cost table",
                    spec.label
                )));
            }
            if lb.is_nan() || ub.is_nan() {
                return Err(AssignError::malformed(format!(
                    "budget constraint `{}` has a NaN bound",
                    spec.label
                )));
            }
            if let BudgetScope::Pairs(pairs) = scope {
                if let Some(v) = pairs.iter().find(|v| !instance.compatible(v.object, v.box_idx)) {
                    return Err(AssignError::malformed(format!(
                        "constraint `{}` references incompatible pair {v}",
                        spec.label
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Wire form of a [`ProblemInstance`]: only what the builder consumes.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct InstanceData {
    objects: Vec<String>,
    boxes: Vec<String>,
    costs: Option<Table>,
    profits: Option<Table>,
    sense: Sense,
    constraints: Vec<ConstraintSpec>,
}

#[cfg(feature = "serde")]
impl InstanceData {
    fn of(instance: &ProblemInstance) -> Self {
        let m = instance.num_boxes();
        let table = |flat: &Option<Vec<Option<f64>>>| -> Option<Table> {
            flat.as_ref()
                .map(|t| t.chunks(m).map(<[Option<f64>]>::to_vec).collect())
        };
        Self {
            objects: instance.objects.clone(),
            boxes: instance.boxes.clone(),
            costs: table(&instance.costs),
            profits: table(&instance.profits),
            sense: instance.sense,
            constraints: instance.constraints.clone(),
        }
    }

    fn build(self) -> Result<ProblemInstance> {
        let mut builder = InstanceBuilder::new()
            .objects(self.objects)
            .boxes(self.boxes)
            .sense(self.sense);
        if let Some(costs) = self.costs {
            builder = builder.costs(costs);
        }
        if let Some(profits) = self.profits {
            builder = builder.profits(profits);
        }
        self.constraints
            .into_iter()
            .fold(builder, InstanceBuilder::constraint)
            .build()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ProblemInstance {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&InstanceData::of(self), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ProblemInstance {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        <InstanceData as serde::Deserialize>::deserialize(deserializer)?
            .build()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::fixtures;
    use crate::instance::Hardness;

    #[test]
    fn test_build_sample_instance() {
        let inst = fixtures::cost_instance(OccupancyPolicy::ExactlyOne);
        assert_eq!(inst.num_objects(), 8);
        assert_eq!(inst.num_boxes(), 3);
        assert_eq!(inst.variables().len(), 20);
        assert!(!inst.compatible(4, 1));
        assert!(!inst.compatible(5, 0));
        assert_eq!(inst.cost(0, 0), Some(10.0));
        assert_eq!(inst.cost(0, 1), Some(20.0));
        assert_eq!(inst.cost(0, 2), Some(15.0));
        assert_eq!(inst.cost(4, 1), None);
        assert_eq!(inst.profit(0, 0), None);
        assert_eq!(inst.constraints().len(), 11);
        assert_eq!(inst.objects()[0], "object 1");
        assert_eq!(inst.boxes()[2], "box 3");
    }

    #[test]
    fn test_row_length_mismatch() {
        let err = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0)]])
            .build()
            .unwrap_err();
        assert!(matches!(err, AssignError::MalformedInstance(_)));
    }

    #[test]
    fn test_labels_must_match_table() {
        let err = InstanceBuilder::new()
            .boxes(["a", "b", "c"])
            .costs(vec![vec![Some(1.0), Some(2.0)]])
            .build()
            .unwrap_err();
        assert!(matches!(err, AssignError::MalformedInstance(_)));
    }

    #[test]
    fn test_mask_disagreement() {
        let err = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0), None]])
            .profits(vec![vec![Some(1.0), Some(2.0)]])
            .build()
            .unwrap_err();
        assert!(matches!(err, AssignError::MalformedInstance(_)));
    }

    #[test]
    fn test_budget_pair_must_be_compatible() {
        let err = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0), None]])
            .constraint(ConstraintSpec::new(
                "pair budget",
                ConstraintKind::LinearBudget {
                    scope: BudgetScope::Pairs(vec![DecisionVar::new(0, 1)]),
                    lb: 0.0,
                    ub: 1.0,
                },
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, AssignError::MalformedInstance(_)));
    }

    #[test]
    fn test_sense_requires_table() {
        let err = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0)]])
            .sense(Sense::MaximizeProfit)
            .build()
            .unwrap_err();
        assert!(matches!(err, AssignError::MalformedInstance(_)));

        let inst = InstanceBuilder::new()
            .profits(vec![vec![Some(4.0)]])
            .build()
            .unwrap();
        assert_eq!(inst.sense(), Sense::MaximizeProfit);
        assert_eq!(inst.objective_coefficient(DecisionVar::new(0, 0)), -4.0);
    }

    #[test]
    fn test_linear_forms() {
        let inst = fixtures::cost_instance(OccupancyPolicy::AtLeastOne);
        let object_4 = &inst.constraints()[4];
        let form = inst.linear_form(object_4);
        assert_eq!(
            form.terms,
            vec![(DecisionVar::new(4, 0), 1.0), (DecisionVar::new(4, 2), 1.0)]
        );
        assert_eq!((form.lb, form.ub), (0.0, 1.0));

        let box_0 = &inst.constraints()[8];
        let form = inst.linear_form(box_0);
        assert_eq!(form.terms.len(), 7);
        assert_eq!(form.lb, 1.0);
        assert!(form.ub.is_infinite());
    }

    #[test]
    fn test_soft_occupancy_policy() {
        let inst = fixtures::cost_instance(OccupancyPolicy::SoftAtLeastOne);
        let soft: Vec<_> = inst
            .constraints()
            .iter()
            .filter(|c| c.hardness == Hardness::Soft)
            .collect();
        assert_eq!(soft.len(), 3);
    }

    #[test]
    fn test_structural_infeasibility_empty_box() {
        let inst = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0), None], vec![Some(2.0), None]])
            .occupancy(OccupancyPolicy::AtLeastOne)
            .build()
            .unwrap();
        let err = inst.check_structural_feasibility().unwrap_err();
        assert!(matches!(err, AssignError::InfeasibleInstance(_)));
        assert!(err.to_string().contains("box_1_occupancy"));
    }

    #[test]
    fn test_structural_feasibility_ok() {
        let inst = fixtures::cost_instance(OccupancyPolicy::ExactlyOne);
        assert!(inst.check_structural_feasibility().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip_rebuilds_instance() {
        let inst = fixtures::global_budget_instance();
        let json = serde_json::to_value(&inst).unwrap();
        let back: ProblemInstance = serde_json::from_value(json).unwrap();
        assert_eq!(back.objects(), inst.objects());
        assert_eq!(back.boxes(), inst.boxes());
        assert_eq!(back.variables(), inst.variables());
        assert_eq!(back.constraints(), inst.constraints());
        assert_eq!(back.sense(), inst.sense());
        assert_eq!(back.cost(4, 2), Some(160.0));
        assert_eq!(back.profit(7, 2), Some(10.0));
        assert!(!back.compatible(0, 1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_malformed_payload() {
        let inst = InstanceBuilder::new()
            .costs(vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0), Some(4.0)]])
            .occupancy(OccupancyPolicy::ExactlyOne)
            .build()
            .unwrap();
        let valid = serde_json::to_value(&inst).unwrap();

        let mut short_row = valid.clone();
        short_row["costs"][1] = serde_json::json!([3.0]);
        let err = serde_json::from_value::<ProblemInstance>(short_row).unwrap_err();
        assert!(err.to_string().contains("malformed instance"), "{err}");

        let mut bad_box = valid;
        bad_box["constraints"][1]["kind"]["OccupancyBound"]["box_idx"] = serde_json::json!(7);
        let err = serde_json::from_value::<ProblemInstance>(bad_box).unwrap_err();
        assert!(err.to_string().contains("references box 7"), "{err}");
    }
}
