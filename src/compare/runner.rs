//! Runs several strategies on one instance and cross-checks them.

use super::types::{ComparisonReport, StrategyKind, StrategyOutcome};
use crate::enumerate::{EnumeratorConfig, ExactEnumerator};
use crate::error::Result;
use crate::evaluate::{ScoredCandidate, SolutionEvaluator, DEFAULT_VALUE_TOLERANCE};
use crate::instance::ProblemInstance;
use crate::lp::{LinearProgram, LpSolver, LpStatus};
use crate::penalty::{PenaltyConfig, PenaltyModelBuilder, QuboModel};
use crate::sampler::QuboSampler;
use log::{info, warn};

/// Runs any subset of {exhaustive enumeration, an LP solver, QUBO
/// samplers} over one instance and evaluates every result with the same
/// [`SolutionEvaluator`].
///
/// The penalty model is built once and shared by every registered sampler.
///
/// # Examples
///
/// ```
/// use u_assign::compare::StrategyComparison;
/// use u_assign::enumerate::EnumeratorConfig;
/// use u_assign::instance::{Cardinality, InstanceBuilder, OccupancyPolicy};
/// use u_assign::lp::BinaryBranchAndBound;
///
/// let instance = InstanceBuilder::new()
///     .costs(vec![vec![Some(2.0), Some(5.0)], vec![Some(4.0), Some(1.0)]])
///     .object_cardinality(Cardinality::ExactlyOne)
///     .occupancy(OccupancyPolicy::ExactlyOne)
///     .build()
///     .unwrap();
///
/// let report = StrategyComparison::new(&instance)
///     .with_enumeration(EnumeratorConfig::default())
///     .with_lp_solver(BinaryBranchAndBound::new())
///     .run()
///     .unwrap();
/// assert!(report.agree);
/// assert_eq!(report.best_score, Some(3.0));
/// ```
pub struct StrategyComparison<'a> {
    instance: &'a ProblemInstance,
    evaluator: SolutionEvaluator<'a>,
    tolerance: f64,
    enumeration: Option<EnumeratorConfig>,
    lp: Option<Box<dyn LpSolver + 'a>>,
    penalty: PenaltyConfig,
    samplers: Vec<(String, Box<dyn QuboSampler + 'a>)>,
}

impl<'a> StrategyComparison<'a> {
    pub fn new(instance: &'a ProblemInstance) -> Self {
        Self {
            instance,
            evaluator: SolutionEvaluator::new(instance),
            tolerance: DEFAULT_VALUE_TOLERANCE,
            enumeration: None,
            lp: None,
            penalty: PenaltyConfig::default(),
            samplers: Vec::new(),
        }
    }

    /// Tolerance for equal objective values and energies.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_enumeration(mut self, config: EnumeratorConfig) -> Self {
        self.enumeration = Some(config);
        self
    }

    pub fn with_lp_solver(mut self, solver: impl LpSolver + 'a) -> Self {
        self.lp = Some(Box::new(solver));
        self
    }

    /// Penalty configuration for the model handed to samplers.
    pub fn with_penalty_config(mut self, config: PenaltyConfig) -> Self {
        self.penalty = config;
        self
    }

    pub fn with_sampler(mut self, name: impl Into<String>, sampler: impl QuboSampler + 'a) -> Self {
        self.samplers.push((name.into(), Box::new(sampler)));
        self
    }

    /// Runs every registered strategy in registration order: enumeration,
    /// then the LP solver, then samplers.
    ///
    /// Errors from enumeration (including a proof of infeasibility) and
    /// from penalty encoding are returned as-is.
    pub fn run(&self) -> Result<ComparisonReport> {
        let mut outcomes = Vec::new();
        if let Some(config) = &self.enumeration {
            outcomes.push(self.run_enumeration(config)?);
        }
        if let Some(solver) = &self.lp {
            outcomes.push(self.run_lp(solver.as_ref()));
        }
        if !self.samplers.is_empty() {
            let model = PenaltyModelBuilder::new(self.instance, self.penalty.clone()).build()?;
            for (name, sampler) in &self.samplers {
                outcomes.push(self.run_sampler(name, sampler.as_ref(), &model)?);
            }
        }
        Ok(self.summarize(outcomes))
    }

    fn run_enumeration(&self, config: &EnumeratorConfig) -> Result<StrategyOutcome> {
        let optima = ExactEnumerator::new(self.instance, config.clone())?.optimal()?;
        let mut outcome = StrategyOutcome::new(StrategyKind::Enumeration);
        outcome.best = optima.feasible.first().cloned();
        outcome.report = outcome.best.as_ref().map(|c| self.evaluator.evaluate(c));
        outcome.optima = Some(optima);
        Ok(outcome)
    }

    fn run_lp(&self, solver: &dyn LpSolver) -> StrategyOutcome {
        let solution = solver.solve(&LinearProgram::from_instance(self.instance));
        let mut outcome = StrategyOutcome::new(StrategyKind::LinearProgram);
        outcome.lp_status = Some(solution.status);
        if !solution.values.is_empty() {
            let candidate = solution.to_candidate();
            let report = self.evaluator.evaluate(&candidate);
            if solution.status == LpStatus::Optimal && !report.feasible {
                warn!(
                    "LP solver reported an optimum that violates {:?}",
                    report.violated_labels()
                );
            }
            outcome.best = Some(candidate);
            outcome.report = Some(report);
        }
        outcome
    }

    fn run_sampler(
        &self,
        name: &str,
        sampler: &dyn QuboSampler,
        model: &QuboModel,
    ) -> Result<StrategyOutcome> {
        let set = sampler.sample(model)?;
        let decoded = set.decode(model);
        let mut outcome = StrategyOutcome::new(StrategyKind::Sampler(name.to_string()));
        outcome.lowest_energy = set.lowest().map(|s| s.energy);

        let lowest = self.evaluator.degenerate_optima(&decoded, self.tolerance);
        if let Some(group) = &lowest {
            if group.feasible.is_empty() {
                warn!(
                    "every lowest-energy sample of `{name}` is infeasible ({} distinct); \
                     penalty coefficients may be too small",
                    group.infeasible
                );
            }
        }
        outcome.optima = lowest;

        let rescored: Vec<ScoredCandidate> = decoded
            .into_iter()
            .map(|s| {
                let score = self.evaluator.evaluate(&s.assignment).score;
                ScoredCandidate::new(s.assignment, score)
            })
            .collect();
        if let Some(group) = self.evaluator.feasible_optima(&rescored, self.tolerance) {
            outcome.best = group.feasible.first().cloned();
        }
        outcome.report = outcome.best.as_ref().map(|c| self.evaluator.evaluate(c));
        Ok(outcome)
    }

    fn summarize(&self, outcomes: Vec<StrategyOutcome>) -> ComparisonReport {
        let best_score = outcomes
            .iter()
            .filter_map(StrategyOutcome::feasible_score)
            .min_by(f64::total_cmp);
        let agree = best_score.is_some_and(|best| {
            outcomes
                .iter()
                .filter_map(StrategyOutcome::feasible_score)
                .all(|s| (s - best).abs() <= self.tolerance)
        });
        let all_feasible = outcomes.iter().all(|o| o.feasible_score().is_some());

        for o in &outcomes {
            match o.feasible_score() {
                Some(score) => info!("{}: feasible, score {score}", o.strategy),
                None => info!("{}: no feasible result", o.strategy),
            }
        }
        if best_score.is_some() && !agree {
            warn!("strategies disagree on the optimum; best score {best_score:?}");
        }

        ComparisonReport {
            outcomes,
            best_score,
            agree,
            all_feasible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::fixtures;
    use crate::lp::BinaryBranchAndBound;
    use crate::penalty::LambdaPolicy;
    use crate::sampler::{AnnealConfig, AnnealingSampler, ExhaustiveSampler};

    #[test]
    fn test_all_strategies_agree_on_small_instance() {
        fixtures::init_logger();
        let inst = fixtures::small_instance();
        let report = StrategyComparison::new(&inst)
            .with_enumeration(EnumeratorConfig::default())
            .with_lp_solver(BinaryBranchAndBound::new())
            .with_sampler("exhaustive", ExhaustiveSampler::new())
            .run()
            .unwrap();
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.agree);
        assert!(report.all_feasible);
        assert_eq!(report.best_score, Some(15.0));

        let sampler = report
            .outcome(&StrategyKind::Sampler("exhaustive".into()))
            .unwrap();
        assert_eq!(sampler.lowest_energy, Some(15.0));
        let lowest = sampler.optima.as_ref().unwrap();
        assert_eq!(lowest.feasible.len(), 1);
        assert_eq!(lowest.infeasible, 0);
        assert_eq!(
            report.outcome(&StrategyKind::LinearProgram).unwrap().lp_status,
            Some(LpStatus::Optimal)
        );
    }

    #[test]
    fn test_degenerate_profit_optimum() {
        let inst = fixtures::global_budget_instance();
        let report = StrategyComparison::new(&inst)
            .with_enumeration(EnumeratorConfig::default())
            .with_lp_solver(BinaryBranchAndBound::new())
            .run()
            .unwrap();
        assert!(report.agree);
        assert_eq!(report.best_score, Some(-22.0));

        let exact = report.outcome(&StrategyKind::Enumeration).unwrap();
        let optima = exact.optima.as_ref().unwrap();
        assert!(optima.is_degenerate());
        assert_eq!(optima.feasible.len(), 3);

        let lp = report.outcome(&StrategyKind::LinearProgram).unwrap();
        let lp_best = lp.best.as_ref().unwrap();
        assert!(optima.feasible.contains(lp_best));
        assert_eq!(lp.report.as_ref().unwrap().objective, 22.0);
    }

    #[test]
    fn test_small_lambda_surfaces_infeasible_ground_state() {
        let inst = fixtures::small_instance();
        let report = StrategyComparison::new(&inst)
            .with_penalty_config(PenaltyConfig::default().with_lambda(LambdaPolicy::Fixed(0.5)))
            .with_sampler("exhaustive", ExhaustiveSampler::new())
            .run()
            .unwrap();
        let sampler = &report.outcomes[0];
        // nothing placed, every slack register full
        assert_eq!(sampler.lowest_energy, Some(3.5));
        let lowest = sampler.optima.as_ref().unwrap();
        assert!(lowest.feasible.is_empty());
        assert_eq!(lowest.infeasible, 1);
    }

    #[test]
    fn test_annealer_result_is_reevaluated() {
        let inst = fixtures::small_instance();
        let config = AnnealConfig::default().with_num_reads(20).with_seed(17);
        let report = StrategyComparison::new(&inst)
            .with_enumeration(EnumeratorConfig::default())
            .with_sampler("anneal", AnnealingSampler::new(config))
            .run()
            .unwrap();
        let anneal = report.outcome(&StrategyKind::Sampler("anneal".into())).unwrap();
        if let Some(r) = &anneal.report {
            assert!(r.feasible);
            assert!(r.score >= 15.0);
        }
        assert_eq!(report.best_score, Some(15.0));
    }

    #[test]
    fn test_infeasible_instance_is_an_error() {
        let inst = crate::instance::InstanceBuilder::new()
            .costs(vec![vec![Some(1.0), Some(1.0)]])
            .object_cardinality(crate::instance::Cardinality::AtMostOne)
            .occupancy(crate::instance::OccupancyPolicy::ExactlyOne)
            .build()
            .unwrap();
        let err = StrategyComparison::new(&inst)
            .with_enumeration(EnumeratorConfig::default())
            .run()
            .unwrap_err();
        assert!(matches!(err, crate::error::AssignError::InfeasibleInstance(_)));
    }

    #[test]
    fn test_empty_comparison() {
        let inst = fixtures::small_instance();
        let report = StrategyComparison::new(&inst).run().unwrap();
        assert!(report.outcomes.is_empty());
        assert!(!report.agree);
        assert_eq!(report.best_score, None);
    }
}
