//! Shared test instances.

use super::{Cardinality, InstanceBuilder, OccupancyPolicy, ProblemInstance, Sense, Table};

/// 8 objects x 3 boxes cost table; object 5 cannot use box 2, object 6
/// cannot use box 1, and so on (1-based in prose, 0-based here).
pub fn cost_table() -> Table {
    vec![
        vec![Some(10.0), Some(20.0), Some(15.0)],
        vec![Some(25.0), Some(30.0), Some(5.0)],
        vec![Some(8.0), Some(22.0), Some(17.0)],
        vec![Some(30.0), Some(18.0), Some(10.0)],
        vec![Some(12.0), None, Some(16.0)],
        vec![None, Some(14.0), Some(22.0)],
        vec![Some(20.0), None, Some(18.0)],
        vec![Some(9.0), Some(21.0), None],
    ]
}

pub fn profit_table() -> Table {
    vec![
        vec![Some(10.0), Some(15.0), Some(12.0)],
        vec![Some(18.0), Some(20.0), Some(7.0)],
        vec![Some(6.0), Some(18.0), Some(12.0)],
        vec![Some(25.0), Some(10.0), Some(8.0)],
        vec![Some(8.0), None, Some(14.0)],
        vec![None, Some(9.0), Some(18.0)],
        vec![Some(15.0), None, Some(14.0)],
        vec![Some(7.0), Some(16.0), None],
    ]
}

/// Cost minimization, at most one box per object, `policy` per box.
pub fn cost_instance(policy: OccupancyPolicy) -> ProblemInstance {
    InstanceBuilder::new()
        .costs(cost_table())
        .object_cardinality(Cardinality::AtMostOne)
        .occupancy(policy)
        .build()
        .expect("fixture instance is well-formed")
}

/// Every object placed, every box used, total cost within `[0, 100]`;
/// 23 feasible assignments.
pub fn budget_window_instance() -> ProblemInstance {
    InstanceBuilder::new()
        .costs(cost_table())
        .profits(profit_table())
        .sense(Sense::MaximizeProfit)
        .object_cardinality(Cardinality::ExactlyOne)
        .occupancy(OccupancyPolicy::AtLeastOne)
        .budget(0.0, 100.0)
        .build()
        .expect("fixture instance is well-formed")
}

/// Profit maximization under a global budget of 500; 12 feasible
/// assignments, three of which tie at the optimal profit of 22.
pub fn global_budget_instance() -> ProblemInstance {
    let costs = vec![
        vec![Some(300.0), None, None],
        vec![Some(120.0), Some(120.0), None],
        vec![Some(140.0), Some(140.0), Some(140.0)],
        vec![None, Some(150.0), None],
        vec![None, Some(160.0), Some(160.0)],
        vec![None, None, Some(150.0)],
        vec![None, Some(300.0), None],
        vec![None, None, Some(300.0)],
    ];
    let profits = vec![
        vec![Some(10.0), None, None],
        vec![Some(6.0), Some(6.0), None],
        vec![Some(4.0), Some(4.0), Some(4.0)],
        vec![None, Some(8.0), None],
        vec![None, Some(8.0), Some(8.0)],
        vec![None, None, Some(8.0)],
        vec![None, Some(10.0), None],
        vec![None, None, Some(10.0)],
    ];
    InstanceBuilder::new()
        .objects(["V1", "V2", "V3", "I1", "I2", "I3", "I12", "I23"])
        .boxes(["SV", "V", "I"])
        .costs(costs)
        .profits(profits)
        .sense(Sense::MaximizeProfit)
        .object_cardinality(Cardinality::AtMostOne)
        .occupancy(OccupancyPolicy::AtLeastOne)
        .budget(0.0, 500.0)
        .build()
        .expect("fixture instance is well-formed")
}

/// 4 objects x 3 boxes, every object placed once, every box used; the
/// unique optimum costs 15. Small enough for exhaustive QUBO sampling.
pub fn small_instance() -> ProblemInstance {
    InstanceBuilder::new()
        .costs(vec![
            vec![Some(4.0), Some(9.0), Some(7.0)],
            vec![Some(6.0), Some(3.0), Some(8.0)],
            vec![Some(5.0), Some(8.0), Some(2.0)],
            vec![Some(7.0), Some(6.0), Some(9.0)],
        ])
        .object_cardinality(Cardinality::ExactlyOne)
        .occupancy(OccupancyPolicy::AtLeastOne)
        .build()
        .expect("fixture instance is well-formed")
}

/// Installs a test logger once; repeated calls are no-ops.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
