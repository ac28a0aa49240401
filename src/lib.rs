//! Constrained object-to-box assignment with interchangeable solvers.
//!
//! An instance places objects into boxes under a compatibility mask,
//! per-pair cost/profit tables, and typed linear constraints. The crate
//! solves the same instance several ways and checks that they agree:
//!
//! - **Instance** ([`instance`]): objects, boxes, tables, and constraints
//!   validated once at build time; one binary decision per compatible pair.
//! - **Evaluation** ([`evaluate`]): feasibility, violations, objective,
//!   and grouping of degenerate optima. Every other module defers to it.
//! - **Enumeration** ([`enumerate`]): exhaustive search over per-object
//!   choices, the exact reference for small instances.
//! - **Linear model** ([`lp`]): the 0/1 linear program behind the instance
//!   and a depth-first branch-and-bound solver for it.
//! - **Penalty encoding** ([`penalty`]): a QUBO whose minima are the
//!   feasible optima, with slack registers for inequality constraints.
//! - **Sampling** ([`sampler`]): exhaustive and simulated-annealing
//!   minimizers for a penalty model.
//! - **Comparison** ([`compare`]): runs any subset of the above and
//!   re-evaluates every result against the instance.
//!
//! # Example
//!
//! ```
//! use u_assign::compare::StrategyComparison;
//! use u_assign::enumerate::EnumeratorConfig;
//! use u_assign::instance::{Cardinality, InstanceBuilder, OccupancyPolicy};
//! use u_assign::sampler::ExhaustiveSampler;
//!
//! let instance = InstanceBuilder::new()
//!     .costs(vec![vec![Some(2.0), Some(5.0)], vec![Some(4.0), Some(1.0)]])
//!     .object_cardinality(Cardinality::ExactlyOne)
//!     .occupancy(OccupancyPolicy::ExactlyOne)
//!     .build()
//!     .unwrap();
//!
//! let report = StrategyComparison::new(&instance)
//!     .with_enumeration(EnumeratorConfig::default())
//!     .with_sampler("exhaustive", ExhaustiveSampler::new())
//!     .run()
//!     .unwrap();
//! assert!(report.agree);
//! ```

pub mod compare;
pub mod enumerate;
pub mod error;
pub mod evaluate;
pub mod instance;
pub mod lp;
pub mod penalty;
pub mod sampler;

pub use error::{AssignError, Result};
