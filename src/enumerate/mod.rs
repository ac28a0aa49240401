//! Exhaustive ground-truth enumeration.
//!
//! [`ExactEnumerator`] walks the full candidate space of a small instance
//! and yields exactly its feasible assignments. It is the authority for
//! telling true infeasibility apart from a heuristic solver failing to find
//! a solution.
//!
//! The candidate space is indexed, so it can be split into independent
//! shards ([`ExactEnumerator::shard`]) and, with the `parallel` feature,
//! walked on the rayon pool.

mod config;
mod runner;

pub use config::EnumeratorConfig;
pub use runner::{ExactEnumerator, FeasibleAssignments};
