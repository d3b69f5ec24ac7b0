//! Canopy Search: search control for a propagation-based constraint solver.
//!
//! This crate decides where in the search tree to go next, when to commit
//! to a node, and when a leaf counts as a solution. It depends only on
//! `canopy_kernel` (canonical hashing for traces); it does NOT depend on
//! `canopy_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! canopy_kernel  ←  canopy_search  ←  canopy_harness
//! (canon, hash)     (driver, goals)    (trees, worlds, runner)
//! ```
//!
//! # Key types
//!
//! - [`Search`]: the driver (`next_solution`, suspension stack, replay)
//! - [`SearchTree`]: the navigable tree the driver operates on
//! - [`Technique`] / [`Move`]: tree-walking strategies and their steps
//! - [`Goal`]: accepts or rejects leaves, records solution references
//! - [`Limit`]: budget polled once per visited node
//! - [`TechniqueChange`]: per-subtree switch of technique, goal or limit
//! - [`SearchConfig`]: serde-loadable driver configuration
//! - [`SearchTraceV1`]: ordered event log with a canonical digest

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod error;
pub mod goal;
pub mod limit;
pub mod moves;
pub mod policy;
pub mod search;
pub mod technique;
pub mod trace;


pub use contract::{NodeId, NodeRef, RootAction, SearchTree, TechniqueChange};
pub use error::{PropagationFailure, SearchError};
pub use goal::{AllSolutionsGoal, Bound, Direction, FirstSolutionGoal, Goal, OptimizeGoal, ThresholdGoal};
pub use limit::{CompositeLimit, Limit, NodeLimit, TimeLimit};
pub use moves::Move;
pub use policy::{SearchConfig, TechniqueChoice};
pub use search::{Search, SearchStats, SearchStatus};
pub use technique::{DepthFirstSearch, ReverseDepthFirstSearch, Technique, TechniqueKind};
pub use trace::{PruneReasonV1, SearchEventV1, SearchTraceV1};
