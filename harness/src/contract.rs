//! World contract: the propagation model an [`ArenaTree`](crate::arena::ArenaTree)
//! searches over.
//!
//! Worlds provide domain states, expansion and scoring. Worlds may NOT
//! navigate the tree, record solutions, or enforce budgets: those are
//! driver and goal concerns.

use canopy_search::contract::TechniqueChange;
use canopy_search::error::PropagationFailure;
use canopy_search::goal::Goal;

/// Result of committing to a state.
#[derive(Debug)]
pub struct ExpansionV1<S> {
    /// Child states in branching order. Empty for a leaf.
    pub children: Vec<S>,
    /// Requested technique change for the subtree below this state.
    pub change: Option<TechniqueChange>,
}

impl<S> ExpansionV1<S> {
    /// Expansion with no children and no change.
    #[must_use]
    pub fn leaf() -> Self {
        Self {
            children: Vec::new(),
            change: None,
        }
    }

    #[must_use]
    pub fn branch(children: Vec<S>) -> Self {
        Self {
            children,
            change: None,
        }
    }

    #[must_use]
    pub fn with_change(mut self, change: TechniqueChange) -> Self {
        self.change = Some(change);
        self
    }
}

/// The contract a world must implement to be searched by the harness.
///
/// # Contract
///
/// - `expand` must be deterministic: same `(state, depth)` and same goal
///   bound → same children in the same order.
/// - `expand` reports inconsistency as [`PropagationFailure`]; the state is
///   then pruned and never expanded again.
/// - `root_state` is expanded like any other state.
pub trait SearchWorldV1 {
    type State: Clone + std::fmt::Debug;

    /// Unique world identifier (e.g., `"queens"`).
    fn world_id(&self) -> &str;

    fn root_state(&self) -> Self::State;

    /// Commit to `state` at `depth`: propagate and branch.
    ///
    /// `goal` is the goal active at the time of activation; worlds may read
    /// its [`Goal::objective_bound`] to cut branches that cannot improve.
    ///
    /// # Errors
    ///
    /// Returns [`PropagationFailure`] when `state` is inconsistent.
    fn expand(
        &self,
        state: &Self::State,
        depth: usize,
        goal: Option<&dyn Goal>,
    ) -> Result<ExpansionV1<Self::State>, PropagationFailure>;

    /// Objective value at `state`, if the world defines one.
    fn objective(&self, _state: &Self::State) -> Option<i64> {
        None
    }

    /// JSON description of `state` for reports.
    fn describe(&self, state: &Self::State) -> serde_json::Value;
}
