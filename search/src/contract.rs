//! Collaborator contracts: the tree the driver navigates and the descriptor
//! a node returns when it wants a different technique below it.
//!
//! The driver never owns node storage. It holds a [`SearchTree`] and talks to
//! nodes through stable [`NodeId`] handles, so the tree is free to store nodes
//! in an arena and recompute their state however it likes.

use crate::error::PropagationFailure;
use crate::goal::Goal;
use crate::limit::Limit;
use crate::technique::Technique;

/// Stable handle to a node inside a tree's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Repositioning handle for a previously visited node.
///
/// A reference is the path of child indices from the true root. It stays
/// valid across any amount of intervening navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeRef {
    path: Vec<usize>,
}

impl NodeRef {
    /// Reference to the true root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_path(path: Vec<usize>) -> Self {
        Self { path }
    }

    /// Child indices from the root, outermost first.
    #[must_use]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    #[must_use]
    pub fn into_path(self) -> Vec<usize> {
        self.path
    }

    /// Depth of the referenced node (root = 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Reference to child `index` of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(index);
        Self { path }
    }
}

/// The search tree as seen by the driver and by techniques.
///
/// # Contract
///
/// - Navigation (`move_to_parent`, `move_to_child`, `return_to_reference`)
///   deterministically updates the current node; the first two return it.
/// - A node is *closed* once it has been activated or pruned.
/// - An *open child* is a child whose subtree is neither pruned nor fully
///   exhausted. `next_open_child` returns the lowest such index and
///   `last_open_child` the highest.
/// - `child_count` is meaningful once a node has been activated.
/// - Query methods never change the current position.
pub trait SearchTree {
    fn current_node(&self) -> NodeId;

    /// Move to the parent of the current node and return it.
    fn move_to_parent(&mut self) -> NodeId;

    /// Move to child `child` of the current node and return it.
    fn move_to_child(&mut self, child: usize) -> NodeId;

    fn return_to_reference(&mut self, reference: &NodeRef);

    fn reference_for_node(&self, node: NodeId) -> NodeRef;

    fn is_closed(&self, node: NodeId) -> bool;

    fn next_open_child(&self, node: NodeId) -> Option<usize>;

    fn last_open_child(&self, node: NodeId) -> Option<usize>;

    /// Index of `node` among its parent's children (`None` for the root).
    fn child_number_within_parent(&self, node: NodeId) -> Option<usize>;

    fn child_count(&self, node: NodeId) -> usize;

    fn depth(&self, node: NodeId) -> usize;

    /// Commit to `node`: run propagation and materialize its children.
    ///
    /// # Errors
    ///
    /// Returns [`PropagationFailure`] when committing to the node is
    /// inconsistent. The driver prunes the node and carries on.
    fn activate(
        &mut self,
        node: NodeId,
        goal: Option<&dyn Goal>,
    ) -> Result<Option<TechniqueChange>, PropagationFailure>;

    /// Remove `node` and its subtree from further consideration.
    fn prune(&mut self, node: NodeId);

    /// Objective value of the model at `node`, if the model defines one.
    fn objective(&self, _node: NodeId) -> Option<i64> {
        None
    }
}

/// Materializes the initial tree from a propagation-capable store.
pub trait RootAction<S> {
    type Tree: SearchTree;

    fn materialize(self, store: S) -> Self::Tree;
}

/// Request, returned by node activation, to search the node's subtree with
/// a different technique, goal or limit.
///
/// Every field is independent: `None` keeps the value currently active.
#[derive(Debug, Default)]
pub struct TechniqueChange {
    pub technique: Option<Box<dyn Technique>>,
    pub goal: Option<Box<dyn Goal>>,
    pub limit: Option<Box<dyn Limit>>,
}

impl TechniqueChange {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_technique(mut self, technique: impl Technique + 'static) -> Self {
        self.technique = Some(Box::new(technique));
        self
    }

    #[must_use]
    pub fn with_goal(mut self, goal: impl Goal + 'static) -> Self {
        self.goal = Some(Box::new(goal));
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: impl Limit + 'static) -> Self {
        self.limit = Some(Box::new(limit));
        self
    }

    /// True when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.technique.is_none() && self.goal.is_none() && self.limit.is_none()
    }
}
