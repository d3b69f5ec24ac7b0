//! Arena-backed [`SearchTree`] over a [`SearchWorldV1`].
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]; ids are never
//! reused. Children are materialized when their parent is activated.
//!
//! # Exhaustion
//!
//! A node is exhausted once it is pruned, or once it is activated and every
//! child is exhausted. The flag is propagated upward eagerly, so
//! `next_open_child` is a scan over the parent's child list.

use canopy_search::contract::{NodeId, NodeRef, RootAction, SearchTree, TechniqueChange};
use canopy_search::error::PropagationFailure;
use canopy_search::goal::Goal;
use tracing::trace;

use crate::contract::SearchWorldV1;

#[derive(Debug)]
struct ArenaNode<S> {
    state: S,
    parent: Option<NodeId>,
    /// Index among the parent's children.
    index: usize,
    depth: usize,
    children: Vec<NodeId>,
    activated: bool,
    pruned: bool,
    exhausted: bool,
}

impl<S> ArenaNode<S> {
    fn new(state: S, parent: Option<NodeId>, index: usize, depth: usize) -> Self {
        Self {
            state,
            parent,
            index,
            depth,
            children: Vec::new(),
            activated: false,
            pruned: false,
            exhausted: false,
        }
    }
}

/// Search tree that materializes world states on demand.
#[derive(Debug)]
pub struct ArenaTree<W: SearchWorldV1> {
    world: W,
    nodes: Vec<ArenaNode<W::State>>,
    current: NodeId,
}

impl<W: SearchWorldV1> ArenaTree<W> {
    /// Tree holding only the world's root state, positioned at the root.
    pub fn new(world: W) -> Self {
        let root = ArenaNode::new(world.root_state(), None, 0, 0);
        Self {
            world,
            nodes: vec![root],
            current: NodeId(0),
        }
    }

    #[must_use]
    pub fn world(&self) -> &W {
        &self.world
    }

    #[must_use]
    pub fn into_world(self) -> W {
        self.world
    }

    /// State stored at `node`.
    #[must_use]
    pub fn state(&self, node: NodeId) -> &W::State {
        &self.nodes[node.0].state
    }

    /// Number of materialized nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_exhausted(&self, node: NodeId) -> bool {
        self.nodes[node.0].exhausted
    }

    /// Describe the state at `node` through the world.
    #[must_use]
    pub fn describe(&self, node: NodeId) -> serde_json::Value {
        self.world.describe(self.state(node))
    }

    fn expandable(&self, node: NodeId) -> Option<&[NodeId]> {
        let entry = &self.nodes[node.0];
        (entry.activated && !entry.pruned).then_some(entry.children.as_slice())
    }

    /// Mark `node` exhausted and walk upward while parents become exhausted.
    fn mark_exhausted(&mut self, node: NodeId) {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            self.nodes[id.0].exhausted = true;
            cursor = self.nodes[id.0].parent.filter(|parent| {
                let entry = &self.nodes[parent.0];
                entry.activated
                    && !entry.exhausted
                    && entry.children.iter().all(|c| self.nodes[c.0].exhausted)
            });
        }
    }
}

impl<W: SearchWorldV1> SearchTree for ArenaTree<W> {
    fn current_node(&self) -> NodeId {
        self.current
    }

    fn move_to_parent(&mut self) -> NodeId {
        if let Some(parent) = self.nodes[self.current.0].parent {
            self.current = parent;
        }
        self.current
    }

    fn move_to_child(&mut self, child: usize) -> NodeId {
        self.current = self.nodes[self.current.0].children[child];
        self.current
    }

    fn return_to_reference(&mut self, reference: &NodeRef) {
        let mut id = NodeId(0);
        for &index in reference.path() {
            match self.nodes[id.0].children.get(index) {
                Some(child) => id = *child,
                None => break,
            }
        }
        self.current = id;
    }

    fn reference_for_node(&self, node: NodeId) -> NodeRef {
        let mut path = Vec::with_capacity(self.nodes[node.0].depth);
        let mut id = node;
        while let Some(parent) = self.nodes[id.0].parent {
            path.push(self.nodes[id.0].index);
            id = parent;
        }
        path.reverse();
        NodeRef::from_path(path)
    }

    fn is_closed(&self, node: NodeId) -> bool {
        let entry = &self.nodes[node.0];
        entry.activated || entry.pruned
    }

    fn next_open_child(&self, node: NodeId) -> Option<usize> {
        self.expandable(node)?
            .iter()
            .position(|c| !self.nodes[c.0].exhausted)
    }

    fn last_open_child(&self, node: NodeId) -> Option<usize> {
        self.expandable(node)?
            .iter()
            .rposition(|c| !self.nodes[c.0].exhausted)
    }

    fn child_number_within_parent(&self, node: NodeId) -> Option<usize> {
        let entry = &self.nodes[node.0];
        entry.parent.map(|_| entry.index)
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.nodes[node.0].children.len()
    }

    fn depth(&self, node: NodeId) -> usize {
        self.nodes[node.0].depth
    }

    fn activate(
        &mut self,
        node: NodeId,
        goal: Option<&dyn Goal>,
    ) -> Result<Option<TechniqueChange>, PropagationFailure> {
        let depth = self.nodes[node.0].depth;
        let expansion = self.world.expand(&self.nodes[node.0].state, depth, goal)?;

        let first = self.nodes.len();
        let children: Vec<NodeId> = (0..expansion.children.len())
            .map(|offset| NodeId(first + offset))
            .collect();
        for (index, state) in expansion.children.into_iter().enumerate() {
            self.nodes
                .push(ArenaNode::new(state, Some(node), index, depth + 1));
        }
        trace!(depth, children = children.len(), "materialized children");

        let entry = &mut self.nodes[node.0];
        entry.activated = true;
        entry.children = children;
        if entry.children.is_empty() {
            self.mark_exhausted(node);
        }
        Ok(expansion.change)
    }

    fn prune(&mut self, node: NodeId) {
        self.nodes[node.0].pruned = true;
        self.mark_exhausted(node);
    }

    fn objective(&self, node: NodeId) -> Option<i64> {
        self.world.objective(&self.nodes[node.0].state)
    }
}

/// Root action materializing an [`ArenaTree`] from a world.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArenaRoot;

impl<W: SearchWorldV1> RootAction<W> for ArenaRoot {
    type Tree = ArenaTree<W>;

    fn materialize(self, world: W) -> ArenaTree<W> {
        ArenaTree::new(world)
    }
}
