//! Limits: resource budgets polled once per visited node.
//!
//! A limit is initialized lazily against the first node it sees after being
//! installed, and from then on answers `is_ok_to_continue` for every node
//! the driver is about to activate.

use std::fmt;
use std::time::{Duration, Instant};

use crate::contract::{NodeId, SearchTree};

/// A budget that may stop the search early.
pub trait Limit: fmt::Debug {
    fn init(&mut self, tree: &dyn SearchTree, node: NodeId);

    fn is_ok_to_continue(&mut self, tree: &dyn SearchTree, node: NodeId) -> bool;

    fn box_clone(&self) -> Box<dyn Limit>;
}

impl Clone for Box<dyn Limit> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Allows at most `max_nodes` visited nodes after initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLimit {
    max_nodes: u64,
    visited: u64,
}

impl NodeLimit {
    #[must_use]
    pub fn new(max_nodes: u64) -> Self {
        Self {
            max_nodes,
            visited: 0,
        }
    }

    /// Nodes allowed through so far.
    #[must_use]
    pub fn visited(&self) -> u64 {
        self.visited
    }
}

impl Limit for NodeLimit {
    fn init(&mut self, _tree: &dyn SearchTree, _node: NodeId) {
        self.visited = 0;
    }

    fn is_ok_to_continue(&mut self, _tree: &dyn SearchTree, _node: NodeId) -> bool {
        if self.visited >= self.max_nodes {
            return false;
        }
        self.visited += 1;
        true
    }

    fn box_clone(&self) -> Box<dyn Limit> {
        Box::new(self.clone())
    }
}

/// Wall-clock budget measured from initialization.
///
/// Uninitialized clones start their own clock on `init`.
#[derive(Debug, Clone)]
pub struct TimeLimit {
    budget: Duration,
    started: Option<Instant>,
}

impl TimeLimit {
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            started: None,
        }
    }
}

impl Limit for TimeLimit {
    fn init(&mut self, _tree: &dyn SearchTree, _node: NodeId) {
        self.started = Some(Instant::now());
    }

    fn is_ok_to_continue(&mut self, _tree: &dyn SearchTree, _node: NodeId) -> bool {
        match self.started {
            Some(started) => started.elapsed() < self.budget,
            None => true,
        }
    }

    fn box_clone(&self) -> Box<dyn Limit> {
        Box::new(self.clone())
    }
}

/// Continues only while every member continues.
#[derive(Debug, Clone, Default)]
pub struct CompositeLimit {
    limits: Vec<Box<dyn Limit>>,
}

impl CompositeLimit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, limit: impl Limit + 'static) -> Self {
        self.limits.push(Box::new(limit));
        self
    }

    pub fn push(&mut self, limit: Box<dyn Limit>) {
        self.limits.push(limit);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.limits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

impl Limit for CompositeLimit {
    fn init(&mut self, tree: &dyn SearchTree, node: NodeId) {
        for limit in &mut self.limits {
            limit.init(tree, node);
        }
    }

    fn is_ok_to_continue(&mut self, tree: &dyn SearchTree, node: NodeId) -> bool {
        self.limits
            .iter_mut()
            .all(|limit| limit.is_ok_to_continue(tree, node))
    }

    fn box_clone(&self) -> Box<dyn Limit> {
        Box::new(self.clone())
    }
}
