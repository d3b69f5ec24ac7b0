//! Goals: accept, record and rank the solutions a search runs into.
//!
//! The driver consults the active goal twice per visited node: before
//! activation (`is_ok_to_activate`) and, at leaves, after activation
//! (`solution_found`). Goals record the references of accepted solutions so
//! the driver can replay them later.

use std::fmt;

use crate::contract::{NodeId, NodeRef, SearchTree};

/// Objective constraint a goal wants future solutions to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Solutions must have an objective strictly below the value.
    Below(i64),
    /// Solutions must have an objective strictly above the value.
    Above(i64),
}

impl Bound {
    #[must_use]
    pub fn admits(self, value: i64) -> bool {
        match self {
            Self::Below(limit) => value < limit,
            Self::Above(limit) => value > limit,
        }
    }
}

/// Solution acceptance and ranking policy.
pub trait Goal: fmt::Debug {
    /// Fast-reject hook, asked before activating `node`.
    ///
    /// Returning `false` makes the driver prune `node` without activating it.
    fn is_ok_to_activate(&self, _tree: &dyn SearchTree, _node: NodeId) -> bool {
        true
    }

    /// Judge the leaf the tree is currently positioned at.
    ///
    /// `reference` points at that leaf. Accepted solutions are recorded by
    /// the goal itself.
    fn solution_found(&mut self, tree: &dyn SearchTree, reference: NodeRef) -> bool;

    fn solution_reference_count(&self) -> usize;

    fn solution_reference(&self, index: usize) -> Option<&NodeRef>;

    /// Bound that activation may use to cut branches that cannot improve.
    fn objective_bound(&self) -> Option<Bound> {
        None
    }
}

/// Accepts every leaf.
#[derive(Debug, Clone, Default)]
pub struct AllSolutionsGoal {
    solutions: Vec<NodeRef>,
}

impl AllSolutionsGoal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Goal for AllSolutionsGoal {
    fn solution_found(&mut self, _tree: &dyn SearchTree, reference: NodeRef) -> bool {
        self.solutions.push(reference);
        true
    }

    fn solution_reference_count(&self) -> usize {
        self.solutions.len()
    }

    fn solution_reference(&self, index: usize) -> Option<&NodeRef> {
        self.solutions.get(index)
    }
}

/// Accepts the first leaf, then refuses to activate anything else.
///
/// Once a solution is held, every node the search reaches is pruned by the
/// fast-reject hook, so the remaining tree unwinds without propagation.
#[derive(Debug, Clone, Default)]
pub struct FirstSolutionGoal {
    solution: Option<NodeRef>,
}

impl FirstSolutionGoal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Goal for FirstSolutionGoal {
    fn is_ok_to_activate(&self, _tree: &dyn SearchTree, _node: NodeId) -> bool {
        self.solution.is_none()
    }

    fn solution_found(&mut self, _tree: &dyn SearchTree, reference: NodeRef) -> bool {
        if self.solution.is_some() {
            return false;
        }
        self.solution = Some(reference);
        true
    }

    fn solution_reference_count(&self) -> usize {
        usize::from(self.solution.is_some())
    }

    fn solution_reference(&self, index: usize) -> Option<&NodeRef> {
        if index == 0 {
            self.solution.as_ref()
        } else {
            None
        }
    }
}

/// Accepts leaves whose objective is at least `minimum`.
///
/// Leaves without an objective are rejected.
#[derive(Debug, Clone)]
pub struct ThresholdGoal {
    minimum: i64,
    solutions: Vec<NodeRef>,
}

impl ThresholdGoal {
    #[must_use]
    pub fn new(minimum: i64) -> Self {
        Self {
            minimum,
            solutions: Vec::new(),
        }
    }
}

impl Goal for ThresholdGoal {
    fn solution_found(&mut self, tree: &dyn SearchTree, reference: NodeRef) -> bool {
        let accepted = tree
            .objective(tree.current_node())
            .is_some_and(|value| value >= self.minimum);
        if accepted {
            self.solutions.push(reference);
        }
        accepted
    }

    fn solution_reference_count(&self) -> usize {
        self.solutions.len()
    }

    fn solution_reference(&self, index: usize) -> Option<&NodeRef> {
        self.solutions.get(index)
    }
}

/// Direction of an [`OptimizeGoal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Accepts a leaf only when it strictly improves on the incumbent.
///
/// Streaming (continual improvement) delivers every improvement as it is
/// found. After a full enumeration the goal reports one solution: the best.
#[derive(Debug, Clone)]
pub struct OptimizeGoal {
    direction: Direction,
    best: Option<(i64, NodeRef)>,
}

impl OptimizeGoal {
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            best: None,
        }
    }

    #[must_use]
    pub fn minimize() -> Self {
        Self::new(Direction::Minimize)
    }

    #[must_use]
    pub fn maximize() -> Self {
        Self::new(Direction::Maximize)
    }

    /// Objective of the incumbent, if any.
    #[must_use]
    pub fn best_objective(&self) -> Option<i64> {
        self.best.as_ref().map(|(value, _)| *value)
    }
}

impl Goal for OptimizeGoal {
    fn solution_found(&mut self, tree: &dyn SearchTree, reference: NodeRef) -> bool {
        let Some(value) = tree.objective(tree.current_node()) else {
            return false;
        };
        let improves = match self.objective_bound() {
            Some(bound) => bound.admits(value),
            None => true,
        };
        if improves {
            self.best = Some((value, reference));
        }
        improves
    }

    fn solution_reference_count(&self) -> usize {
        usize::from(self.best.is_some())
    }

    fn solution_reference(&self, index: usize) -> Option<&NodeRef> {
        match (&self.best, index) {
            (Some((_, reference)), 0) => Some(reference),
            _ => None,
        }
    }

    fn objective_bound(&self) -> Option<Bound> {
        let (value, _) = self.best.as_ref()?;
        Some(match self.direction {
            Direction::Minimize => Bound::Below(*value),
            Direction::Maximize => Bound::Above(*value),
        })
    }
}
