//! Search driver: steps a tree with the active technique, goal and limit.
//!
//! # Loop
//!
//! ```text
//! next_solution()
//!   → find_next_leaf_node_satisfying_goal()
//!       → move_to_open_node()   (technique moves; resume on Move::None)
//!       → limit poll → activate_node() (prune on failure; suspend on change)
//!       → leaf? → goal.solution_found()
//! ```
//!
//! # Delivery modes
//!
//! Without a goal, or with `continually_improve` set, every accepted leaf is
//! returned the moment it is found. With a goal and `continually_improve`
//! unset, the first call enumerates the whole tree so the goal can rank what
//! it saw, and every call then replays the goal's recorded solutions in
//! order.
//!
//! # Suspension
//!
//! When activating a node returns a [`TechniqueChange`], the active
//! technique/goal/limit are pushed onto a LIFO stack and the replacements
//! take control with the node as their root. When the replacement technique
//! reports [`Move::None`] at that root, the top context is popped and the
//! tree returns to the node so the resumed technique can move past it.
//! A goal or limit installed while suspended lasts until the innermost
//! context resumes.

use tracing::{debug, trace};

use crate::contract::{NodeId, NodeRef, RootAction, SearchTree, TechniqueChange};
use crate::goal::Goal;
use crate::limit::Limit;
use crate::moves::Move;
use crate::policy::SearchConfig;
use crate::technique::{DepthFirstSearch, Technique};
use crate::trace::{PruneReasonV1, SearchEventV1, SearchTraceV1};

/// Where the driver stands after its last call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Nothing has been returned yet.
    Exploring,
    /// The tree is positioned at the solution just returned.
    SolutionFound,
    /// The active limit refused to continue.
    LimitReached,
    /// The tree (or the replay list) has nothing more to offer.
    Exhausted,
}

/// Counters accumulated over the driver's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub descents: u64,
    pub backtracks: u64,
    pub jumps: u64,
    pub activations: u64,
    pub propagation_failures: u64,
    pub fast_rejects: u64,
    pub solutions_accepted: u64,
    pub solutions_rejected: u64,
    pub suspensions: u64,
    pub resumes: u64,
    pub limit_stops: u64,
    pub replays: u64,
}

impl SearchStats {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "activations": self.activations,
            "backtracks": self.backtracks,
            "descents": self.descents,
            "fast_rejects": self.fast_rejects,
            "jumps": self.jumps,
            "limit_stops": self.limit_stops,
            "propagation_failures": self.propagation_failures,
            "replays": self.replays,
            "resumes": self.resumes,
            "solutions_accepted": self.solutions_accepted,
            "solutions_rejected": self.solutions_rejected,
            "suspensions": self.suspensions,
        })
    }
}

/// Slot of a suspended context: either the value displaced from the active
/// slot, or `Kept` while the outer and nested searches share the active one.
#[derive(Debug)]
enum Saved<V> {
    Kept,
    Replaced(V),
}

impl<V> Saved<V> {
    fn displace(slot: &mut V, replacement: Option<V>) -> Self {
        match replacement {
            Some(value) => Self::Replaced(std::mem::replace(slot, value)),
            None => Self::Kept,
        }
    }

    /// Install `value` in the active slot while suspended. A shared value is
    /// moved into the context first so that resuming restores it.
    fn set_active(&mut self, slot: &mut V, value: V) {
        match self {
            Self::Kept => *self = Self::Replaced(std::mem::replace(slot, value)),
            Self::Replaced(_) => *slot = value,
        }
    }

    fn restore(self, slot: &mut V) {
        if let Self::Replaced(value) = self {
            *slot = value;
        }
    }
}

/// Snapshot taken when a node's activation requested a technique change.
#[derive(Debug)]
struct SuspendedContext {
    root: NodeRef,
    technique: Saved<Box<dyn Technique>>,
    goal: Saved<Option<Box<dyn Goal>>>,
    limit: Saved<Option<Box<dyn Limit>>>,
    technique_root_depth: usize,
}

/// The search driver.
///
/// Single-threaded and synchronous. All tree repositioning happens inside
/// the driver's own stepping; between calls the tree sits at the last
/// returned solution (or wherever the search stopped).
pub struct Search<T: SearchTree> {
    tree: T,
    technique: Box<dyn Technique>,
    goal: Option<Box<dyn Goal>>,
    limit: Option<Box<dyn Limit>>,
    limit_initialized: bool,
    technique_root_depth: usize,
    root_anchored: bool,
    continually_improve: bool,
    all_solutions_found: bool,
    next_replay_index: usize,
    suspended: Vec<SuspendedContext>,
    status: SearchStatus,
    stats: SearchStats,
    trace: Option<SearchTraceV1>,
}

impl<T: SearchTree> Search<T> {
    /// Driver over `tree` using depth-first search.
    #[must_use]
    pub fn new(tree: T) -> Self {
        Self::with_technique(tree, Box::new(DepthFirstSearch))
    }

    /// Driver over `tree` using `technique`, rooted at the tree's current node.
    #[must_use]
    pub fn with_technique(tree: T, technique: Box<dyn Technique>) -> Self {
        let technique_root_depth = tree.depth(tree.current_node());
        Self {
            tree,
            technique,
            goal: None,
            limit: None,
            limit_initialized: false,
            technique_root_depth,
            root_anchored: false,
            continually_improve: false,
            all_solutions_found: false,
            next_replay_index: 0,
            suspended: Vec::new(),
            status: SearchStatus::Exploring,
            stats: SearchStats::default(),
            trace: None,
        }
    }

    /// Driver over the tree `action` materializes from `store`.
    ///
    /// `technique` defaults to depth-first search.
    pub fn from_root_action<S, A>(store: S, action: A, technique: Option<Box<dyn Technique>>) -> Self
    where
        A: RootAction<S, Tree = T>,
    {
        let tree = action.materialize(store);
        match technique {
            Some(technique) => Self::with_technique(tree, technique),
            None => Self::new(tree),
        }
    }

    /// Driver configured from `config` (technique, mode, limits, tracing).
    #[must_use]
    pub fn from_config(tree: T, config: &SearchConfig) -> Self {
        let mut search = Self::with_technique(tree, config.technique.build());
        search.continually_improve = config.continually_improve;
        search.limit = config.build_limit();
        if config.record_trace {
            search.trace = Some(SearchTraceV1::new());
        }
        search
    }

    /// Replace the active goal. Earlier verdicts are not revisited.
    ///
    /// While suspended the replacement only lasts until the innermost
    /// suspended context resumes.
    pub fn set_goal(&mut self, goal: Box<dyn Goal>) {
        self.replace_goal(Some(goal));
    }

    pub fn clear_goal(&mut self) {
        self.replace_goal(None);
    }

    /// Replace the active limit; it is initialized on the next visited node.
    ///
    /// While suspended the replacement only lasts until the innermost
    /// suspended context resumes.
    pub fn set_limit(&mut self, limit: Box<dyn Limit>) {
        self.replace_limit(Some(limit));
    }

    pub fn clear_limit(&mut self) {
        self.replace_limit(None);
    }

    fn replace_goal(&mut self, goal: Option<Box<dyn Goal>>) {
        match self.suspended.last_mut() {
            Some(context) => context.goal.set_active(&mut self.goal, goal),
            None => self.goal = goal,
        }
    }

    fn replace_limit(&mut self, limit: Option<Box<dyn Limit>>) {
        match self.suspended.last_mut() {
            Some(context) => context.limit.set_active(&mut self.limit, limit),
            None => self.limit = limit,
        }
        self.limit_initialized = false;
    }

    pub fn set_continually_improve(&mut self, continually_improve: bool) {
        self.continually_improve = continually_improve;
    }

    /// Start (or stop) recording a trace. Starting discards nothing already
    /// recorded.
    pub fn set_record_trace(&mut self, record: bool) {
        match (record, self.trace.is_some()) {
            (true, false) => self.trace = Some(SearchTraceV1::new()),
            (false, true) => self.trace = None,
            _ => {}
        }
    }

    #[must_use]
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable access to the tree.
    ///
    /// Repositioning before the first step moves the technique root to the
    /// new current node; afterwards the root stays where the search began.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    #[must_use]
    pub fn into_tree(self) -> T {
        self.tree
    }

    #[must_use]
    pub fn technique(&self) -> &dyn Technique {
        self.technique.as_ref()
    }

    #[must_use]
    pub fn goal(&self) -> Option<&dyn Goal> {
        self.goal.as_deref()
    }

    /// Number of suspended contexts (0 while the original technique rules).
    #[must_use]
    pub fn suspension_depth(&self) -> usize {
        self.suspended.len()
    }

    #[must_use]
    pub fn technique_root_depth(&self) -> usize {
        self.technique_root_depth
    }

    #[must_use]
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.status == SearchStatus::Exhausted
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[must_use]
    pub fn trace(&self) -> Option<&SearchTraceV1> {
        self.trace.as_ref()
    }

    /// Advance to the next solution.
    ///
    /// Returns `true` with the tree positioned at the solution, or `false`
    /// when nothing more can be found (tree exhausted, replay list used up,
    /// or the limit stopped the search).
    pub fn next_solution(&mut self) -> bool {
        if self.goal.is_none() || self.continually_improve {
            return self.find_next_leaf_node_satisfying_goal();
        }

        if !self.all_solutions_found {
            while self.find_next_leaf_node_satisfying_goal() {}
            self.all_solutions_found = true;
            debug!(
                recorded = self.goal.as_ref().map_or(0, |g| g.solution_reference_count()),
                "enumeration complete; replaying recorded solutions"
            );
        }
        self.replay_next_solution()
    }

    fn replay_next_solution(&mut self) -> bool {
        let index = self.next_replay_index;
        let reference = self
            .goal
            .as_ref()
            .filter(|goal| index < goal.solution_reference_count())
            .and_then(|goal| goal.solution_reference(index))
            .cloned();
        let Some(reference) = reference else {
            self.status = SearchStatus::Exhausted;
            return false;
        };

        self.next_replay_index += 1;
        self.tree.return_to_reference(&reference);
        self.stats.replays += 1;
        self.status = SearchStatus::SolutionFound;
        self.record(|_| SearchEventV1::Replay {
            index,
            path: reference.path().to_vec(),
        });
        true
    }

    /// Step until an acceptable leaf is found; `false` on exhaustion or
    /// limit stop.
    pub fn find_next_leaf_node_satisfying_goal(&mut self) -> bool {
        let mut node = self.move_to_open_node();
        self.init_limit_if_needed(node);

        while let Some(current) = node {
            if !self.limit_allows(current) {
                self.stats.limit_stops += 1;
                self.status = SearchStatus::LimitReached;
                debug!(depth = self.tree.depth(current), "limit reached");
                self.record(|tree| SearchEventV1::LimitReached {
                    path: tree.reference_for_node(current).into_path(),
                });
                return false;
            }

            let activated = self.activate_node(current);
            if activated
                && self.tree.child_count(current) == 0
                && self.is_solution_acceptable_to_goal()
            {
                self.status = SearchStatus::SolutionFound;
                return true;
            }

            node = self.move_to_open_node();
            self.init_limit_if_needed(node);
        }

        self.status = SearchStatus::Exhausted;
        false
    }

    fn init_limit_if_needed(&mut self, node: Option<NodeId>) {
        if self.limit_initialized {
            return;
        }
        if let (Some(node), Some(limit)) = (node, self.limit.as_mut()) {
            limit.init(&self.tree, node);
            self.limit_initialized = true;
        }
    }

    fn limit_allows(&mut self, node: NodeId) -> bool {
        match self.limit.as_mut() {
            Some(limit) => limit.is_ok_to_continue(&self.tree, node),
            None => true,
        }
    }

    /// Activate `node`, absorbing failures by pruning.
    ///
    /// Returns `true` when the node is now active.
    pub fn activate_node(&mut self, node: NodeId) -> bool {
        if let Some(goal) = self.goal.as_deref() {
            if !goal.is_ok_to_activate(&self.tree, node) {
                self.tree.prune(node);
                self.stats.fast_rejects += 1;
                self.record(|tree| SearchEventV1::Prune {
                    path: tree.reference_for_node(node).into_path(),
                    reason: PruneReasonV1::GoalRejected,
                });
                return false;
            }
        }

        self.record(|tree| SearchEventV1::Activate {
            path: tree.reference_for_node(node).into_path(),
        });
        self.stats.activations += 1;

        let change = match self.tree.activate(node, self.goal.as_deref()) {
            Ok(change) => change,
            Err(failure) => {
                trace!(depth = self.tree.depth(node), %failure, "pruning failed node");
                self.tree.prune(node);
                self.stats.propagation_failures += 1;
                self.record(|tree| SearchEventV1::Prune {
                    path: tree.reference_for_node(node).into_path(),
                    reason: PruneReasonV1::PropagationFailed,
                });
                return false;
            }
        };

        if let Some(change) = change {
            self.suspend(node, change);
        }
        true
    }

    fn suspend(&mut self, node: NodeId, change: TechniqueChange) {
        let root = self.tree.reference_for_node(node);
        let TechniqueChange {
            technique,
            goal,
            limit,
        } = change;

        if limit.is_some() {
            self.limit_initialized = false;
        }
        let context = SuspendedContext {
            root,
            technique: Saved::displace(&mut self.technique, technique),
            goal: Saved::displace(&mut self.goal, goal.map(Some)),
            limit: Saved::displace(&mut self.limit, limit.map(Some)),
            technique_root_depth: self.technique_root_depth,
        };
        self.technique_root_depth = self.tree.depth(node);
        self.stats.suspensions += 1;

        let path = context.root.path().to_vec();
        self.suspended.push(context);
        debug!(
            depth = self.technique_root_depth,
            suspension_depth = self.suspended.len(),
            technique = %self.technique.kind(),
            "technique change; suspending current context"
        );
        let suspension_depth = self.suspended.len();
        self.record(|_| SearchEventV1::Suspend {
            path,
            suspension_depth,
        });
    }

    fn resume(&mut self, context: SuspendedContext) {
        let SuspendedContext {
            root,
            technique,
            goal,
            limit,
            technique_root_depth,
        } = context;
        technique.restore(&mut self.technique);
        goal.restore(&mut self.goal);
        limit.restore(&mut self.limit);
        self.technique_root_depth = technique_root_depth;
        self.limit_initialized = true;
        self.tree.return_to_reference(&root);
        self.stats.resumes += 1;

        debug!(
            depth = root.depth(),
            suspension_depth = self.suspended.len(),
            technique = %self.technique.kind(),
            "nested search exhausted; resuming"
        );
        let suspension_depth = self.suspended.len();
        self.record(|_| SearchEventV1::Resume {
            path: root.into_path(),
            suspension_depth,
        });
    }

    /// Let the technique move until the tree sits at an open node.
    ///
    /// Returns `None` once the original technique is done at its root with
    /// nothing left to resume.
    pub fn move_to_open_node(&mut self) -> Option<NodeId> {
        let mut node = self.tree.current_node();
        if !self.root_anchored {
            self.technique_root_depth = self.tree.depth(node);
            self.root_anchored = true;
        }
        while self.tree.is_closed(node) {
            let is_root = self.tree.depth(node) == self.technique_root_depth;
            let step = self.technique.next_move(&self.tree, node, is_root);
            trace!(depth = self.tree.depth(node), is_root, step = step.name(), "move");
            match step {
                Move::Parent => {
                    node = self.tree.move_to_parent();
                    self.stats.backtracks += 1;
                    let depth = self.tree.depth(node);
                    self.record(|_| SearchEventV1::Backtrack { depth });
                }
                Move::Child(child) => {
                    node = self.tree.move_to_child(child);
                    self.stats.descents += 1;
                    let depth = self.tree.depth(node);
                    self.record(|_| SearchEventV1::Descend { child, depth });
                }
                Move::Jump(reference) => {
                    self.tree.return_to_reference(&reference);
                    node = self.tree.current_node();
                    self.stats.jumps += 1;
                    self.record(|_| SearchEventV1::Jump {
                        path: reference.into_path(),
                    });
                }
                Move::None => {
                    let Some(context) = self.suspended.pop() else {
                        debug!("search exhausted");
                        self.status = SearchStatus::Exhausted;
                        self.record(|_| SearchEventV1::Exhausted);
                        return None;
                    };
                    self.resume(context);
                    node = self.tree.current_node();
                }
            }
        }
        Some(node)
    }

    /// Ask the goal about the leaf the tree is positioned at.
    ///
    /// Without a goal every leaf is acceptable.
    pub fn is_solution_acceptable_to_goal(&mut self) -> bool {
        let reference = self.tree.reference_for_node(self.tree.current_node());
        let accepted = match self.goal.as_mut() {
            Some(goal) => goal.solution_found(&self.tree, reference.clone()),
            None => true,
        };
        if accepted {
            self.stats.solutions_accepted += 1;
            debug!(depth = reference.depth(), "solution accepted");
            self.record(|_| SearchEventV1::SolutionAccepted {
                path: reference.into_path(),
            });
        } else {
            self.stats.solutions_rejected += 1;
            self.record(|_| SearchEventV1::SolutionRejected {
                path: reference.into_path(),
            });
        }
        accepted
    }

    fn record(&mut self, event: impl FnOnce(&T) -> SearchEventV1) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(event(&self.tree));
        }
    }
}
