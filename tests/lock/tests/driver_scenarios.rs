//! Driver behavior over the arena tree: delivery modes, pruning, nesting
//! and limits, exercised through scripted worlds.

use canopy_harness::arena::{ArenaRoot, ArenaTree};
use canopy_harness::worlds::scripted::{ScriptedChangeV1, ScriptedNodeV1, ScriptedWorld};
use canopy_search::contract::{NodeId, NodeRef, RootAction, SearchTree};
use canopy_search::goal::{AllSolutionsGoal, FirstSolutionGoal, ThresholdGoal};
use canopy_search::limit::NodeLimit;
use canopy_search::moves::Move;
use canopy_search::policy::{SearchConfig, TechniqueChoice};
use canopy_search::search::{Search, SearchStatus};
use canopy_search::technique::{Technique, TechniqueKind};
use canopy_search::trace::SearchEventV1;

fn leaf(value: i64) -> ScriptedNodeV1 {
    ScriptedNodeV1::leaf(value)
}

fn branch(value: i64, children: Vec<ScriptedNodeV1>) -> ScriptedNodeV1 {
    ScriptedNodeV1::branch(value, children)
}

fn traced(root: ScriptedNodeV1) -> Search<ArenaTree<ScriptedWorld>> {
    let config = SearchConfig {
        record_trace: true,
        ..SearchConfig::default()
    };
    Search::from_config(ArenaTree::new(ScriptedWorld::new(root)), &config)
}

fn current_path(search: &Search<ArenaTree<ScriptedWorld>>) -> Vec<usize> {
    let tree = search.tree();
    tree.reference_for_node(tree.current_node()).into_path()
}

fn drain(search: &mut Search<ArenaTree<ScriptedWorld>>) -> Vec<Vec<usize>> {
    let mut found = Vec::new();
    while search.next_solution() {
        found.push(current_path(search));
    }
    found
}

fn activated_paths(search: &Search<ArenaTree<ScriptedWorld>>) -> Vec<Vec<usize>> {
    search
        .trace()
        .expect("trace enabled")
        .events
        .iter()
        .filter_map(|event| match event {
            SearchEventV1::Activate { path } => Some(path.clone()),
            _ => None,
        })
        .collect()
}

/// R → [A → [a0, a1], B → [b0, b1], c]
fn five_leaves() -> ScriptedNodeV1 {
    branch(
        0,
        vec![
            branch(1, vec![leaf(10), leaf(11)]),
            branch(2, vec![leaf(20), leaf(21)]),
            leaf(3),
        ],
    )
}

#[test]
fn failing_second_leaf_ends_search_at_technique_root() {
    let mut search = traced(branch(0, vec![leaf(1), leaf(2).failing()]));
    assert!(search.next_solution());
    assert_eq!(current_path(&search), vec![0]);
    assert!(!search.next_solution());
    assert!(search.is_exhausted());
    assert_eq!(search.stats().propagation_failures, 1);
    assert!(search.tree().is_closed(NodeId(2)));
}

#[test]
fn rejected_leaf_is_skipped_while_streaming() {
    let mut search = traced(branch(0, vec![leaf(5), leaf(12)]));
    search.set_goal(Box::new(ThresholdGoal::new(10)));
    search.set_continually_improve(true);
    assert!(search.next_solution());
    assert_eq!(current_path(&search), vec![1]);
    let events = &search.trace().unwrap().events;
    assert!(events.contains(&SearchEventV1::SolutionRejected { path: vec![0] }));
    assert!(events.contains(&SearchEventV1::SolutionAccepted { path: vec![1] }));
}

#[test]
fn first_n_calls_yield_first_n_leaves() {
    let mut search = traced(five_leaves());
    assert!(search.next_solution());
    assert!(search.next_solution());
    assert_eq!(current_path(&search), vec![0, 1]);

    let mut rest = drain(&mut search);
    rest.insert(0, vec![0, 1]);
    assert_eq!(rest, vec![vec![0, 1], vec![1, 0], vec![1, 1], vec![2]]);
    assert!(!search.next_solution());
}

#[test]
fn replay_then_false_forever() {
    let mut search = traced(five_leaves());
    search.set_goal(Box::new(AllSolutionsGoal::new()));
    let found = drain(&mut search);
    assert_eq!(
        found,
        vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1], vec![2]]
    );
    for _ in 0..3 {
        assert!(!search.next_solution());
    }
    assert_eq!(search.stats().replays, 5);
}

#[test]
fn failed_subtree_is_never_revisited() {
    let mut search = traced(branch(
        0,
        vec![
            branch(1, vec![leaf(10), leaf(11)]).failing(),
            branch(2, vec![leaf(20)]),
        ],
    ));
    assert_eq!(drain(&mut search), vec![vec![1, 0]]);
    let activated = activated_paths(&search);
    assert!(activated.iter().all(|path| !path.starts_with(&[0]) || path == &vec![0]));
    let mut unique = activated.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), activated.len(), "no node activated twice");
}

fn reverse() -> ScriptedChangeV1 {
    ScriptedChangeV1::technique(TechniqueChoice::ReverseDepthFirst)
}

fn forward() -> ScriptedChangeV1 {
    ScriptedChangeV1::technique(TechniqueChoice::DepthFirst)
}

#[test]
fn nested_contexts_resume_lifo() {
    // A (DFS) at the root; B (reverse) below [0]; C (DFS) below [0, 2].
    let root = branch(
        0,
        vec![
            branch(
                1,
                vec![
                    leaf(10),
                    leaf(11),
                    branch(12, vec![leaf(120), leaf(121)]).switching(forward()),
                ],
            )
            .switching(reverse()),
            leaf(2),
        ],
    );
    let mut search = traced(root);
    let found = drain(&mut search);
    assert_eq!(
        found,
        vec![
            vec![0, 2, 0],
            vec![0, 2, 1],
            vec![0, 1],
            vec![0, 0],
            vec![1],
        ]
    );

    let nesting: Vec<_> = search
        .trace()
        .unwrap()
        .events
        .iter()
        .filter_map(|event| match event {
            SearchEventV1::Suspend { path, suspension_depth } => {
                Some(("suspend", path.clone(), *suspension_depth))
            }
            SearchEventV1::Resume { path, suspension_depth } => {
                Some(("resume", path.clone(), *suspension_depth))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        nesting,
        vec![
            ("suspend", vec![0], 1),
            ("suspend", vec![0, 2], 2),
            ("resume", vec![0, 2], 1),
            ("resume", vec![0], 0),
        ]
    );
}

#[test]
fn resume_repositions_at_switch_node() {
    let root = branch(
        0,
        vec![branch(1, vec![leaf(10)]).switching(reverse()), leaf(2)],
    );
    let mut search = traced(root);
    assert!(search.next_solution());
    assert_eq!(search.suspension_depth(), 1);
    assert_eq!(search.technique().kind(), TechniqueKind::ReverseDepthFirst);
    assert!(search.next_solution());
    assert_eq!(current_path(&search), vec![1]);
    assert_eq!(search.suspension_depth(), 0);
    assert_eq!(search.technique().kind(), TechniqueKind::DepthFirst);

    let events = &search.trace().unwrap().events;
    let at = events
        .iter()
        .position(|e| matches!(e, SearchEventV1::Resume { .. }))
        .unwrap();
    assert_eq!(
        events[at],
        SearchEventV1::Resume {
            path: vec![0],
            suspension_depth: 0
        }
    );
    assert_eq!(events[at + 1], SearchEventV1::Backtrack { depth: 0 });
}

#[test]
fn nested_threshold_goal_applies_only_below_switch() {
    let root = branch(
        0,
        vec![
            branch(1, vec![leaf(5), leaf(50)]).switching(ScriptedChangeV1 {
                minimum: Some(40),
                ..ScriptedChangeV1::default()
            }),
            leaf(7),
        ],
    );
    let mut search = traced(root);
    search.set_goal(Box::new(ThresholdGoal::new(6)));
    search.set_continually_improve(true);
    assert_eq!(drain(&mut search), vec![vec![0, 1], vec![1]]);
}

#[test]
fn node_limit_stops_and_can_be_raised() {
    let config = SearchConfig {
        max_nodes: Some(3),
        ..SearchConfig::default()
    };
    let mut search = Search::from_config(ArenaTree::new(ScriptedWorld::new(five_leaves())), &config);
    assert!(search.next_solution());
    assert!(!search.next_solution());
    assert_eq!(search.status(), SearchStatus::LimitReached);
    assert!(!search.is_exhausted());

    search.set_limit(Box::new(NodeLimit::new(100)));
    assert!(search.next_solution());
    assert_eq!(current_path(&search), vec![0, 1]);
    search.clear_limit();
    assert_eq!(drain(&mut search).len(), 3);
}

#[test]
fn first_solution_goal_prunes_the_rest_without_activation() {
    let mut search = traced(five_leaves());
    search.set_goal(Box::new(FirstSolutionGoal::new()));
    assert!(search.next_solution());
    assert_eq!(current_path(&search), vec![0, 0]);
    assert!(!search.next_solution());
    assert_eq!(activated_paths(&search).len(), 3, "root, A, a0 only");
    assert!(search.stats().fast_rejects >= 2);
}

/// Depth-first order, but returns to the absolute root instead of
/// backtracking one level at a time.
#[derive(Debug)]
struct RestartingDfs;

impl Technique for RestartingDfs {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::Custom("restarting_dfs")
    }

    fn next_move(&self, tree: &dyn SearchTree, node: NodeId, is_root: bool) -> Move {
        match tree.next_open_child(node) {
            Some(child) => Move::Child(child),
            None if is_root => Move::None,
            None => Move::Jump(NodeRef::root()),
        }
    }
}

#[test]
fn jump_technique_matches_dfs_leaf_order() {
    let mut dfs = traced(five_leaves());
    let expected = drain(&mut dfs);

    let mut jumping = Search::with_technique(
        ArenaTree::new(ScriptedWorld::new(five_leaves())),
        Box::new(RestartingDfs),
    );
    jumping.set_record_trace(true);
    assert_eq!(drain(&mut jumping), expected);
    assert!(jumping.stats().jumps > 0);
    assert_eq!(jumping.stats().backtracks, 0);
}

#[test]
fn root_action_constructs_driver() {
    let world = ScriptedWorld::new(five_leaves());
    let mut search = Search::from_root_action(world, ArenaRoot, None);
    assert_eq!(search.technique().kind(), TechniqueKind::DepthFirst);
    assert_eq!(drain(&mut search).len(), 5);

    let tree = ArenaRoot.materialize(ScriptedWorld::new(leaf(9)));
    let mut single = Search::new(tree);
    assert!(single.next_solution());
    assert_eq!(current_path(&single), Vec::<usize>::new());
    assert!(!single.next_solution());
}
