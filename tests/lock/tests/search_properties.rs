//! Property tests over random scripted trees.

use canopy_harness::arena::ArenaTree;
use canopy_harness::worlds::scripted::{ScriptedNodeV1, ScriptedWorld};
use canopy_search::contract::SearchTree;
use canopy_search::goal::AllSolutionsGoal;
use canopy_search::policy::{SearchConfig, TechniqueChoice};
use canopy_search::search::Search;
use canopy_search::trace::SearchEventV1;
use proptest::prelude::*;

fn arb_tree() -> impl Strategy<Value = ScriptedNodeV1> {
    let leaf = (0i64..100, prop::bool::weighted(0.15)).prop_map(|(value, fails)| {
        let node = ScriptedNodeV1::leaf(value);
        if fails {
            node.failing()
        } else {
            node
        }
    });
    leaf.prop_recursive(4, 48, 4, |inner| {
        (
            0i64..100,
            prop::bool::weighted(0.1),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(value, fails, children)| {
                let node = ScriptedNodeV1::branch(value, children);
                if fails {
                    node.failing()
                } else {
                    node
                }
            })
    })
}

/// Leaves reachable without crossing a failing node, in preorder.
fn expected_leaves(node: &ScriptedNodeV1, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    if node.fails {
        return;
    }
    if node.children.is_empty() {
        out.push(path.clone());
        return;
    }
    for (index, child) in node.children.iter().enumerate() {
        path.push(index);
        expected_leaves(child, path, out);
        path.pop();
    }
}

fn run(root: &ScriptedNodeV1, config: &SearchConfig, replay: bool) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let mut search = Search::from_config(ArenaTree::new(ScriptedWorld::new(root.clone())), config);
    search.set_record_trace(true);
    if replay {
        search.set_goal(Box::new(AllSolutionsGoal::new()));
    }
    let mut found = Vec::new();
    while search.next_solution() {
        let tree = search.tree();
        found.push(tree.reference_for_node(tree.current_node()).into_path());
    }
    let activated = search
        .trace()
        .map(|trace| {
            trace
                .events
                .iter()
                .filter_map(|event| match event {
                    SearchEventV1::Activate { path } => Some(path.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    (found, activated)
}

proptest! {
    #[test]
    fn dfs_streams_leaves_in_preorder(root in arb_tree()) {
        let mut expected = Vec::new();
        expected_leaves(&root, &mut Vec::new(), &mut expected);
        let (found, _) = run(&root, &SearchConfig::default(), false);
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn replay_matches_streaming(root in arb_tree()) {
        let (streamed, _) = run(&root, &SearchConfig::default(), false);
        let (replayed, _) = run(&root, &SearchConfig::default(), true);
        prop_assert_eq!(streamed, replayed);
    }

    #[test]
    fn reverse_dfs_streams_leaves_in_reverse(root in arb_tree()) {
        let mut expected = Vec::new();
        expected_leaves(&root, &mut Vec::new(), &mut expected);
        expected.reverse();
        let config = SearchConfig {
            technique: TechniqueChoice::ReverseDepthFirst,
            ..SearchConfig::default()
        };
        let (found, _) = run(&root, &config, false);
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn no_node_is_activated_twice_or_below_a_failure(root in arb_tree()) {
        let (_, activated) = run(&root, &SearchConfig::default(), false);
        let mut unique = activated.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), activated.len());

        let world = ScriptedWorld::new(root);
        for path in &activated {
            for cut in 0..path.len() {
                let ancestor = world.node_at(&path[..cut]).unwrap();
                prop_assert!(!ancestor.fails, "activated {:?} below failed {:?}", path, &path[..cut]);
            }
        }
    }
}
