//! Shared helpers for canopy benchmark suites.

use canopy_harness::arena::ArenaTree;
use canopy_harness::worlds::knapsack::KnapsackWorld;
use canopy_harness::worlds::queens::QueensWorld;
use canopy_search::goal::{AllSolutionsGoal, Goal, OptimizeGoal};
use canopy_search::policy::{SearchConfig, TechniqueChoice};
use canopy_search::search::Search;

/// A named benchmark workload; `build` returns a fresh driver.
pub struct Regime {
    pub name: &'static str,
    pub build: fn() -> Search<ArenaTree<QueensWorld>>,
}

/// Driver over `n`-queens with the given configuration and optional goal.
#[must_use]
pub fn queens_search(
    n: usize,
    config: &SearchConfig,
    goal: Option<Box<dyn Goal>>,
) -> Search<ArenaTree<QueensWorld>> {
    let mut search = Search::from_config(ArenaTree::new(QueensWorld::new(n)), config);
    if let Some(goal) = goal {
        search.set_goal(goal);
    }
    search
}

/// Drive `search` to the end and count delivered solutions.
pub fn drain<T: canopy_search::contract::SearchTree>(search: &mut Search<T>) -> usize {
    let mut count = 0;
    while search.next_solution() {
        count += 1;
    }
    count
}

fn streaming_8() -> Search<ArenaTree<QueensWorld>> {
    queens_search(8, &SearchConfig::default(), None)
}

fn replay_8() -> Search<ArenaTree<QueensWorld>> {
    queens_search(8, &SearchConfig::default(), Some(Box::new(AllSolutionsGoal::new())))
}

fn nested_8() -> Search<ArenaTree<QueensWorld>> {
    let world = QueensWorld::new(8).with_switch(3, TechniqueChoice::ReverseDepthFirst);
    Search::from_config(ArenaTree::new(world), &SearchConfig::default())
}

fn traced_8() -> Search<ArenaTree<QueensWorld>> {
    let config = SearchConfig {
        record_trace: true,
        ..SearchConfig::default()
    };
    queens_search(8, &config, None)
}

/// Queens regimes covering streaming, replay, nesting and tracing.
#[must_use]
pub fn queens_regimes() -> Vec<Regime> {
    vec![
        Regime {
            name: "streaming",
            build: streaming_8,
        },
        Regime {
            name: "replay",
            build: replay_8,
        },
        Regime {
            name: "nested_switch",
            build: nested_8,
        },
        Regime {
            name: "traced",
            build: traced_8,
        },
    ]
}

/// Knapsack instance with `n` items and a branch-and-bound goal.
#[must_use]
pub fn knapsack_search(n: u64) -> Search<ArenaTree<KnapsackWorld>> {
    let pairs: Vec<(u64, i64)> = (1..=n)
        .map(|i| (i * 7 % 13 + 1, i64::try_from(i * 11 % 17 + 1).unwrap_or(1)))
        .collect();
    let world = KnapsackWorld::from_pairs(n * 3, &pairs);
    let mut search = Search::from_config(ArenaTree::new(world), &SearchConfig::default());
    search.set_goal(Box::new(OptimizeGoal::maximize()));
    search
}

/// Canonical JSON of a small summary, for the trace-digest micro bench.
#[must_use]
pub fn summary_json(solutions: usize) -> serde_json::Value {
    serde_json::json!({ "schema_version": "bench_summary.v1", "solutions": solutions })
}
