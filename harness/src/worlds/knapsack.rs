//! `KnapsackWorld`: 0/1 knapsack with branch-and-bound pruning.
//!
//! Level `i` decides item `i`: the first child takes it, the second skips
//! it. A take that would overflow the weight or value totals is not
//! offered. Exceeding the capacity fails propagation. When the active goal
//! publishes an objective bound, a state fails too if no completion can
//! satisfy it: a maximizing bound is checked against the optimistic value
//! (every undecided positive item taken), a minimizing bound against the
//! least value (every undecided negative item taken).

use canopy_search::error::PropagationFailure;
use canopy_search::goal::{Bound, Goal};

use crate::contract::{ExpansionV1, SearchWorldV1};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemV1 {
    pub weight: u64,
    pub value: i64,
}

/// Partial packing: decisions for the first `taken.len()` items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackingV1 {
    pub taken: Vec<bool>,
    pub weight: u64,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnapsackWorld {
    items: Vec<ItemV1>,
    capacity: u64,
}

impl KnapsackWorld {
    #[must_use]
    pub fn new(capacity: u64, items: Vec<ItemV1>) -> Self {
        Self { items, capacity }
    }

    /// Build from `(weight, value)` pairs.
    #[must_use]
    pub fn from_pairs(capacity: u64, pairs: &[(u64, i64)]) -> Self {
        let items = pairs
            .iter()
            .map(|&(weight, value)| ItemV1 { weight, value })
            .collect();
        Self::new(capacity, items)
    }

    /// Best value reachable from `packing` ignoring capacity.
    #[must_use]
    pub fn optimistic_value(&self, packing: &PackingV1) -> i64 {
        self.undecided(packing)
            .fold(packing.value, |acc, item| acc.saturating_add(item.value.max(0)))
    }

    /// Least value reachable from `packing` ignoring capacity.
    #[must_use]
    pub fn least_value(&self, packing: &PackingV1) -> i64 {
        self.undecided(packing)
            .fold(packing.value, |acc, item| acc.saturating_add(item.value.min(0)))
    }

    fn undecided<'a>(&'a self, packing: &PackingV1) -> impl Iterator<Item = &'a ItemV1> {
        self.items.get(packing.taken.len()..).unwrap_or_default().iter()
    }

    /// `packing` plus item `item`, or `None` when a total would overflow.
    fn take(packing: &PackingV1, item: ItemV1) -> Option<PackingV1> {
        let weight = packing.weight.checked_add(item.weight)?;
        let value = packing.value.checked_add(item.value)?;
        let mut taken = packing.taken.clone();
        taken.push(true);
        Some(PackingV1 {
            taken,
            weight,
            value,
        })
    }

    fn skip(packing: &PackingV1) -> PackingV1 {
        let mut taken = packing.taken.clone();
        taken.push(false);
        PackingV1 {
            taken,
            ..packing.clone()
        }
    }
}

impl SearchWorldV1 for KnapsackWorld {
    type State = PackingV1;

    fn world_id(&self) -> &str {
        "knapsack"
    }

    fn root_state(&self) -> PackingV1 {
        PackingV1::default()
    }

    fn expand(
        &self,
        state: &PackingV1,
        _depth: usize,
        goal: Option<&dyn Goal>,
    ) -> Result<ExpansionV1<PackingV1>, PropagationFailure> {
        if state.weight > self.capacity {
            return Err(PropagationFailure::new(format!(
                "weight {} exceeds capacity {}",
                state.weight, self.capacity
            )));
        }
        if let Some(bound) = goal.and_then(|goal| goal.objective_bound()) {
            let reachable = match bound {
                Bound::Above(_) => self.optimistic_value(state),
                Bound::Below(_) => self.least_value(state),
            };
            if !bound.admits(reachable) {
                return Err(PropagationFailure::new(format!(
                    "reachable value {reachable} cannot beat {bound:?}"
                )));
            }
        }

        let Some(&item) = self.items.get(state.taken.len()) else {
            return Ok(ExpansionV1::leaf());
        };
        let children = Self::take(state, item)
            .into_iter()
            .chain(std::iter::once(Self::skip(state)))
            .collect();
        Ok(ExpansionV1::branch(children))
    }

    fn objective(&self, state: &PackingV1) -> Option<i64> {
        Some(state.value)
    }

    fn describe(&self, state: &PackingV1) -> serde_json::Value {
        let taken: Vec<usize> = state
            .taken
            .iter()
            .enumerate()
            .filter_map(|(index, &take)| take.then_some(index))
            .collect();
        serde_json::json!({
            "taken": taken,
            "value": state.value,
            "weight": state.weight,
        })
    }
}
