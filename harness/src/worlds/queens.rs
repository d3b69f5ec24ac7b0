//! `QueensWorld`: N-queens, one row per tree level.
//!
//! A state is the column of each queen placed so far (row = index). Each
//! activation branches over every column of the next row; a queen that
//! attacks an earlier one fails propagation, so every activated leaf is a
//! full, consistent placement.
//!
//! An optional technique switch at a fixed depth exercises the suspension
//! stack: every node at that depth requests the switch, so the nested
//! search is entered and left once per surviving partial placement.

use canopy_search::contract::TechniqueChange;
use canopy_search::error::PropagationFailure;
use canopy_search::goal::Goal;
use canopy_search::policy::TechniqueChoice;

use crate::contract::{ExpansionV1, SearchWorldV1};

/// Known solution counts for boards of size 1..=8.
pub const SOLUTION_COUNTS: [usize; 8] = [1, 0, 0, 2, 10, 4, 40, 92];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueensWorld {
    size: usize,
    switch: Option<(usize, TechniqueChoice)>,
}

impl QueensWorld {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self { size, switch: None }
    }

    /// Request `technique` for the subtree of every node at `depth`.
    #[must_use]
    pub fn with_switch(mut self, depth: usize, technique: TechniqueChoice) -> Self {
        self.switch = Some((depth, technique));
        self
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// True when the most recently placed queen attacks no earlier queen.
    #[must_use]
    pub fn last_queen_is_safe(columns: &[usize]) -> bool {
        let Some((&col, earlier)) = columns.split_last() else {
            return true;
        };
        let row = earlier.len();
        earlier.iter().enumerate().all(|(r, &c)| {
            c != col && row - r != col.abs_diff(c)
        })
    }
}

impl SearchWorldV1 for QueensWorld {
    type State = Vec<usize>;

    fn world_id(&self) -> &str {
        "queens"
    }

    fn root_state(&self) -> Vec<usize> {
        Vec::with_capacity(self.size)
    }

    fn expand(
        &self,
        state: &Vec<usize>,
        depth: usize,
        _goal: Option<&dyn Goal>,
    ) -> Result<ExpansionV1<Vec<usize>>, PropagationFailure> {
        if !Self::last_queen_is_safe(state) {
            return Err(PropagationFailure::new(format!(
                "queen in row {} is attacked",
                state.len().saturating_sub(1)
            )));
        }
        if state.len() == self.size {
            return Ok(ExpansionV1::leaf());
        }

        let children = (0..self.size)
            .map(|col| {
                let mut next = state.clone();
                next.push(col);
                next
            })
            .collect();
        let expansion = ExpansionV1::branch(children);
        Ok(match self.switch {
            Some((at, technique)) if at == depth => {
                expansion.with_change(TechniqueChange {
                    technique: Some(technique.build()),
                    ..TechniqueChange::default()
                })
            }
            _ => expansion,
        })
    }

    fn describe(&self, state: &Vec<usize>) -> serde_json::Value {
        serde_json::json!({ "columns": state })
    }
}
