//! `ScriptedWorld`: a declarative tree for exact scenario tests.
//!
//! Every node carries an integer value (its objective), may be marked as
//! failing (activation raises a propagation failure), and may request a
//! technique change for its subtree. Scripts load from JSON:
//!
//! ```json
//! {"value": 0, "children": [
//!   {"value": 1, "change": {"technique": "reverse_depth_first"},
//!    "children": [{"value": 10}, {"value": 11}]},
//!   {"value": 2, "fails": true}
//! ]}
//! ```

use serde::{Deserialize, Serialize};

use canopy_search::contract::TechniqueChange;
use canopy_search::error::PropagationFailure;
use canopy_search::goal::{Goal, ThresholdGoal};
use canopy_search::limit::{Limit, NodeLimit};
use canopy_search::policy::TechniqueChoice;

use crate::contract::{ExpansionV1, SearchWorldV1};

/// Description of the change a scripted node requests on activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptedChangeV1 {
    pub technique: Option<TechniqueChoice>,
    /// Replace the goal with a [`ThresholdGoal`] at this minimum.
    pub minimum: Option<i64>,
    /// Replace the limit with a [`NodeLimit`] of this size.
    pub max_nodes: Option<u64>,
}

impl ScriptedChangeV1 {
    #[must_use]
    pub fn technique(choice: TechniqueChoice) -> Self {
        Self {
            technique: Some(choice),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn build(&self) -> TechniqueChange {
        TechniqueChange {
            technique: self.technique.map(TechniqueChoice::build),
            goal: self
                .minimum
                .map(|minimum| Box::new(ThresholdGoal::new(minimum)) as Box<dyn Goal>),
            limit: self
                .max_nodes
                .map(|max| Box::new(NodeLimit::new(max)) as Box<dyn Limit>),
        }
    }
}

/// One node of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedNodeV1 {
    pub value: i64,
    #[serde(default)]
    pub fails: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<ScriptedChangeV1>,
    #[serde(default)]
    pub children: Vec<ScriptedNodeV1>,
}

impl ScriptedNodeV1 {
    #[must_use]
    pub fn leaf(value: i64) -> Self {
        Self::branch(value, Vec::new())
    }

    #[must_use]
    pub fn branch(value: i64, children: Vec<ScriptedNodeV1>) -> Self {
        Self {
            value,
            fails: false,
            change: None,
            children,
        }
    }

    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fails = true;
        self
    }

    #[must_use]
    pub fn switching(mut self, change: ScriptedChangeV1) -> Self {
        self.change = Some(change);
        self
    }

    /// Number of nodes in this subtree.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Self::size).sum::<usize>()
    }
}

/// World whose states are paths into a fixed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedWorld {
    root: ScriptedNodeV1,
}

impl ScriptedWorld {
    #[must_use]
    pub fn new(root: ScriptedNodeV1) -> Self {
        Self { root }
    }

    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed scripts or unknown fields.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self::new)
    }

    #[must_use]
    pub fn root(&self) -> &ScriptedNodeV1 {
        &self.root
    }

    /// Script node at `path`, if the path exists.
    #[must_use]
    pub fn node_at(&self, path: &[usize]) -> Option<&ScriptedNodeV1> {
        path.iter()
            .try_fold(&self.root, |node, &index| node.children.get(index))
    }
}

impl SearchWorldV1 for ScriptedWorld {
    type State = Vec<usize>;

    fn world_id(&self) -> &str {
        "scripted"
    }

    fn root_state(&self) -> Vec<usize> {
        Vec::new()
    }

    fn expand(
        &self,
        state: &Vec<usize>,
        _depth: usize,
        _goal: Option<&dyn Goal>,
    ) -> Result<ExpansionV1<Vec<usize>>, PropagationFailure> {
        let node = self
            .node_at(state)
            .ok_or_else(|| PropagationFailure::new(format!("no scripted node at {state:?}")))?;
        if node.fails {
            return Err(PropagationFailure::new(format!(
                "scripted failure at {state:?}"
            )));
        }
        let children = (0..node.children.len())
            .map(|index| {
                let mut path = state.clone();
                path.push(index);
                path
            })
            .collect();
        let expansion = ExpansionV1::branch(children);
        Ok(match &node.change {
            Some(change) => expansion.with_change(change.build()),
            None => expansion,
        })
    }

    fn objective(&self, state: &Vec<usize>) -> Option<i64> {
        self.node_at(state).map(|node| node.value)
    }

    fn describe(&self, state: &Vec<usize>) -> serde_json::Value {
        serde_json::json!({
            "path": state,
            "value": self.objective(state),
        })
    }
}
