//! Search configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! [`SearchConfig::validate`] rejects budgets that could never admit a node.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::limit::{CompositeLimit, Limit, NodeLimit, TimeLimit};
use crate::technique::{DepthFirstSearch, ReverseDepthFirstSearch, Technique};

/// Which stock technique the driver starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueChoice {
    #[default]
    DepthFirst,
    ReverseDepthFirst,
}

impl TechniqueChoice {
    #[must_use]
    pub fn build(self) -> Box<dyn Technique> {
        match self {
            Self::DepthFirst => Box::new(DepthFirstSearch),
            Self::ReverseDepthFirst => Box::new(ReverseDepthFirstSearch),
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Technique in control at the true root.
    pub technique: TechniqueChoice,
    /// Stream every accepted solution instead of enumerating all first.
    pub continually_improve: bool,
    /// Node budget (see [`NodeLimit`]).
    pub max_nodes: Option<u64>,
    /// Wall-clock budget in milliseconds (see [`TimeLimit`]).
    pub time_limit_ms: Option<u64>,
    /// Record a [`crate::trace::SearchTraceV1`] while searching.
    pub record_trace: bool,
}

impl SearchConfig {
    /// Check that every configured budget can admit at least one node.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] for a zero node or time budget.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_nodes == Some(0) {
            return Err(SearchError::InvalidConfig {
                detail: "max_nodes must be at least 1".into(),
            });
        }
        if self.time_limit_ms == Some(0) {
            return Err(SearchError::InvalidConfig {
                detail: "time_limit_ms must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Parse a JSON config and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigParse`] for malformed JSON or unknown
    /// fields, and [`SearchError::InvalidConfig`] if validation fails.
    pub fn from_json_str(text: &str) -> Result<Self, SearchError> {
        let config: Self = serde_json::from_str(text).map_err(|e| SearchError::ConfigParse {
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The limit described by the budgets, or `None` when unbounded.
    #[must_use]
    pub fn build_limit(&self) -> Option<Box<dyn Limit>> {
        let mut limits: Vec<Box<dyn Limit>> = Vec::new();
        if let Some(max_nodes) = self.max_nodes {
            limits.push(Box::new(NodeLimit::new(max_nodes)));
        }
        if let Some(ms) = self.time_limit_ms {
            limits.push(Box::new(TimeLimit::new(Duration::from_millis(ms))));
        }
        if limits.len() <= 1 {
            return limits.pop();
        }
        let mut composite = CompositeLimit::new();
        for limit in limits {
            composite.push(limit);
        }
        Some(Box::new(composite))
    }

    /// Config as a JSON value (for reports and digests).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "continually_improve": self.continually_improve,
            "max_nodes": self.max_nodes,
            "record_trace": self.record_trace,
            "technique": match self.technique {
                TechniqueChoice::DepthFirst => "depth_first",
                TechniqueChoice::ReverseDepthFirst => "reverse_depth_first",
            },
            "time_limit_ms": self.time_limit_ms,
        })
    }
}
