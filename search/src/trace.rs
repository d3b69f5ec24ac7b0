//! `SearchTraceV1`: ordered audit log of one driver's decisions.
//!
//! The trace is optional (see [`crate::policy::SearchConfig::record_trace`]).
//! Two runs over the same tree, technique, goal and limit produce identical
//! canonical bytes, which is what the determinism lock tests compare.

use canopy_kernel::proof::canon::{canonical_json_bytes, CanonError};
use canopy_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

/// Why the driver pruned a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReasonV1 {
    /// The goal refused activation (fast reject).
    GoalRejected,
    /// Activation raised a propagation failure.
    PropagationFailed,
}

impl PruneReasonV1 {
    fn as_str(self) -> &'static str {
        match self {
            Self::GoalRejected => "goal_rejected",
            Self::PropagationFailed => "propagation_failed",
        }
    }
}

/// A single driver decision.
///
/// Paths are child-index paths from the true root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEventV1 {
    Descend { child: usize, depth: usize },
    Backtrack { depth: usize },
    Jump { path: Vec<usize> },
    Activate { path: Vec<usize> },
    Prune { path: Vec<usize>, reason: PruneReasonV1 },
    /// A technique change took effect at `path`.
    Suspend { path: Vec<usize>, suspension_depth: usize },
    /// A suspended context regained control at `path`.
    Resume { path: Vec<usize>, suspension_depth: usize },
    SolutionAccepted { path: Vec<usize> },
    SolutionRejected { path: Vec<usize> },
    LimitReached { path: Vec<usize> },
    Exhausted,
    Replay { index: usize, path: Vec<usize> },
}

impl SearchEventV1 {
    fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            Self::Descend { child, depth } => json!({"type": "descend", "child": child, "depth": depth}),
            Self::Backtrack { depth } => json!({"type": "backtrack", "depth": depth}),
            Self::Jump { path } => json!({"type": "jump", "path": path}),
            Self::Activate { path } => json!({"type": "activate", "path": path}),
            Self::Prune { path, reason } => {
                json!({"type": "prune", "path": path, "reason": reason.as_str()})
            }
            Self::Suspend {
                path,
                suspension_depth,
            } => json!({"type": "suspend", "path": path, "suspension_depth": suspension_depth}),
            Self::Resume {
                path,
                suspension_depth,
            } => json!({"type": "resume", "path": path, "suspension_depth": suspension_depth}),
            Self::SolutionAccepted { path } => json!({"type": "solution_accepted", "path": path}),
            Self::SolutionRejected { path } => json!({"type": "solution_rejected", "path": path}),
            Self::LimitReached { path } => json!({"type": "limit_reached", "path": path}),
            Self::Exhausted => json!({"type": "exhausted"}),
            Self::Replay { index, path } => json!({"type": "replay", "index": index, "path": path}),
        }
    }
}

/// The complete ordered event log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTraceV1 {
    pub events: Vec<SearchEventV1>,
}

impl SearchTraceV1 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SearchEventV1) {
        self.events.push(event);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "events": self.events.iter().map(SearchEventV1::to_json).collect::<Vec<_>>(),
            "schema_version": "search_trace.v1",
        })
    }

    /// Canonical JSON bytes of the trace.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails (not expected: every
    /// number in a trace is an integer).
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// Content digest of the canonical bytes.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`] from [`Self::to_canonical_json_bytes`].
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(HashDomain::SearchTrace, &bytes))
    }
}
