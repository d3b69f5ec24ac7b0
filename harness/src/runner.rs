//! Harness runner: drives a world through the search driver and packages
//! the outcome as a deterministic report.
//!
//! # Pipeline
//!
//! ```text
//! config.validate() → ArenaRoot.materialize(world) → Search::from_config
//!   → [next_solution() × N] → describe solutions
//!   → digests (config, solutions, trace) → SearchReportV1
//! ```
//!
//! Two runs of the same world with the same configuration produce
//! byte-identical canonical reports, and therefore the same report digest.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use canopy_kernel::proof::canon::{canonical_json_bytes, CanonError};
use canopy_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use canopy_search::contract::{RootAction, SearchTree};
use canopy_search::error::SearchError;
use canopy_search::goal::Goal;
use canopy_search::policy::SearchConfig;
use canopy_search::search::{Search, SearchStats, SearchStatus};

use crate::arena::ArenaRoot;
use crate::contract::SearchWorldV1;

/// Report file written by [`write_report`].
pub const REPORT_FILENAME: &str = "search_report.json";
/// Digest file written by [`write_report`].
pub const DIGEST_FILENAME: &str = "search_report_digest.txt";

/// Error during a harness run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("search configuration rejected: {0}")]
    Search(#[from] SearchError),
    #[error("canonical JSON failed: {0}")]
    Canon(#[from] CanonError),
    #[error("solution cap must be at least 1")]
    SolutionCap,
    #[error("report I/O failed: {detail}")]
    Io { detail: String },
}

/// One delivered solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionV1 {
    /// Child indices from the root.
    pub path: Vec<usize>,
    pub objective: Option<i64>,
    /// World-provided description of the solution state.
    pub description: serde_json::Value,
}

impl SolutionV1 {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "description": self.description,
            "objective": self.objective,
            "path": self.path,
        })
    }
}

/// Outcome of a harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReportV1 {
    pub world_id: String,
    pub config: SearchConfig,
    /// `canonical_hash(SearchConfig, canonical config bytes)`.
    pub config_digest: ContentHash,
    pub solutions: Vec<SolutionV1>,
    /// `canonical_hash(SolutionSet, canonical solution list bytes)`.
    pub solutions_digest: ContentHash,
    pub stats: SearchStats,
    pub status: SearchStatus,
    /// Present when the configuration recorded a trace.
    pub trace_digest: Option<ContentHash>,
    /// True when the run stopped at the solution cap.
    pub truncated: bool,
}

impl SearchReportV1 {
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "config": self.config.to_json(),
            "config_digest": self.config_digest.as_str(),
            "schema_version": "search_report.v1",
            "solutions": self.solutions.iter().map(SolutionV1::to_json).collect::<Vec<_>>(),
            "solutions_digest": self.solutions_digest.as_str(),
            "stats": self.stats.to_json(),
            "status": status_str(self.status),
            "trace_digest": self.trace_digest.as_ref().map(ContentHash::as_str),
            "truncated": self.truncated,
            "world_id": self.world_id,
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if a world description contains a non-integer
    /// number.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// `canonical_hash(SearchReport, canonical report bytes)`.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(HashDomain::SearchReport, &bytes))
    }

    #[must_use]
    pub fn solution_count(&self) -> usize {
        self.solutions.len()
    }
}

fn status_str(status: SearchStatus) -> &'static str {
    match status {
        SearchStatus::Exploring => "exploring",
        SearchStatus::SolutionFound => "solution_found",
        SearchStatus::LimitReached => "limit_reached",
        SearchStatus::Exhausted => "exhausted",
    }
}

/// Search `world` under `config` and report every delivered solution.
///
/// `goal` is installed before the first call; with a goal and
/// `continually_improve` unset the driver enumerates first and replays.
/// `max_solutions` stops the run after that many solutions.
///
/// # Errors
///
/// Returns [`RunError::Search`] for an invalid configuration,
/// [`RunError::SolutionCap`] for a zero cap, and [`RunError::Canon`] when a
/// digest surface cannot be canonicalized.
pub fn run_world<W: SearchWorldV1>(
    world: W,
    config: &SearchConfig,
    goal: Option<Box<dyn Goal>>,
    max_solutions: Option<usize>,
) -> Result<SearchReportV1, RunError> {
    config.validate()?;
    if max_solutions == Some(0) {
        return Err(RunError::SolutionCap);
    }

    let world_id = world.world_id().to_string();
    info!(world_id = %world_id, technique = ?config.technique, "search run started");

    let config_bytes = canonical_json_bytes(&config.to_json())?;
    let config_digest = canonical_hash(HashDomain::SearchConfig, &config_bytes);

    let mut search = Search::from_config(ArenaRoot.materialize(world), config);
    if let Some(goal) = goal {
        search.set_goal(goal);
    }

    let mut solutions = Vec::new();
    let mut truncated = false;
    while search.next_solution() {
        let tree = search.tree();
        let node = tree.current_node();
        let solution = SolutionV1 {
            path: tree.reference_for_node(node).into_path(),
            objective: tree.objective(node),
            description: tree.describe(node),
        };
        debug!(index = solutions.len(), path = ?solution.path, "solution delivered");
        solutions.push(solution);
        if max_solutions.is_some_and(|cap| solutions.len() >= cap) {
            truncated = true;
            break;
        }
    }

    let solution_values: Vec<serde_json::Value> =
        solutions.iter().map(SolutionV1::to_json).collect();
    let solutions_bytes = canonical_json_bytes(&serde_json::Value::Array(solution_values))?;
    let solutions_digest = canonical_hash(HashDomain::SolutionSet, &solutions_bytes);
    let trace_digest = search.trace().map(|trace| trace.digest()).transpose()?;

    info!(
        world_id = %world_id,
        solutions = solutions.len(),
        activations = search.stats().activations,
        truncated,
        "search run complete"
    );

    Ok(SearchReportV1 {
        world_id,
        config: config.clone(),
        config_digest,
        solutions,
        solutions_digest,
        stats: *search.stats(),
        status: search.status(),
        trace_digest,
        truncated,
    })
}

/// Write the canonical report and its digest into `dir`.
///
/// Returns the path of the report file.
///
/// # Errors
///
/// Returns [`RunError::Io`] on I/O failure or [`RunError::Canon`] if the
/// report cannot be canonicalized.
pub fn write_report(report: &SearchReportV1, dir: &Path) -> Result<PathBuf, RunError> {
    std::fs::create_dir_all(dir).map_err(|e| RunError::Io {
        detail: format!("create_dir_all: {e}"),
    })?;

    let bytes = report.to_canonical_json_bytes()?;
    let digest = canonical_hash(HashDomain::SearchReport, &bytes);
    let report_path = dir.join(REPORT_FILENAME);
    write_atomic(&report_path, &bytes)?;
    write_atomic(&dir.join(DIGEST_FILENAME), digest.as_str().as_bytes())?;
    Ok(report_path)
}

/// Write bytes to a path via temp file + rename.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), RunError> {
    let dir = path.parent().ok_or_else(|| RunError::Io {
        detail: "no parent directory".into(),
    })?;
    let temp_name = format!(
        ".tmp_{}",
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    let temp_path = dir.join(temp_name);

    std::fs::write(&temp_path, content).map_err(|e| RunError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| RunError::Io {
        detail: format!("rename {} → {}: {e}", temp_path.display(), path.display()),
    })?;
    Ok(())
}
