//! Typed search errors.
//!
//! [`PropagationFailure`] is the only error raised while searching, and the
//! driver always absorbs it by pruning. [`SearchError`] covers pre-flight
//! failures: configuration that cannot be parsed or is not usable.

use thiserror::Error;

/// Committing to a node is inconsistent with the constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("propagation failed: {detail}")]
pub struct PropagationFailure {
    pub detail: String,
}

impl PropagationFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Typed failure for pre-flight search validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A configuration value is outside its usable range.
    #[error("invalid search config: {detail}")]
    InvalidConfig { detail: String },
    /// Configuration text could not be deserialized.
    #[error("unparsable search config: {detail}")]
    ConfigParse { detail: String },
}
