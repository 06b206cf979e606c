//! Common error types for rastercheck

use thiserror::Error;

use crate::grid::Source;

/// Result type for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Feed timestamp that does not normalize to `YYYY-MM-DDTHH:MM:SS±HHMM`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid date-time {input:?}: expected YYYY-MM-DD HH:MM[:SS]")]
pub struct TimeParseError {
    pub input: String,
}

impl TimeParseError {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Failures that abort a reconciliation run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Second record from a source whose duplicates are configured as fatal
    #[error("Duplicate {feed} entry at {key}: {existing:?} and {incoming:?}")]
    DuplicateEntry {
        feed: Source,
        key: String,
        existing: String,
        incoming: String,
    },
}
