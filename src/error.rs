//! Error types for the replisync library
//!
//! Errors are split into two tiers. The variants in [`SyncError`] are the
//! only failures that abort a run; everything that can go wrong for a single
//! entry (a copy, a delete, a mkdir) is caught at the entry, logged, and
//! recorded on the run's [`SyncReport`](crate::types::SyncReport) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the replisync library
pub type Result<T> = std::result::Result<T, SyncError>;

/// Fatal errors that abort a synchronization run
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source root did not exist at run start
    #[error("source directory not found: {path:?}")]
    SourceMissing {
        /// Path that was expected to be the source root
        path: PathBuf,
    },

    /// I/O error outside the per-entry recovery scope (e.g. creating the
    /// replica root)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source traversal failed mid-enumeration
    ///
    /// Enumeration failures abort the run: a partially enumerated source
    /// must never drive the deletion pass.
    #[error("source enumeration failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// A walked entry was not located under the tree root it came from
    #[error("path {path:?} is not under root {root:?}")]
    PathOutsideRoot {
        /// The offending path
        path: PathBuf,
        /// The tree root it was expected under
        root: PathBuf,
    },

    /// Invalid source/replica pairing or options
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SyncError {
    /// Create a configuration error with a custom message
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        SyncError::InvalidConfiguration(msg.into())
    }

    /// Create a source-missing error for the given path
    pub fn source_missing(path: impl Into<PathBuf>) -> Self {
        SyncError::SourceMissing { path: path.into() }
    }

    /// Check whether this error indicates a missing source root
    ///
    /// Callers running on an interval may want to distinguish a vanished
    /// source from other fatal failures.
    pub fn is_source_missing(&self) -> bool {
        matches!(self, SyncError::SourceMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::source_missing("/no/such/dir");
        assert_eq!(
            err.to_string(),
            "source directory not found: \"/no/such/dir\""
        );
    }

    #[test]
    fn test_source_missing_predicate() {
        assert!(SyncError::source_missing("/x").is_source_missing());
        assert!(!SyncError::invalid_configuration("bad").is_source_missing());
    }
}
