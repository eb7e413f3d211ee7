//! Error types for build synchronization
//!
//! Provides error handling for:
//! - Store operations (fetch, replace, saved-build CRUD)
//! - Detached pushes (timeouts, aborted tasks)

use pickapart_build::{SavedBuildId, UserId};
use std::path::PathBuf;

/// Errors reported by a [`BuildStore`](crate::BuildStore)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("transport error: {0}")]
    Transport(String),

    /// Saved build does not exist for this user
    #[error("saved build {id} not found for user {user}")]
    SavedBuildNotFound {
        /// Owner
        user: UserId,
        /// Requested id
        id: SavedBuildId,
    },

    /// IO error on a file-backed store
    #[error("io error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Stored document could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create transport error
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create IO error for path
    #[inline]
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if the backend was unreachable
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Io { .. })
    }

    /// Check if a saved build was missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SavedBuildNotFound { .. })
    }
}

/// Synchronization errors
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Store call failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Push did not complete in time
    #[error("push timed out after {timeout_ms}ms")]
    PushTimedOut {
        /// Configured limit
        timeout_ms: u64,
    },

    /// Push task panicked or was cancelled
    #[error("push aborted: {0}")]
    PushAborted(String),
}

impl SyncError {
    /// Check if a saved build was missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}
