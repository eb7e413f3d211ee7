//! Reconcile policy
//!
//! Provides the [`SyncPolicy`] trait for deciding which copy of a build wins
//! when a session starts, and [`CountPrecedence`], the policy the storefront
//! ships with.

use pickapart_build::Build;

/// Decision reached by a [`SyncPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Replace the local cache with the remote build
    AdoptRemote,

    /// Keep the local build
    KeepLocal {
        /// Overwrite the remote with the local build
        push: bool,
    },
}

impl Resolution {
    /// Whether the local build should be pushed
    #[inline]
    #[must_use]
    pub fn pushes(self) -> bool {
        matches!(self, Self::KeepLocal { push: true })
    }
}

/// Which copy the reconciled build came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSource {
    /// Session cache
    Local,
    /// Server store
    Remote,
}

/// Decides between the local and remote build at session start
///
/// Implementations must be pure: the same inputs always give the same
/// resolution.
pub trait SyncPolicy: Send + Sync + std::fmt::Debug {
    /// Resolve `local` against `remote`
    ///
    /// `remote` is `None` when the fetch failed or timed out, and an empty
    /// build when the user simply has none.
    fn decide(&self, local: &Build, remote: Option<&Build>) -> Resolution;

    /// Policy name (for logging)
    fn name(&self) -> &'static str;
}

/// Copy with more populated categories wins, ties go to the remote
///
/// The count is the number of non-empty category slots, not the number of
/// items or units. An empty remote never displaces a populated local build.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountPrecedence;

impl SyncPolicy for CountPrecedence {
    fn decide(&self, local: &Build, remote: Option<&Build>) -> Resolution {
        let local_count = local.populated_count();

        let Some(remote) = remote else {
            return Resolution::KeepLocal {
                push: local_count > 0,
            };
        };
        let remote_count = remote.populated_count();

        if remote_count == 0 && local_count > 0 {
            Resolution::KeepLocal { push: true }
        } else if remote_count >= local_count {
            Resolution::AdoptRemote
        } else {
            Resolution::KeepLocal { push: true }
        }
    }

    fn name(&self) -> &'static str {
        "count_precedence"
    }
}
