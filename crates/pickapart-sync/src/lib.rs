//! PickAPart Build Sync
//!
//! Keeps a session-local build and the server-stored build in agreement:
//! - [`BuildReconciler`]: session start reconcile plus cache-first edits
//! - [`SyncPolicy`]: pluggable decision between the two copies
//! - [`LocalCache`]: session storage ([`MemoryCache`], [`FileCache`])
//! - [`BuildStore`]: per-user server documents ([`MemoryStore`], [`JsonFileStore`])
//!
//! Server writes are detached: the caller gets the reconciled build at once
//! and may await the [`PendingPush`] only if it cares about the outcome.
//!
//! # Example
//!
//! ```rust
//! use pickapart_build::{Build, BuildItem, UserId};
//! use pickapart_sync::{BuildReconciler, BuildSource, MemoryCache, MemoryStore, SyncConfig};
//! use std::num::NonZeroU32;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let local = Build::new().upsert("cpu", BuildItem::new("c1", "Ryzen 5", "$199"), NonZeroU32::MIN);
//! let store = Arc::new(MemoryStore::new());
//! let cache = Arc::new(MemoryCache::with_build(local.clone()));
//! let reconciler = BuildReconciler::new(Arc::clone(&store), cache, SyncConfig::default());
//!
//! let user = UserId::from("alice");
//! let outcome = reconciler.start_session(Some(&user)).await;
//! assert_eq!(outcome.source, BuildSource::Local);
//!
//! let (build, pushed) = outcome.settle().await;
//! assert!(matches!(pushed, Some(Ok(()))));
//! assert_eq!(store.document(&user).unwrap().current_build, build);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cache;
mod config;
mod error;
mod file_store;
mod policy;
mod push;
mod reconciler;
mod store;

// Re-exports
pub use cache::{FileCache, LocalCache, MemoryCache};
pub use config::{SyncConfig, DEFAULT_SESSION_KEY};
pub use error::{StoreError, SyncError};
pub use file_store::JsonFileStore;
pub use policy::{BuildSource, CountPrecedence, Resolution, SyncPolicy};
pub use push::PendingPush;
pub use reconciler::{BuildReconciler, SyncOutcome};
pub use store::{BuildStore, MemoryStore, UserDocument};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use pickapart_build::{Build, BuildItem, UserId};
    use std::num::NonZeroU32;
    use std::sync::Arc;

    #[tokio::test]
    async fn file_backed_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("store.json")));
        let cache = Arc::new(FileCache::new(dir.path().join("session"), DEFAULT_SESSION_KEY));
        let reconciler = BuildReconciler::new(Arc::clone(&store), Arc::clone(&cache), SyncConfig::default());
        let user = UserId::from("u1");

        let outcome = reconciler.add_part(
            Some(&user),
            "memory",
            BuildItem::new("m1", "DDR5", "$60"),
            NonZeroU32::MIN,
        );
        outcome.push.unwrap().settled().await.unwrap();

        // A fresh session on another device adopts the pushed build.
        let other_cache = Arc::new(MemoryCache::new());
        let other = BuildReconciler::new(store, Arc::clone(&other_cache), SyncConfig::default());
        let adopted = other.start_session(Some(&user)).await;

        assert_eq!(adopted.source, BuildSource::Remote);
        assert_eq!(adopted.build, cache.read());
        assert_eq!(other_cache.read(), adopted.build);
    }

    #[tokio::test]
    async fn end_session_clears_cache() {
        let cache = Arc::new(MemoryCache::with_build(
            Build::new().upsert("case", BuildItem::new("k1", "Case", "$80"), NonZeroU32::MIN),
        ));
        let reconciler = BuildReconciler::new(Arc::new(MemoryStore::new()), Arc::clone(&cache), SyncConfig::default());

        reconciler.end_session();
        assert!(reconciler.current().is_empty());
    }
}
