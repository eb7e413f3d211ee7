//! Detached pushes of the current build
//!
//! A push overwrites the remote current build and runs on its own task.
//! Callers never wait for it; failures are logged and the local copy stays
//! authoritative until the next session start. Tests and short-lived
//! processes can still await the outcome through [`PendingPush::settled`].
//!
//! Pushes from one reconciler share a [`PushOrder`]: they reach the store
//! one at a time, and a push overtaken by a later one is dropped, so the
//! remote always ends on the newest build.

use crate::error::SyncError;
use crate::store::BuildStore;
use pickapart_build::{Build, UserId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// Orders writes of the current build issued by one reconciler
#[derive(Debug, Default)]
pub(crate) struct PushOrder {
    issued: AtomicU64,
    landed: Mutex<u64>,
}

impl PushOrder {
    /// Next ticket; tickets increase in issue order
    pub(crate) fn ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Wait for earlier writes to finish
    ///
    /// Returns `None` if a later ticket already went through. The guard
    /// keeps other writes out until it is dropped.
    pub(crate) async fn admit(&self, ticket: u64) -> Option<MutexGuard<'_, u64>> {
        let mut landed = self.landed.lock().await;
        if *landed >= ticket {
            return None;
        }
        *landed = ticket;
        Some(landed)
    }
}

/// Handle to an in-flight push
#[derive(Debug)]
pub struct PendingPush {
    handle: JoinHandle<Result<(), SyncError>>,
}

impl PendingPush {
    /// Spawn a push on the current runtime
    ///
    /// Returns `None`, after logging, when no runtime is available.
    pub(crate) fn spawn<S>(
        store: Arc<S>,
        order: Arc<PushOrder>,
        user: UserId,
        build: Build,
        timeout: Duration,
    ) -> Option<Self>
    where
        S: BuildStore + ?Sized + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(user = %user, "no async runtime, push skipped");
            return None;
        };
        let ticket = order.ticket();

        let handle = runtime.spawn(async move {
            let Some(_turn) = order.admit(ticket).await else {
                tracing::debug!(user = %user, ticket, "push superseded by a newer build");
                return Ok(());
            };

            let result = match tokio::time::timeout(timeout, store.replace_current_build(&user, &build)).await {
                Ok(result) => result.map_err(SyncError::from),
                Err(_) => Err(SyncError::PushTimedOut {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };

            match &result {
                Ok(()) => tracing::debug!(
                    user = %user,
                    ticket,
                    categories = build.populated_count(),
                    "pushed current build"
                ),
                Err(e) => tracing::warn!(user = %user, error = %e, "push failed, keeping local build"),
            }
            result
        });

        Some(Self { handle })
    }

    /// Whether the push has completed
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the push outcome
    pub async fn settled(self) -> Result<(), SyncError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(SyncError::PushAborted(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn later_ticket_shuts_out_earlier_one() {
        let order = PushOrder::default();
        let first = order.ticket();
        let second = order.ticket();
        assert!(second > first);

        drop(order.admit(second).await.unwrap());
        assert!(order.admit(first).await.is_none());
    }

    #[tokio::test]
    async fn tickets_in_order_are_all_admitted() {
        let order = PushOrder::default();
        let first = order.ticket();
        let second = order.ticket();

        assert!(order.admit(first).await.is_some());
        assert!(order.admit(second).await.is_some());
    }
}
