//! Session reconciler
//!
//! [`BuildReconciler`] owns the local cache and the store handle. At session
//! start it decides which copy of the current build is authoritative and
//! overwrites the other. Afterwards every edit goes to the cache first and
//! then to the store as a detached push.

use crate::cache::LocalCache;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::policy::{BuildSource, CountPrecedence, Resolution, SyncPolicy};
use crate::push::{PendingPush, PushOrder};
use crate::store::BuildStore;
use pickapart_build::{resolve_name, Build, BuildItem, NewSavedBuild, SavedBuild, SavedBuildId, UserId};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Result of a reconcile or an edit
#[derive(Debug)]
pub struct SyncOutcome {
    /// Authoritative build, already written to the local cache
    pub build: Build,
    /// Which copy won
    pub source: BuildSource,
    /// Detached push, if one was started
    pub push: Option<PendingPush>,
}

impl SyncOutcome {
    fn local(build: Build, push: Option<PendingPush>) -> Self {
        Self {
            build,
            source: BuildSource::Local,
            push,
        }
    }

    /// Take the build and let any push finish on its own
    #[inline]
    #[must_use]
    pub fn into_build(self) -> Build {
        self.build
    }

    /// Wait for the push, if any, and return the build with its outcome
    pub async fn settle(self) -> (Build, Option<Result<(), SyncError>>) {
        let pushed = match self.push {
            Some(push) => Some(push.settled().await),
            None => None,
        };
        (self.build, pushed)
    }
}

/// Keeps the session cache and the server copy of a build in agreement
#[derive(Debug)]
pub struct BuildReconciler<S, C, P = CountPrecedence>
where
    S: BuildStore + ?Sized,
    C: LocalCache + ?Sized,
    P: SyncPolicy,
{
    store: Arc<S>,
    cache: Arc<C>,
    policy: P,
    config: SyncConfig,
    order: Arc<PushOrder>,
}

impl<S, C> BuildReconciler<S, C>
where
    S: BuildStore + ?Sized + 'static,
    C: LocalCache + ?Sized,
{
    /// Create reconciler with count precedence
    #[must_use]
    pub fn new(store: Arc<S>, cache: Arc<C>, config: SyncConfig) -> Self {
        Self {
            store,
            cache,
            policy: CountPrecedence,
            config,
            order: Arc::default(),
        }
    }
}

impl<S, C, P> BuildReconciler<S, C, P>
where
    S: BuildStore + ?Sized + 'static,
    C: LocalCache + ?Sized,
    P: SyncPolicy,
{
    /// Replace the reconcile policy
    #[must_use]
    pub fn with_policy<Q: SyncPolicy>(self, policy: Q) -> BuildReconciler<S, C, Q> {
        BuildReconciler {
            store: self.store,
            cache: self.cache,
            policy,
            config: self.config,
            order: self.order,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Cached build
    #[must_use]
    pub fn current(&self) -> Build {
        self.cache.read()
    }

    /// Start a session
    ///
    /// Anonymous sessions use the cache as is. Signed-in sessions fetch the
    /// remote build once and reconcile it against the cache.
    pub async fn start_session(&self, user: Option<&UserId>) -> SyncOutcome {
        let local = self.cache.read();
        let Some(user) = user else {
            tracing::debug!(categories = local.populated_count(), "anonymous session, using local build");
            return SyncOutcome::local(local, None);
        };

        let remote = self.fetch_remote(user).await;
        let outcome = self.reconcile(user, local, remote);
        tracing::info!(
            user = %user,
            source = ?outcome.source,
            categories = outcome.build.populated_count(),
            "session started"
        );
        outcome
    }

    /// Fetch the remote build with one bounded attempt
    ///
    /// A missing document is an empty build. A transport failure or timeout
    /// is `None`.
    pub async fn fetch_remote(&self, user: &UserId) -> Option<Build> {
        let timeout = self.config.fetch_timeout();
        match tokio::time::timeout(timeout, self.store.fetch_current_build(user)).await {
            Ok(Ok(build)) => Some(build.unwrap_or_default()),
            Ok(Err(e)) => {
                tracing::warn!(user = %user, error = %e, "fetch failed, using local build");
                None
            }
            Err(_) => {
                tracing::warn!(
                    user = %user,
                    timeout_ms = self.config.fetch_timeout_ms,
                    "fetch timed out, using local build"
                );
                None
            }
        }
    }

    /// Apply the policy to `local` and `remote`
    ///
    /// The winning build is written to the cache. The store is overwritten
    /// through a detached push when the local build wins.
    pub fn reconcile(&self, user: &UserId, local: Build, remote: Option<Build>) -> SyncOutcome {
        let resolution = self.policy.decide(&local, remote.as_ref());
        tracing::debug!(
            user = %user,
            policy = self.policy.name(),
            local = local.populated_count(),
            remote = remote.as_ref().map(Build::populated_count),
            ?resolution,
            "reconciled"
        );

        match (resolution, remote) {
            (Resolution::AdoptRemote, Some(remote)) => {
                self.cache.write(&remote);
                SyncOutcome {
                    build: remote,
                    source: BuildSource::Remote,
                    push: None,
                }
            }
            (resolution, _) => {
                self.cache.write(&local);
                let push = if resolution.pushes() {
                    self.push(user, &local)
                } else {
                    None
                };
                SyncOutcome::local(local, push)
            }
        }
    }

    /// Add `quantity` of `item` to `category`
    pub fn add_part(
        &self,
        user: Option<&UserId>,
        category: &str,
        item: BuildItem,
        quantity: NonZeroU32,
    ) -> SyncOutcome {
        tracing::debug!(category, id = %item.id, quantity = quantity.get(), "adding part");
        self.apply(user, |build| build.upsert(category, item, quantity))
    }

    /// Remove one item from `category`
    pub fn remove_part(&self, user: Option<&UserId>, category: &str, id: &str) -> SyncOutcome {
        self.apply(user, |build| build.without_item(category, id))
    }

    /// Remove a whole category
    pub fn remove_category(&self, user: Option<&UserId>, category: &str) -> SyncOutcome {
        self.apply(user, |build| build.without_category(category))
    }

    /// Empty the build
    pub fn clear_build(&self, user: Option<&UserId>) -> SyncOutcome {
        self.apply(user, Build::cleared)
    }

    fn apply(&self, user: Option<&UserId>, edit: impl FnOnce(&Build) -> Build) -> SyncOutcome {
        let next = edit(&self.cache.read());
        self.cache.write(&next);
        let push = user.and_then(|user| self.push(user, &next));
        SyncOutcome::local(next, push)
    }

    fn push(&self, user: &UserId, build: &Build) -> Option<PendingPush> {
        PendingPush::spawn(
            Arc::clone(&self.store),
            Arc::clone(&self.order),
            user.clone(),
            build.clone(),
            self.config.push_timeout(),
        )
    }

    /// Save the current build under `name`
    ///
    /// Saves the cached build, or the server's current build when the cache
    /// is empty. The snapshot and the new current build are written to the
    /// store together, after any push already in flight; pushes issued
    /// before the save that have not yet run are dropped.
    pub async fn save_build(&self, user: &UserId, name: Option<&str>) -> Result<SavedBuild, SyncError> {
        let local = self.cache.read();
        let from_cache = !local.is_empty();
        let parts = if from_cache {
            local
        } else {
            self.store.fetch_current_build(user).await?.unwrap_or_default()
        };

        let name = resolve_name(name, &self.config.default_build_name);
        let ticket = self.order.ticket();
        let _turn = self.order.admit(ticket).await;
        let saved = self
            .store
            .save_build(user, NewSavedBuild::new(name, parts.clone()))
            .await?;

        if !from_cache {
            self.cache.write(&parts);
        }

        tracing::info!(
            user = %user,
            id = %saved.id(),
            name = saved.name(),
            total = %saved.total_price(),
            "saved build"
        );
        Ok(saved)
    }

    /// Saved builds, oldest first
    pub async fn saved_builds(&self, user: &UserId) -> Result<Vec<SavedBuild>, SyncError> {
        Ok(self.store.list_saved_builds(user).await?)
    }

    /// One saved build
    pub async fn view_saved(&self, user: &UserId, id: SavedBuildId) -> Result<SavedBuild, SyncError> {
        Ok(self.store.get_saved_build(user, id).await?)
    }

    /// Delete a saved build
    pub async fn delete_saved(&self, user: &UserId, id: SavedBuildId) -> Result<(), SyncError> {
        self.store.delete_saved_build(user, id).await?;
        tracing::info!(user = %user, id = %id, "deleted saved build");
        Ok(())
    }

    /// End the session, forgetting the cached build
    pub fn end_session(&self) {
        self.cache.clear();
        tracing::debug!("session ended, local build cleared");
    }
}
