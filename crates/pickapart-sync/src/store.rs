//! Server-side build store
//!
//! [`BuildStore`] is the persistence boundary: one document per user holding
//! the current build and the saved builds. Writes replace a whole document
//! field; there is no version check, so the last successful write wins.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use pickapart_build::{Build, NewSavedBuild, SavedBuild, SavedBuildId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-user persistence consumed by the reconciler
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildStore: Send + Sync {
    /// Current build, `None` if the user or build document does not exist
    async fn fetch_current_build(&self, user: &UserId) -> Result<Option<Build>, StoreError>;

    /// Overwrite the current build
    async fn replace_current_build(&self, user: &UserId, build: &Build) -> Result<(), StoreError>;

    /// Append a saved build, returning it with its id and timestamp
    async fn append_saved_build(
        &self,
        user: &UserId,
        build: NewSavedBuild,
    ) -> Result<SavedBuild, StoreError>;

    /// Append a saved build and make its parts the current build
    ///
    /// Both changes land in one document write.
    async fn save_build(&self, user: &UserId, build: NewSavedBuild) -> Result<SavedBuild, StoreError>;

    /// Saved builds in creation order
    async fn list_saved_builds(&self, user: &UserId) -> Result<Vec<SavedBuild>, StoreError>;

    /// One saved build
    async fn get_saved_build(
        &self,
        user: &UserId,
        id: SavedBuildId,
    ) -> Result<SavedBuild, StoreError>;

    /// Delete a saved build
    async fn delete_saved_build(&self, user: &UserId, id: SavedBuildId) -> Result<(), StoreError>;
}

/// Stored per-user document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    /// In-progress build
    #[serde(default)]
    pub current_build: Build,

    /// Saved snapshots, oldest first
    #[serde(default)]
    pub builds: Vec<SavedBuild>,
}

impl UserDocument {
    /// Stamp and append a saved build
    pub fn append(&mut self, build: NewSavedBuild) -> SavedBuild {
        let saved = build.into_saved(SavedBuildId::new(), Utc::now());
        self.builds.push(saved.clone());
        saved
    }

    /// Append a saved build and adopt its parts as the current build
    pub fn save(&mut self, build: NewSavedBuild) -> SavedBuild {
        let saved = self.append(build);
        self.current_build = saved.parts().clone();
        saved
    }

    /// Find a saved build
    #[must_use]
    pub fn find_saved(&self, id: SavedBuildId) -> Option<&SavedBuild> {
        self.builds.iter().find(|b| b.id() == id)
    }

    /// Remove a saved build, reporting whether it existed
    pub fn remove_saved(&mut self, id: SavedBuildId) -> bool {
        let before = self.builds.len();
        self.builds.retain(|b| b.id() != id);
        self.builds.len() != before
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, UserDocument>,
    replaces: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user document
    pub fn seed(&self, user: UserId, document: UserDocument) {
        self.users.insert(user, document);
    }

    /// Snapshot of a user document
    #[must_use]
    pub fn document(&self, user: &UserId) -> Option<UserDocument> {
        self.users.get(user).map(|doc| doc.clone())
    }

    /// Number of successful `replace_current_build` calls
    #[inline]
    #[must_use]
    pub fn replace_count(&self) -> usize {
        self.replaces.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildStore for MemoryStore {
    async fn fetch_current_build(&self, user: &UserId) -> Result<Option<Build>, StoreError> {
        Ok(self.users.get(user).map(|doc| doc.current_build.clone()))
    }

    async fn replace_current_build(&self, user: &UserId, build: &Build) -> Result<(), StoreError> {
        self.users.entry(user.clone()).or_default().current_build = build.clone();
        self.replaces.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn append_saved_build(
        &self,
        user: &UserId,
        build: NewSavedBuild,
    ) -> Result<SavedBuild, StoreError> {
        Ok(self.users.entry(user.clone()).or_default().append(build))
    }

    async fn save_build(&self, user: &UserId, build: NewSavedBuild) -> Result<SavedBuild, StoreError> {
        Ok(self.users.entry(user.clone()).or_default().save(build))
    }

    async fn list_saved_builds(&self, user: &UserId) -> Result<Vec<SavedBuild>, StoreError> {
        Ok(self
            .users
            .get(user)
            .map(|doc| doc.builds.clone())
            .unwrap_or_default())
    }

    async fn get_saved_build(
        &self,
        user: &UserId,
        id: SavedBuildId,
    ) -> Result<SavedBuild, StoreError> {
        self.users
            .get(user)
            .and_then(|doc| doc.find_saved(id).cloned())
            .ok_or_else(|| StoreError::SavedBuildNotFound {
                user: user.clone(),
                id,
            })
    }

    async fn delete_saved_build(&self, user: &UserId, id: SavedBuildId) -> Result<(), StoreError> {
        let removed = self
            .users
            .get_mut(user)
            .is_some_and(|mut doc| doc.remove_saved(id));

        if removed {
            Ok(())
        } else {
            Err(StoreError::SavedBuildNotFound {
                user: user.clone(),
                id,
            })
        }
    }
}
