//! Single-file JSON document store
//!
//! Keeps every user document in one JSON file. Each operation loads the
//! file, changes one document and writes the whole file back through a
//! temporary file and rename. A process-wide mutex serializes operations.

use crate::error::StoreError;
use crate::store::{BuildStore, UserDocument};
use async_trait::async_trait;
use pickapart_build::{Build, NewSavedBuild, SavedBuild, SavedBuildId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    users: BTreeMap<UserId, UserDocument>,
}

/// [`BuildStore`] backed by one JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Store at `path`; the file is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoreFile, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(StoreFile::default()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(StoreError::io_error(&self.path, e)),
        }
    }

    async fn persist(&self, file: &StoreFile) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(file)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io_error(dir, e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text)
            .await
            .map_err(|e| StoreError::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io_error(&self.path, e))
    }

    /// Load, mutate one user's document and persist
    async fn update<T>(
        &self,
        user: &UserId,
        f: impl FnOnce(&mut UserDocument) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let out = f(file.users.entry(user.clone()).or_default())?;
        self.persist(&file).await?;
        Ok(out)
    }

    async fn read_document(&self, user: &UserId) -> Result<Option<UserDocument>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.users.remove(user))
    }
}

#[async_trait]
impl BuildStore for JsonFileStore {
    async fn fetch_current_build(&self, user: &UserId) -> Result<Option<Build>, StoreError> {
        Ok(self.read_document(user).await?.map(|doc| doc.current_build))
    }

    async fn replace_current_build(&self, user: &UserId, build: &Build) -> Result<(), StoreError> {
        self.update(user, |doc| {
            doc.current_build = build.clone();
            Ok(())
        })
        .await
    }

    async fn append_saved_build(
        &self,
        user: &UserId,
        build: NewSavedBuild,
    ) -> Result<SavedBuild, StoreError> {
        self.update(user, |doc| Ok(doc.append(build))).await
    }

    async fn save_build(&self, user: &UserId, build: NewSavedBuild) -> Result<SavedBuild, StoreError> {
        self.update(user, |doc| Ok(doc.save(build))).await
    }

    async fn list_saved_builds(&self, user: &UserId) -> Result<Vec<SavedBuild>, StoreError> {
        Ok(self
            .read_document(user)
            .await?
            .map(|doc| doc.builds)
            .unwrap_or_default())
    }

    async fn get_saved_build(
        &self,
        user: &UserId,
        id: SavedBuildId,
    ) -> Result<SavedBuild, StoreError> {
        self.read_document(user)
            .await?
            .and_then(|doc| doc.find_saved(id).cloned())
            .ok_or_else(|| StoreError::SavedBuildNotFound {
                user: user.clone(),
                id,
            })
    }

    async fn delete_saved_build(&self, user: &UserId, id: SavedBuildId) -> Result<(), StoreError> {
        self.update(user, |doc| {
            if doc.remove_saved(id) {
                Ok(())
            } else {
                Err(StoreError::SavedBuildNotFound {
                    user: user.clone(),
                    id,
                })
            }
        })
        .await
    }
}
