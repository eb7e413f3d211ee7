//! Testing utilities for the PickAPart workspace
//!
//! Shared fixtures and store doubles.

#![allow(missing_docs)]

use async_trait::async_trait;
use pickapart_build::{Build, BuildItem, NewSavedBuild, SavedBuild, SavedBuildId, UserId};
use pickapart_sync::{BuildStore, MemoryStore, StoreError};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const ONE: NonZeroU32 = NonZeroU32::MIN;

pub fn qty(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

pub fn user() -> UserId {
    UserId::from("test-user")
}

pub fn cpu() -> BuildItem {
    BuildItem::new("cpu-7800x3d", "AMD Ryzen 7 7800X3D", "$449.00").with_brand("AMD")
}

pub fn other_cpu() -> BuildItem {
    BuildItem::new("cpu-14600k", "Intel Core i5-14600K", "$319.99").with_brand("Intel")
}

pub fn ram_stick() -> BuildItem {
    BuildItem::new("ram-ddr5-16", "DDR5-6000 16GB", "$54.99")
}

pub fn ssd() -> BuildItem {
    BuildItem::new("ssd-2tb", "NVMe SSD 2TB", "$129.99")
}

pub fn gpu() -> BuildItem {
    BuildItem::new("gpu-4070", "GeForce RTX 4070", "$599.00").with_image("https://img.example/4070.png")
}

pub fn case() -> BuildItem {
    BuildItem::new("case-h5", "Mid Tower Case", "$89.99")
}

/// `{cpu}`
pub fn cpu_build() -> Build {
    Build::new().upsert("cpu", cpu(), ONE)
}

/// `{cpu, memory: [ram], storage: [ssd]}`
pub fn three_category_build() -> Build {
    Build::new()
        .upsert("cpu", cpu(), ONE)
        .upsert("memory", ram_stick(), ONE)
        .upsert("storage", ssd(), ONE)
}

/// Store whose every call fails with a transport error
#[derive(Debug, Default)]
pub struct FailingStore {
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::transport("store unreachable"))
    }
}

#[async_trait]
impl BuildStore for FailingStore {
    async fn fetch_current_build(&self, _user: &UserId) -> Result<Option<Build>, StoreError> {
        self.fail()
    }

    async fn replace_current_build(&self, _user: &UserId, _build: &Build) -> Result<(), StoreError> {
        self.fail()
    }

    async fn append_saved_build(
        &self,
        _user: &UserId,
        _build: NewSavedBuild,
    ) -> Result<SavedBuild, StoreError> {
        self.fail()
    }

    async fn save_build(&self, _user: &UserId, _build: NewSavedBuild) -> Result<SavedBuild, StoreError> {
        self.fail()
    }

    async fn list_saved_builds(&self, _user: &UserId) -> Result<Vec<SavedBuild>, StoreError> {
        self.fail()
    }

    async fn get_saved_build(
        &self,
        _user: &UserId,
        _id: SavedBuildId,
    ) -> Result<SavedBuild, StoreError> {
        self.fail()
    }

    async fn delete_saved_build(&self, _user: &UserId, _id: SavedBuildId) -> Result<(), StoreError> {
        self.fail()
    }
}

/// [`MemoryStore`] that sleeps before every call
#[derive(Debug)]
pub struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl BuildStore for SlowStore {
    async fn fetch_current_build(&self, user: &UserId) -> Result<Option<Build>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_current_build(user).await
    }

    async fn replace_current_build(&self, user: &UserId, build: &Build) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.replace_current_build(user, build).await
    }

    async fn append_saved_build(
        &self,
        user: &UserId,
        build: NewSavedBuild,
    ) -> Result<SavedBuild, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.append_saved_build(user, build).await
    }

    async fn save_build(&self, user: &UserId, build: NewSavedBuild) -> Result<SavedBuild, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.save_build(user, build).await
    }

    async fn list_saved_builds(&self, user: &UserId) -> Result<Vec<SavedBuild>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_saved_builds(user).await
    }

    async fn get_saved_build(
        &self,
        user: &UserId,
        id: SavedBuildId,
    ) -> Result<SavedBuild, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_saved_build(user, id).await
    }

    async fn delete_saved_build(&self, user: &UserId, id: SavedBuildId) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete_saved_build(user, id).await
    }
}
