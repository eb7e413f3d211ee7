//! Session-local build cache
//!
//! The client keeps its own copy of the current build so an anonymous or
//! offline session still has one. [`LocalCache`] is infallible by contract:
//! a cache that cannot be read yields an empty build.

use parking_lot::Mutex;
use pickapart_build::Build;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Session-scoped mirror of the current build
pub trait LocalCache: Send + Sync {
    /// Current cached build (empty if none)
    fn read(&self) -> Build;

    /// Replace the cached build as a whole
    fn write(&self, build: &Build);

    /// Forget the cached build (logout)
    fn clear(&self);
}

/// In-process cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    build: Mutex<Build>,
    writes: AtomicUsize,
}

impl MemoryCache {
    /// Create an empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding `build`
    #[inline]
    #[must_use]
    pub fn with_build(build: Build) -> Self {
        Self {
            build: Mutex::new(build),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `write` calls so far
    #[inline]
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl LocalCache for MemoryCache {
    fn read(&self) -> Build {
        self.build.lock().clone()
    }

    fn write(&self, build: &Build) {
        *self.build.lock() = build.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn clear(&self) {
        *self.build.lock() = Build::new();
    }
}

/// JSON file cache stored at `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    /// Cache for `key` inside `dir`
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, text: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl LocalCache for FileCache {
    fn read(&self) -> Build {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Build::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "local cache unreadable");
                return Build::new();
            }
        };

        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "local cache corrupt, starting empty");
            Build::new()
        })
    }

    fn write(&self, build: &Build) {
        let result = serde_json::to_string(build)
            .map_err(std::io::Error::from)
            .and_then(|text| self.write_atomic(&text));

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write local cache");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to clear local cache");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickapart_build::BuildItem;
    use std::num::NonZeroU32;

    fn sample() -> Build {
        Build::new().upsert("cpu", BuildItem::new("c1", "CPU", "$300"), NonZeroU32::MIN)
    }

    #[test]
    fn memory_cache_round_trip() {
        let cache = MemoryCache::new();
        assert!(cache.read().is_empty());

        cache.write(&sample());
        assert_eq!(cache.read(), sample());
        assert_eq!(cache.write_count(), 1);

        cache.clear();
        assert!(cache.read().is_empty());
    }

    #[test]
    fn file_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), "currentBuild");

        assert!(cache.read().is_empty());
        cache.write(&sample());
        assert!(cache.path().ends_with("currentBuild.json"));
        assert_eq!(cache.read(), sample());

        cache.clear();
        assert!(cache.read().is_empty());
        cache.clear();
    }

    #[test]
    fn file_cache_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested/session"), "currentBuild");
        cache.write(&sample());
        assert_eq!(cache.read(), sample());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), "currentBuild");
        std::fs::write(cache.path(), "{not json").unwrap();
        assert!(cache.read().is_empty());
    }
}
