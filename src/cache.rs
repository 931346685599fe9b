//! Rendered Document Cache
//!
//! One file per rendered target under the cache directory, fresh while
//! `now <= mtime + ttl`. Writes go through a temp file and a rename so a
//! concurrent reader never observes a half-written document.

use crate::error::JexError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Injectable time source, so freshness is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Store for rendered XML documents, keyed by target name.
pub struct CacheStore {
    dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    pub fn new(dir: PathBuf, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { dir, ttl, clock }
    }

    /// Path of the cache file for a target.
    pub fn path_for(&self, target: &str) -> PathBuf {
        self.dir.join(format!("{target}.xml"))
    }

    /// A target is stale when its file is missing or unreadable, or when
    /// the TTL has elapsed since the last write. The boundary instant
    /// `mtime + ttl` itself is still fresh.
    pub fn is_stale(&self, target: &str) -> bool {
        let path = self.path_for(target);
        let modified = match fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(_) => return true,
        };

        match modified.checked_add(self.ttl) {
            Some(expiry) => self.clock.now() > expiry,
            // TTL overflows the clock; the file can never expire.
            None => false,
        }
    }

    /// Read the cached bytes for a target verbatim.
    pub fn read(&self, target: &str) -> Result<Vec<u8>, JexError> {
        Ok(fs::read(self.path_for(target))?)
    }

    /// Atomically replace the cached document for a target.
    pub fn write_atomic(&self, target: &str, bytes: &[u8]) -> Result<(), JexError> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{target}.xml.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.path_for(target))?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    struct ManualClock(Mutex<SystemTime>);

    impl ManualClock {
        fn starting_now() -> Self {
            Self(Mutex::new(SystemTime::now()))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> SystemTime {
            *self.0.lock()
        }
    }

    fn store(dir: &TempDir, ttl_secs: u64) -> (CacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let store = CacheStore::new(
            dir.path().to_path_buf(),
            Duration::from_secs(ttl_secs),
            clock.clone(),
        );
        (store, clock)
    }

    #[test]
    fn missing_files_are_always_stale() {
        let dir = TempDir::new().unwrap();
        let (store, _clock) = store(&dir, 60);
        assert!(store.is_stale("index"));
    }

    #[test]
    fn fresh_within_ttl_stale_after() {
        let dir = TempDir::new().unwrap();
        let (store, clock) = store(&dir, 60);

        store.write_atomic("index", b"<extensionset/>").unwrap();
        assert!(!store.is_stale("index"));

        clock.advance(Duration::from_secs(30));
        assert!(!store.is_stale("index"));

        clock.advance(Duration::from_secs(3600));
        assert!(store.is_stale("index"));
    }

    #[test]
    fn write_then_read_round_trips_verbatim() {
        let dir = TempDir::new().unwrap();
        let (store, _clock) = store(&dir, 60);

        store.write_atomic("com_demo", b"<updates/>").unwrap();
        assert_eq!(store.read("com_demo").unwrap(), b"<updates/>");
    }

    #[test]
    fn write_replaces_previous_content_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let (store, _clock) = store(&dir, 60);

        store.write_atomic("index", b"old").unwrap();
        store.write_atomic("index", b"new").unwrap();
        assert_eq!(store.read("index").unwrap(), b"new");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn cache_directory_is_created_on_first_write() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::starting_now());
        let store = CacheStore::new(
            dir.path().join("nested").join("cache"),
            Duration::from_secs(60),
            clock,
        );

        store.write_atomic("index", b"<extensionset/>").unwrap();
        assert!(!store.is_stale("index"));
    }
}
