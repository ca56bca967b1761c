//! Cache module - Persistent, content-addressed cache directory
//!
//! Provides:
//! - Typed entries (scalar, list, web) behind one facade
//! - A root index with startup reconciliation
//! - A fetch-through cache for web resources
//!
//! Directory layout:
//! - `root.index.bin` - serialized root index
//! - `<sha256(key)>.bin` - one backing file per key
//! - `*.tmp` - write-in-progress files, removed at startup

pub mod error;
pub mod keys;
pub mod meta;
pub mod reconcile;
pub mod store;
pub mod value;
pub mod web;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

pub use error::{CacheError, Result};
pub use meta::{EntryType, Metadata};
pub use reconcile::ReconcileReport;
pub use value::Value;

use crate::core::paths::{absolutize, is_temp_root};
use meta::RootIndex;
use store::{Payload, PayloadRef};
use web::WebClient;

/// Options for opening a cache
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Overall timeout of a `get_web` fetch
    pub fetch_timeout: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: web::DEFAULT_TIMEOUT,
        }
    }
}

/// Handle to an open cache directory.
///
/// Every write persists its backing file and the root index before
/// returning. Call [`Cache::close`] when done; dropping the handle does not
/// save anything.
pub struct Cache {
    dir: PathBuf,
    index: RwLock<RootIndex>,
    client: WebClient,
    report: ReconcileReport,
}

impl Cache {
    /// Open (or create) a cache directory with default options
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(dir, CacheOptions::default())
    }

    /// Open (or create) a cache directory
    pub fn open_with(dir: impl AsRef<Path>, options: CacheOptions) -> Result<Self> {
        let dir = prepare_dir(dir.as_ref())?;

        let mut index = RootIndex::load(&dir)?;
        let report = reconcile::reconcile(&dir, &mut index)?;
        let client = WebClient::new(options.fetch_timeout)?;

        info!(dir = %dir.display(), entries = index.len(), "cache opened");

        Ok(Self {
            dir,
            index: RwLock::new(index),
            client,
            report,
        })
    }

    /// The resolved cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Findings of the startup reconciliation
    pub fn startup_report(&self) -> &ReconcileReport {
        &self.report
    }

    /// Metadata of a key, if indexed
    pub fn metadata(&self, key: &str) -> Option<Metadata> {
        self.index.read().get(key).copied()
    }

    /// Snapshot of all index entries, ordered by key
    pub fn entries(&self) -> Vec<(String, Metadata)> {
        self.index
            .read()
            .iter()
            .map(|(k, m)| (k.clone(), *m))
            .collect()
    }

    /// Store a scalar value, replacing whatever `key` held before
    pub fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.put(key, PayloadRef::Scalar(value))
    }

    /// Read a scalar value. Unknown keys are `Ok(None)`.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let index = self.index.read();
        if index.get(key).is_none() {
            return Ok(None);
        }

        match self.load(&index, key, EntryType::Scalar)? {
            Payload::Scalar(value) => Ok(Some(value)),
            other => Err(self.corrupt(key, other.entry_type())),
        }
    }

    /// Store an ordered list, replacing the whole sequence
    pub fn set_list(&self, key: &str, items: &[Value]) -> Result<()> {
        self.put(key, PayloadRef::List(items))
    }

    /// Read a list. Unknown keys are a `NotFound` error.
    pub fn get_list(&self, key: &str) -> Result<Vec<Value>> {
        let index = self.index.read();
        if index.get(key).is_none() {
            return Err(CacheError::NotFound {
                key: key.to_string(),
            });
        }

        match self.load(&index, key, EntryType::List)? {
            Payload::List(items) => Ok(items),
            other => Err(self.corrupt(key, other.entry_type())),
        }
    }

    /// Return the body of `url`, fetching and caching it on a miss.
    ///
    /// Failed fetches are not cached. The network call runs without holding
    /// the cache lock.
    pub fn get_web(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(body) = self.cached_web(url)? {
            debug!(url, "web cache hit");
            return Ok(body);
        }

        debug!(url, "web cache miss");
        let body = self.client.fetch(url)?;
        self.put(url, PayloadRef::Web(&body))?;
        Ok(body)
    }

    /// Whether `url` is already cached as a web entry
    pub fn has_web(&self, url: &str) -> bool {
        matches!(self.metadata(url), Some(m) if m.entry_type == EntryType::Web)
    }

    /// Persist the in-memory index.
    ///
    /// Readers keep going while the index is saved; concurrent flushes and
    /// writes wait for each other.
    pub fn flush(&self) -> Result<()> {
        let index = self.index.upgradable_read();
        index.save(&self.dir)?;
        debug!(entries = index.len(), "root index saved");
        Ok(())
    }

    /// Save the root index and release the handle
    pub fn close(self) -> Result<()> {
        info!(dir = %self.dir.display(), "saving root index before exit");
        self.flush()
    }

    fn cached_web(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let index = self.index.read();
        match index.get(url) {
            Some(m) if m.entry_type == EntryType::Web => {}
            _ => return Ok(None),
        }

        match self.load(&index, url, EntryType::Web)? {
            Payload::Web(body) => Ok(Some(body)),
            other => Err(self.corrupt(url, other.entry_type())),
        }
    }

    /// Write the backing file, then update and persist the index.
    ///
    /// If the index cannot be saved, the in-memory entry is rolled back so the
    /// index never records a write that was reported as failed.
    fn put(&self, key: &str, payload: PayloadRef<'_>) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        let mut index = self.index.write();
        store::write(&keys::entry_path(&self.dir, key), &payload)?;

        let previous = index.get(key).copied();
        index.touch(key, payload.entry_type(), Utc::now());
        if let Err(e) = index.save(&self.dir) {
            index.restore(key, previous);
            return Err(e);
        }

        debug!(key, entry_type = %payload.entry_type(), "cache entry stored");
        Ok(())
    }

    /// Read the backing file of an indexed key after checking its type
    fn load(&self, index: &RootIndex, key: &str, expected: EntryType) -> Result<Payload> {
        let actual = index
            .get(key)
            .map(|m| m.entry_type)
            .ok_or_else(|| CacheError::NotFound {
                key: key.to_string(),
            })?;

        if actual != expected {
            return Err(CacheError::TypeMismatch {
                key: key.to_string(),
                expected,
                actual,
            });
        }

        let path = keys::entry_path(&self.dir, key);
        match store::read::<Payload>(&path)? {
            Some(payload) => Ok(payload),
            None => Err(CacheError::Corrupt {
                path,
                message: format!("backing file for key {} is missing", key),
            }),
        }
    }

    fn corrupt(&self, key: &str, found: EntryType) -> CacheError {
        CacheError::Corrupt {
            path: keys::entry_path(&self.dir, key),
            message: format!("indexed entry holds a {} payload", found),
        }
    }
}

/// Resolve and create the cache directory.
///
/// The system temp root itself is never used directly; a fresh
/// per-run directory is created inside it instead.
fn prepare_dir(raw: &Path) -> Result<PathBuf> {
    if raw.as_os_str().is_empty() {
        return Err(CacheError::Config {
            path: raw.to_path_buf(),
            message: "cache directory cannot be empty".to_string(),
        });
    }

    if is_temp_root(raw) {
        return create_run_dir(raw);
    }

    let dir = absolutize(raw).map_err(|e| CacheError::Config {
        path: raw.to_path_buf(),
        message: format!("failed to resolve absolute path: {}", e),
    })?;

    if dir.exists() && !dir.is_dir() {
        return Err(CacheError::Config {
            path: dir,
            message: "not a directory".to_string(),
        });
    }

    std::fs::create_dir_all(&dir).map_err(|e| CacheError::Config {
        path: dir.clone(),
        message: format!("failed to create cache directory: {}", e),
    })?;

    Ok(dir)
}

fn create_run_dir(temp_root: &Path) -> Result<PathBuf> {
    let prefix = format!(
        "speed-checker-{}-{}",
        Utc::now().format("%Y%m%dT%H%M%SZ"),
        std::process::id()
    );

    for n in 0..100u32 {
        let dir = temp_root.join(format!("{}-{}", prefix, n));
        match std::fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(CacheError::Config {
                    path: dir,
                    message: format!("failed to create temporary cache directory: {}", e),
                })
            }
        }
    }

    Err(CacheError::Config {
        path: temp_root.to_path_buf(),
        message: "failed to create temporary cache directory: name space exhausted".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_directory() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("a").join("b");

        let cache = Cache::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(cache.dir(), dir.as_path());
        assert!(cache.startup_report().is_clean());
    }

    #[test]
    fn test_open_empty_path_fails() {
        let err = Cache::open("").err().unwrap();
        assert!(matches!(err, CacheError::Config { .. }));
    }

    #[test]
    fn test_open_on_file_fails() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let err = Cache::open(&file).err().unwrap();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_open_temp_root_uses_fresh_subdir() {
        let temp_root = std::env::temp_dir();
        let cache = Cache::open(&temp_root).unwrap();

        let dir = cache.dir().to_path_buf();
        assert_ne!(dir, temp_root);
        assert!(dir.starts_with(&temp_root));
        assert!(dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("speed-checker-"));

        cache.close().unwrap();
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_set_get_scalar() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();

        let value = Value::map([("name", Value::from("test-value"))]);
        cache.set("test-key", &value).unwrap();

        assert_eq!(cache.get("test-key").unwrap(), Some(value));
        assert_eq!(
            cache.metadata("test-key").unwrap().entry_type,
            EntryType::Scalar
        );
    }

    #[test]
    fn test_get_missing_is_none() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        assert_eq!(cache.get("missing-key").unwrap(), None);
    }

    #[test]
    fn test_get_list_missing_is_not_found() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();

        let err = cache.get_list("missing-list").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_type_isolation() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();

        cache
            .set("scalar-key", &Value::map([("x", Value::from(1))]))
            .unwrap();
        cache
            .set_list("list-key", &[Value::from("a")])
            .unwrap();

        assert!(cache.get_list("scalar-key").unwrap_err().is_type_mismatch());
        assert!(cache.get("list-key").unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_overwrite_changes_type() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();

        cache.set("k", &Value::from(1)).unwrap();
        let created = cache.metadata("k").unwrap().created_at;
        cache.set_list("k", &[Value::from(2)]).unwrap();

        assert_eq!(cache.get_list("k").unwrap(), vec![Value::from(2)]);
        assert!(cache.get("k").unwrap_err().is_type_mismatch());

        let meta = cache.metadata("k").unwrap();
        assert_eq!(meta.created_at, created);
        assert!(meta.updated_at >= created);
    }

    #[test]
    fn test_empty_key_rejected() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();

        assert!(matches!(
            cache.set("", &Value::Null).unwrap_err(),
            CacheError::InvalidKey
        ));
        assert!(cache.entries().is_empty());
    }

    #[test]
    fn test_write_through_index() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        cache.set("k", &Value::from("v")).unwrap();

        // No close: the index file already has the entry
        let reopened = Cache::open(temp.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap(), Some(Value::from("v")));
    }

    #[test]
    fn test_backing_file_uses_hashed_name() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        cache.set("test-key", &Value::Null).unwrap();

        assert!(temp.path().join(keys::file_name("test-key")).is_file());
        assert!(temp.path().join(meta::INDEX_FILE).is_file());
    }

    #[test]
    fn test_corrupt_backing_file_is_error_not_miss() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        cache.set("k", &Value::from(1)).unwrap();

        std::fs::write(keys::entry_path(temp.path(), "k"), b"\xff\xff\xff\xff").unwrap();

        let err = cache.get("k").unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { .. }));
    }

    #[test]
    fn test_failed_index_save_rolls_back_entry() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        cache.set("kept", &Value::from(1)).unwrap();

        // A directory in the way of the index temp file makes every save fail
        let blocker = store::temp_path(&temp.path().join(meta::INDEX_FILE));
        std::fs::create_dir(&blocker).unwrap();

        let err = cache.set("new", &Value::from(2)).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
        assert!(cache.metadata("new").is_none());
        assert_eq!(cache.get("new").unwrap(), None);

        let created = cache.metadata("kept").unwrap();
        assert!(cache.set_list("kept", &[Value::from(3)]).is_err());
        assert_eq!(cache.metadata("kept"), Some(created));

        std::fs::remove_dir(&blocker).unwrap();
        cache.set("new", &Value::from(2)).unwrap();
        assert_eq!(cache.get("new").unwrap(), Some(Value::from(2)));
    }

    #[test]
    fn test_concurrent_flushes() {
        let temp = tempdir().unwrap();
        let cache = std::sync::Arc::new(Cache::open(temp.path()).unwrap());
        for i in 0..10i64 {
            cache.set(&format!("k{}", i), &Value::from(i)).unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = std::sync::Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        cache.flush().unwrap();
                        assert_eq!(cache.get("k3").unwrap(), Some(Value::from(3i64)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reopened = Cache::open(temp.path()).unwrap();
        assert_eq!(reopened.entries().len(), 10);
    }

    #[test]
    fn test_entries_sorted() {
        let temp = tempdir().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        cache.set("b", &Value::Null).unwrap();
        cache.set_list("a", &[]).unwrap();

        let keys: Vec<String> = cache.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
