//! Startup reconciliation of the root index against the cache directory
//!
//! Stray temp files are deleted, unknown files are reported and left alone,
//! and index entries without a backing file are dropped from memory.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::cache::error::{CacheError, Result};
use crate::cache::keys;
use crate::cache::meta::{RootIndex, INDEX_FILE};
use crate::cache::store::TEMP_SUFFIX;

/// What the startup scan found. Every finding is also logged at warn level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Temp files from interrupted writes that were deleted
    pub removed_temp: Vec<String>,
    /// Files no index entry accounts for; left in place
    pub orphaned: Vec<String>,
    /// Keys dropped from the index because their backing file is gone
    pub dangling: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.removed_temp.is_empty() && self.orphaned.is_empty() && self.dangling.is_empty()
    }
}

/// Compare `index` with the files in `dir` and repair the in-memory index
pub fn reconcile(dir: &Path, index: &mut RootIndex) -> Result<ReconcileReport> {
    let mut disk_files = HashSet::new();
    for entry in fs::read_dir(dir).map_err(|e| CacheError::io(dir, e))? {
        let entry = entry.map_err(|e| CacheError::io(dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            disk_files.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }

    let expected: HashSet<String> = index.keys().map(|k| keys::file_name(k)).collect();
    let mut report = ReconcileReport::default();

    let mut names: Vec<&String> = disk_files.iter().collect();
    names.sort();

    for name in names {
        if name == INDEX_FILE || expected.contains(name) {
            continue;
        }

        if name.ends_with(TEMP_SUFFIX) {
            match fs::remove_file(dir.join(name)) {
                Ok(()) => {
                    debug!(file = %name, "removed stray temp file");
                    report.removed_temp.push(name.clone());
                }
                Err(e) => warn!(file = %name, error = %e, "failed to remove stray temp file"),
            }
            continue;
        }

        warn!(file = %name, "orphaned cache file found");
        report.orphaned.push(name.clone());
    }

    let dangling: Vec<String> = index
        .keys()
        .filter(|k| !disk_files.contains(&keys::file_name(k)))
        .cloned()
        .collect();

    for key in dangling {
        warn!(
            key = %key,
            file = %keys::file_name(&key),
            "cache entry referenced in index but file not found"
        );
        index.remove(&key);
        report.dangling.push(key);
    }

    Ok(report)
}
