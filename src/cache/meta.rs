//! Cache metadata and the root index
//!
//! The root index maps every logical key to its entry type and timestamps.
//! It lives in `root.index.bin` next to the backing files.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::error::{CacheError, Result};
use crate::cache::store;

/// Root index file name
pub const INDEX_FILE: &str = "root.index.bin";

/// Index format version
pub const INDEX_VERSION: u32 = 1;

/// Entry type tag; decides which accessor may read a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    Scalar,
    List,
    Web,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Scalar => "scalar",
            EntryType::List => "list",
            EntryType::Web => "web",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-key metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub entry_type: EntryType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory root index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootIndex {
    version: u32,
    entries: BTreeMap<String, Metadata>,
}

impl Default for RootIndex {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl RootIndex {
    /// Load the index from a cache directory; a missing file yields an empty index
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        let index: Option<RootIndex> = store::read(&path)?;

        match index {
            None => Ok(Self::default()),
            Some(index) if index.version != INDEX_VERSION => Err(CacheError::Corrupt {
                path,
                message: format!(
                    "unsupported index version {} (expected {})",
                    index.version, INDEX_VERSION
                ),
            }),
            Some(index) => Ok(index),
        }
    }

    /// Persist the index atomically
    pub fn save(&self, dir: &Path) -> Result<()> {
        store::write(&dir.join(INDEX_FILE), self)
    }

    pub fn get(&self, key: &str) -> Option<&Metadata> {
        self.entries.get(key)
    }

    /// Record a write of `key`. `created_at` survives overwrites.
    pub fn touch(&mut self, key: &str, entry_type: EntryType, now: DateTime<Utc>) {
        let created_at = self
            .entries
            .get(key)
            .map(|m| m.created_at)
            .unwrap_or(now);

        self.entries.insert(
            key.to_string(),
            Metadata {
                entry_type,
                created_at,
                updated_at: now,
            },
        );
    }

    /// Put back the metadata `key` had before a failed write
    pub fn restore(&mut self, key: &str, previous: Option<Metadata>) {
        match previous {
            Some(meta) => {
                self.entries.insert(key.to_string(), meta);
            }
            None => {
                self.entries.remove(key);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Metadata> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Metadata)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
