//! Unified Record Model
//!
//! Every command maps its output to this record model before rendering.

use serde::{Deserialize, Serialize};

/// The kind of record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Collection,
    Proxy,
    Entry,
    Fetch,
}

/// Where the data behind a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Config,
    Cache,
    Network,
}

/// Metadata for a record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Cache entry type (scalar/list/web)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,

    /// Payload size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// RFC 3339 creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// RFC 3339 last update time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Whether the detail was truncated
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// A single output record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// The kind of this record
    pub kind: Kind,

    /// Primary identifier (collection name, host:port, cache key or URL)
    pub name: String,

    /// Human-readable detail (may be truncated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Structured payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Where this record came from
    pub source: Source,

    /// Metadata
    #[serde(default)]
    pub meta: Meta,
}

impl Record {
    /// Create a new record
    pub fn new(kind: Kind, name: impl Into<String>, source: Source) -> Self {
        Self {
            kind,
            name: name.into(),
            detail: None,
            data: None,
            source,
            meta: Meta::default(),
        }
    }

    /// Set the human-readable detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }
}

/// Ordered collection of records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSet {
    pub items: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: Record) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
