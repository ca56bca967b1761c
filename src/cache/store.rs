//! Entry store - atomic read/write of cache files
//!
//! Writes go to `<file>.tmp` first and are renamed into place, so a reader
//! never sees a partially written file.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::error::{CacheError, Result};
use crate::cache::meta::EntryType;
use crate::cache::value::Value;

/// Suffix of write-in-progress files
pub const TEMP_SUFFIX: &str = ".tmp";

/// Body of a backing file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Scalar(Value),
    List(Vec<Value>),
    Web(Vec<u8>),
}

impl Payload {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Payload::Scalar(_) => EntryType::Scalar,
            Payload::List(_) => EntryType::List,
            Payload::Web(_) => EntryType::Web,
        }
    }
}

/// Borrowed form of [`Payload`] used for writing; encodes identically
#[derive(Debug, Clone, Copy, Serialize)]
pub enum PayloadRef<'a> {
    Scalar(&'a Value),
    List(&'a [Value]),
    Web(&'a [u8]),
}

impl PayloadRef<'_> {
    pub fn entry_type(&self) -> EntryType {
        match self {
            PayloadRef::Scalar(_) => EntryType::Scalar,
            PayloadRef::List(_) => EntryType::List,
            PayloadRef::Web(_) => EntryType::Web,
        }
    }
}

/// Temp path used while writing `path`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Serialize `data` into `path` atomically
pub fn write<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let tmp = temp_path(path);
    let file = File::create(&tmp).map_err(|e| CacheError::io(&tmp, e))?;
    let mut writer = BufWriter::new(file);

    if let Err(source) = bincode::serialize_into(&mut writer, data) {
        drop(writer);
        let _ = fs::remove_file(&tmp);
        return Err(CacheError::Encode {
            path: path.to_path_buf(),
            source,
        });
    }

    let synced = writer
        .flush()
        .and_then(|_| writer.get_ref().sync_all());
    if let Err(e) = synced {
        drop(writer);
        let _ = fs::remove_file(&tmp);
        return Err(CacheError::io(&tmp, e));
    }
    drop(writer);

    // On failure the temp file is left for the startup scan to clean up
    fs::rename(&tmp, path).map_err(|e| CacheError::io(path, e))
}

/// Read and decode `path`. A missing file is `Ok(None)`, an undecodable one is an error.
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CacheError::io(path, e)),
    };

    bincode::deserialize(&bytes)
        .map(Some)
        .map_err(|e| CacheError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
