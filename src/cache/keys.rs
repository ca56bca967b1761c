//! Logical key to backing file name mapping

use std::path::{Path, PathBuf};

use crate::core::util::hash_bytes;

/// Extension of backing files
pub const ENTRY_EXT: &str = ".bin";

/// Backing file name for a logical key: `<sha256 hex>.bin`
pub fn file_name(key: &str) -> String {
    format!("{}{}", hash_bytes(key.as_bytes()), ENTRY_EXT)
}

/// Full backing file path for a logical key
pub fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(file_name(key))
}
