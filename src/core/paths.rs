//! Path resolution utilities
//!
//! Resolves the config file location, its local override, and the
//! absolute form of user-supplied directories.

use std::path::{Path, PathBuf};

/// Directory that bare config file names are looked up in
pub const CONFIG_DIR: &str = "config";

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Make a path absolute against the current working directory
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Resolve the config path given on the command line.
///
/// A bare file name such as `config.toml` is looked up under `config/`;
/// anything with a directory component is used as given.
pub fn resolve_config_path(raw: &Path) -> PathBuf {
    let has_dir = raw
        .parent()
        .map(|p| !p.as_os_str().is_empty())
        .unwrap_or(false);

    let resolved = if raw.is_absolute() || has_dir {
        raw.to_path_buf()
    } else {
        Path::new(CONFIG_DIR).join(raw)
    };

    absolutize(&resolved).unwrap_or(resolved)
}

/// Path of the local override for a config file: `config.toml` -> `config.local.toml`
pub fn local_override_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match path.extension() {
        Some(ext) => format!("{}.local.{}", stem, ext.to_string_lossy()),
        None => format!("{}.local", stem),
    };

    path.with_file_name(name)
}

/// Check whether a directory is the system temp root itself
pub fn is_temp_root(path: &Path) -> bool {
    let temp = std::env::temp_dir();
    path == temp.as_path()
        || match (path.canonicalize(), temp.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
}
