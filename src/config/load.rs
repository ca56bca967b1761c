//! Config file loading with local override patching

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, Options, ProxyCollectionList};
use crate::core::paths::{local_override_path, resolve_config_path};

/// Config loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file {0} not found")]
    NotFound(PathBuf),

    #[error("Cannot access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Partial config read from the local override file; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub app_name: Option<String>,
    pub source_repo_url: Option<String>,
    pub proxy_collection_list: Option<ProxyCollectionListPatch>,
    pub options: Option<OptionsPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyCollectionListPatch {
    pub socks5: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptionsPatch {
    pub cache_dir: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
}

impl Config {
    /// Overwrite every field the patch sets
    pub fn apply_patch(&mut self, patch: ConfigPatch) {
        set(&mut self.app_name, patch.app_name);
        set(&mut self.source_repo_url, patch.source_repo_url);
        if let Some(list) = patch.proxy_collection_list {
            self.proxy_collection_list.apply_patch(list);
        }
        if let Some(options) = patch.options {
            self.options.apply_patch(options);
        }
    }
}

impl ProxyCollectionList {
    fn apply_patch(&mut self, patch: ProxyCollectionListPatch) {
        set(&mut self.socks5, patch.socks5);
    }
}

impl Options {
    fn apply_patch(&mut self, patch: OptionsPatch) {
        set(&mut self.cache_dir, patch.cache_dir);
        set(&mut self.fetch_timeout_secs, patch.fetch_timeout_secs);
    }
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Load the config at `raw` (resolved via [`resolve_config_path`]) and apply
/// its `.local` override when one exists. Returns the config and the
/// resolved path.
pub fn load(raw: &Path) -> Result<(Config, PathBuf), ConfigError> {
    let path = resolve_config_path(raw);

    let mut config: Config = match read_toml(&path)? {
        Some(config) => config,
        None => return Err(ConfigError::NotFound(path)),
    };

    let local = local_override_path(&path);
    if let Some(patch) = read_toml::<ConfigPatch>(&local)? {
        debug!(path = %local.display(), "applying local config override");
        config.apply_patch(patch);
    }

    Ok((config, path))
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const BASE: &str = r#"
app_name = "speed-checker"
source_repo_url = "https://example.com/repo"

[proxy_collection_list]
socks5 = "https://example.com/socks5.txt"

[options]
cache_dir = "/var/cache/speed-checker"
"#;

    #[test]
    fn test_load_base_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, BASE).unwrap();

        let (config, resolved) = load(&path).unwrap();
        assert_eq!(resolved, path);
        assert_eq!(config.app_name, "speed-checker");
        assert_eq!(
            config.proxy_collection_list.socks5,
            "https://example.com/socks5.txt"
        );
        assert_eq!(config.options.cache_dir, "/var/cache/speed-checker");
        assert_eq!(config.options.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_local_override_patches_fields() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, BASE).unwrap();
        fs::write(
            temp.path().join("config.local.toml"),
            "[options]\ncache_dir = \"/tmp/mine\"\n",
        )
        .unwrap();

        let (config, _) = load(&path).unwrap();
        assert_eq!(config.options.cache_dir, "/tmp/mine");
        // untouched fields survive
        assert_eq!(config.app_name, "speed-checker");
        assert_eq!(
            config.proxy_collection_list.socks5,
            "https://example.com/socks5.txt"
        );
    }

    #[test]
    fn test_missing_config() {
        let temp = tempdir().unwrap();
        let err = load(&temp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_malformed_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "app_name = [").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_malformed_override() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, BASE).unwrap();
        fs::write(temp.path().join("config.local.toml"), "options = 3").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_apply_patch_empty_is_noop() {
        let mut config = Config::default();
        let before = config.clone();
        config.apply_patch(ConfigPatch::default());
        assert_eq!(config, before);
    }
}
