//! Configuration model
//!
//! `config.toml` describes the app, the proxy collections it knows about
//! and where the cache lives. A `config.local.toml` next to it may override
//! any subset of fields (see [`load`]).

pub mod load;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use load::{load, ConfigError};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    pub source_repo_url: String,
    pub proxy_collection_list: ProxyCollectionList,
    pub options: Options,
}

/// Known proxy collections and their source URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyCollectionList {
    pub socks5: String,
}

impl ProxyCollectionList {
    /// Collection names, in listing order
    pub const NAMES: &'static [&'static str] = &["socks5"];

    /// URL configured for a collection
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "socks5" => Some(&self.socks5),
            _ => None,
        }
    }

    /// `(name, url)` for every known collection
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Self::NAMES
            .iter()
            .filter_map(move |name| self.get(name).map(|url| (*name, url)))
    }

    pub fn contains(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }
}

/// Runtime options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub cache_dir: String,
    pub fetch_timeout_secs: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cache_dir: ".cache".to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

impl Options {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
