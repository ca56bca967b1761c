//! `scan` - pull a proxy collection through the cache and parse it
//!
//! The collection body is fetched with `Cache::get_web`, so repeated scans
//! of the same collection never hit the network twice. Parsed proxies are
//! stored as a list under `proxies:<collection>` and a summary scalar under
//! `scan:<collection>`.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::cache::{Cache, Value};
use crate::commands::emit;
use crate::config::{Config, ProxyCollectionList};
use crate::core::model::{Kind, Record, RecordSet, Source};
use crate::core::render::RenderConfig;

/// Collection scanned when none is given
pub const DEFAULT_COLLECTION: &str = "socks5";

/// Format: [scheme://]host:port
pub static PROXY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(socks4a?|socks5h?|https?)://)?([A-Za-z0-9][A-Za-z0-9.\-]*):(\d{1,5})$")
        .expect("Invalid PROXY_RE regex")
});

/// A parsed proxy address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    pub scheme: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Proxy {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn to_value(&self, collection: &str) -> Value {
        Value::map([
            ("scheme", Value::from(self.scheme.clone())),
            ("host", Value::from(self.host.as_str())),
            ("port", Value::from(self.port)),
            ("collection", Value::from(collection)),
        ])
    }
}

/// Parse a proxy list body. Blank lines and `#` comments are skipped, as are
/// malformed lines and duplicates (first occurrence wins).
pub fn parse_proxy_list(text: &str) -> Vec<Proxy> {
    let mut seen = HashSet::new();
    let mut proxies = Vec::new();

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(caps) = PROXY_RE.captures(line) else {
            debug!(line = n + 1, content = line, "skipping malformed proxy line");
            continue;
        };

        let port = match caps[3].parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => {
                debug!(line = n + 1, content = line, "skipping proxy with invalid port");
                continue;
            }
        };

        let proxy = Proxy {
            scheme: caps.get(1).map(|m| m.as_str().to_string()),
            host: caps[2].to_string(),
            port,
        };

        if seen.insert(proxy.address()) {
            proxies.push(proxy);
        }
    }

    proxies
}

/// Fetch, parse and store a collection; returns the parsed proxies
pub fn scan_collection(cache: &Cache, config: &Config, collection: &str) -> Result<Vec<Proxy>> {
    if !ProxyCollectionList::contains(collection) {
        bail!(
            "collection '{}' not found; available collections: {}",
            collection,
            ProxyCollectionList::NAMES.join(", ")
        );
    }

    let url = config
        .proxy_collection_list
        .get(collection)
        .filter(|url| !url.is_empty())
        .with_context(|| format!("collection '{}' has no source URL configured", collection))?;

    let body = cache
        .get_web(url)
        .with_context(|| format!("failed to fetch collection '{}'", collection))?;
    let proxies = parse_proxy_list(&String::from_utf8_lossy(&body));

    let items: Vec<Value> = proxies.iter().map(|p| p.to_value(collection)).collect();
    cache
        .set_list(&format!("proxies:{}", collection), &items)
        .context("failed to store parsed proxies")?;

    let summary = Value::map([
        ("url", Value::from(url)),
        ("count", Value::from(proxies.len() as i64)),
        ("scanned_at", Value::from(Utc::now())),
    ]);
    cache
        .set(&format!("scan:{}", collection), &summary)
        .context("failed to store scan summary")?;

    info!(collection, count = proxies.len(), "collection scanned");
    Ok(proxies)
}

pub fn run_scan(
    cache: &Cache,
    config: &Config,
    collection: &str,
    render_config: RenderConfig,
) -> Result<()> {
    let proxies = scan_collection(cache, config, collection)?;

    let records: RecordSet = proxies
        .iter()
        .map(|p| {
            let mut data = p.to_value(collection).to_json();
            if let Some(obj) = data.as_object_mut() {
                obj.remove("collection");
            }
            Record::new(Kind::Proxy, p.address(), Source::Cache)
                .with_detail(collection)
                .with_data(data)
        })
        .collect();

    emit(&records, render_config);
    Ok(())
}
