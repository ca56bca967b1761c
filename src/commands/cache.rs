//! `cache` - inspect and populate the cache directory

use anyhow::{Context, Result};

use crate::cache::{Cache, EntryType, Metadata};
use crate::commands::emit;
use crate::core::model::{Kind, Meta, Record, RecordSet, Source};
use crate::core::render::RenderConfig;
use crate::core::util::truncate_string;

/// Longest web body excerpt shown in `cache get`
const MAX_EXCERPT_BYTES: usize = 4096;

fn entry_meta(meta: &Metadata) -> Meta {
    Meta {
        entry_type: Some(meta.entry_type.to_string()),
        created_at: Some(meta.created_at.to_rfc3339()),
        updated_at: Some(meta.updated_at.to_rfc3339()),
        ..Default::default()
    }
}

/// One record per index entry
pub fn list_entries(cache: &Cache) -> RecordSet {
    cache
        .entries()
        .iter()
        .map(|(key, meta)| Record::new(Kind::Entry, key, Source::Cache).with_meta(entry_meta(meta)))
        .collect()
}

/// Read whatever `key` holds, whichever type it is
pub fn get_entry(cache: &Cache, key: &str) -> Result<Record> {
    let meta = cache
        .metadata(key)
        .with_context(|| format!("key not found in cache: {}", key))?;

    let record = Record::new(Kind::Entry, key, Source::Cache);
    let mut record_meta = entry_meta(&meta);

    let record = match meta.entry_type {
        EntryType::Scalar => {
            let value = cache.get(key)?.with_context(|| format!("key vanished: {}", key))?;
            record.with_data(value.to_json())
        }
        EntryType::List => {
            let items = cache.get_list(key)?;
            record.with_data(serde_json::Value::Array(
                items.iter().map(|v| v.to_json()).collect(),
            ))
        }
        EntryType::Web => {
            let body = cache.get_web(key)?;
            record_meta.size = Some(body.len() as u64);
            match std::str::from_utf8(&body) {
                Ok(text) => {
                    let (excerpt, truncated) = truncate_string(text, MAX_EXCERPT_BYTES);
                    record_meta.truncated = truncated;
                    record.with_detail(excerpt)
                }
                Err(_) => record.with_detail("<binary>"),
            }
        }
    };

    Ok(record.with_meta(record_meta))
}

/// Fetch `url` through the cache
pub fn fetch(cache: &Cache, url: &str) -> Result<Record> {
    let source = if cache.has_web(url) {
        Source::Cache
    } else {
        Source::Network
    };

    let body = cache
        .get_web(url)
        .with_context(|| format!("failed to fetch {}", url))?;

    Ok(Record::new(Kind::Fetch, url, source).with_meta(Meta {
        entry_type: Some(EntryType::Web.to_string()),
        size: Some(body.len() as u64),
        ..Default::default()
    }))
}

pub fn run_entries(cache: &Cache, render_config: RenderConfig) -> Result<()> {
    emit(&list_entries(cache), render_config);
    Ok(())
}

pub fn run_get(cache: &Cache, key: &str, render_config: RenderConfig) -> Result<()> {
    let mut records = RecordSet::new();
    records.push(get_entry(cache, key)?);
    emit(&records, render_config);
    Ok(())
}

pub fn run_fetch(cache: &Cache, url: &str, render_config: RenderConfig) -> Result<()> {
    let mut records = RecordSet::new();
    records.push(fetch(cache, url)?);
    emit(&records, render_config);
    Ok(())
}
