//! `list` - show the configured proxy collections

use anyhow::Result;

use crate::commands::emit;
use crate::config::Config;
use crate::core::model::{Kind, Record, RecordSet, Source};
use crate::core::render::RenderConfig;

/// One record per known collection, in table order
pub fn list_collections(config: &Config) -> RecordSet {
    config
        .proxy_collection_list
        .entries()
        .map(|(name, url)| {
            let record = Record::new(Kind::Collection, name, Source::Config);
            if url.is_empty() {
                record
            } else {
                record.with_detail(url)
            }
        })
        .collect()
}

pub fn run_list(config: &Config, render_config: RenderConfig) -> Result<()> {
    emit(&list_collections(config), render_config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_collections() {
        let mut config = Config::default();
        config.proxy_collection_list.socks5 = "https://example.com/s5.txt".to_string();

        let records = list_collections(&config);
        assert_eq!(records.len(), 1);
        assert_eq!(records.items[0].name, "socks5");
        assert_eq!(
            records.items[0].detail.as_deref(),
            Some("https://example.com/s5.txt")
        );
    }

    #[test]
    fn test_list_unconfigured_collection_has_no_detail() {
        let records = list_collections(&Config::default());
        assert_eq!(records.items[0].name, "socks5");
        assert!(records.items[0].detail.is_none());
    }
}
