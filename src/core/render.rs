//! Renderer module
//!
//! Renders RecordSet to different output formats: jsonl, json, md

use crate::core::model::{Kind, Record, RecordSet};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for record sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a record set to a string
    pub fn render(&self, records: &RecordSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(records),
            OutputFormat::Json => self.render_json(records),
            OutputFormat::Markdown => self.render_markdown(records),
        }
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, records: &RecordSet) -> String {
        records
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, records: &RecordSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&records.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&records.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown, one section per kind
    fn render_markdown(&self, records: &RecordSet) -> String {
        let mut output = String::new();

        let sections = [
            (Kind::Collection, "Collections"),
            (Kind::Proxy, "Proxies"),
            (Kind::Entry, "Cache Entries"),
            (Kind::Fetch, "Fetches"),
        ];

        for (kind, title) in sections {
            let items: Vec<&Record> = records.items.iter().filter(|r| r.kind == kind).collect();
            if items.is_empty() {
                continue;
            }

            output.push_str(&format!("## {}\n\n", title));
            for item in items {
                self.render_item_md(&mut output, item);
            }
            output.push('\n');
        }

        output
    }

    fn render_item_md(&self, output: &mut String, item: &Record) {
        output.push_str(&format!("- `{}`", item.name));
        if let Some(entry_type) = &item.meta.entry_type {
            output.push_str(&format!(" [{}]", entry_type));
        }
        if let Some(size) = item.meta.size {
            output.push_str(&format!(" ({} bytes)", size));
        }
        if let Some(detail) = &item.detail {
            output.push_str(&format!(": {}", detail));
        }
        if item.meta.truncated {
            output.push_str(" …");
        }
        output.push('\n');
    }
}
