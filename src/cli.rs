//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cache::{Cache, CacheOptions};
use crate::config::Config;
use crate::core::paths::DEFAULT_CONFIG_FILE;
use crate::core::render::{OutputFormat, RenderConfig};

/// speed-checker - fetch and inspect free proxy lists through a persistent cache.
#[derive(Parser, Debug)]
#[command(name = "speed-checker")]
#[command(
    author,
    version,
    about,
    long_about = r#"speed-checker fetches free proxy lists and keeps them in an on-disk cache.

Every command prints records in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line
- json: a single JSON array
- md: human-friendly Markdown

Examples:
    speed-checker list
    speed-checker scan socks5
    speed-checker cache entries --format md
    speed-checker cache get proxies:socks5
"#
)]
pub struct Cli {
    /// Path to the config file.
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_CONFIG_FILE,
        value_name = "PATH",
        long_help = "Path to the config file.\n\n\
A bare file name (no directory part) is looked up under ./config/.\n\
A sibling <name>.local.<ext> file, when present, overrides individual fields."
    )]
    pub config: PathBuf,

    /// Override the cache directory from the config file.
    #[arg(long, global = true, value_name = "DIR", env = "SPEED_CHECKER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Output format (jsonl/json/md).
    #[arg(long, global = true, default_value = "jsonl", value_name = "FORMAT")]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Quiet mode (errors only on stderr).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available proxy collections.
    List,

    /// Fetch a proxy collection (through the cache) and print its proxies.
    #[command(long_about = "Fetch COLLECTION's source list through the cache, parse it into\n\
proxies and store them under proxies:<COLLECTION>.\n\n\
The list is downloaded only once; later scans reuse the cached copy.")]
    Scan {
        /// Collection name (see `list`).
        #[arg(default_value = crate::commands::scan::DEFAULT_COLLECTION)]
        collection: String,
    },

    /// Inspect or populate the cache.
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// List every cached key with its type and timestamps.
    Entries,

    /// Print the value stored under KEY.
    Get {
        /// Cache key (or URL for web entries).
        key: String,
    },

    /// Download URL into the cache unless it is already there.
    Fetch {
        /// URL to fetch.
        url: String,
    },
}

impl Cli {
    /// Log filter directive for the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let (config, config_path) = crate::config::load(&cli.config)?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    match cli.command {
        Commands::List => crate::commands::list::run_list(&config, render_config),

        Commands::Scan { collection } => with_cache(&config, cli.cache_dir, |cache| {
            crate::commands::scan::run_scan(cache, &config, &collection, render_config)
        }),

        Commands::Cache { action } => with_cache(&config, cli.cache_dir, |cache| match action {
            CacheCommands::Entries => crate::commands::cache::run_entries(cache, render_config),
            CacheCommands::Get { key } => {
                crate::commands::cache::run_get(cache, &key, render_config)
            }
            CacheCommands::Fetch { url } => {
                crate::commands::cache::run_fetch(cache, &url, render_config)
            }
        }),
    }
}

/// Open the cache, run `f`, and close the cache whether or not `f` succeeded
fn with_cache<F>(config: &Config, dir_override: Option<PathBuf>, f: F) -> Result<()>
where
    F: FnOnce(&Cache) -> Result<()>,
{
    let dir = dir_override.unwrap_or_else(|| PathBuf::from(&config.options.cache_dir));
    let options = CacheOptions {
        fetch_timeout: config.options.fetch_timeout(),
    };

    let cache = Cache::open_with(&dir, options)
        .with_context(|| format!("failed to open cache at {}", dir.display()))?;

    let result = f(&cache);
    let closed = cache.close().context("failed to save cache index");

    result.and(closed)
}
