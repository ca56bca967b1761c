//! speed-checker - fetch and inspect free proxy lists
//!
//! The library half of the `speed-checker` CLI:
//! - `cache`: persistent, content-addressed cache with a fetch-through web layer
//! - `config`: TOML config with local overrides and the proxy collection table
//! - `commands`: command handlers
//! - `core`: record model, rendering and path helpers

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
