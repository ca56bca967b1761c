//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Unified record model (Record)
//! - Rendering functions for different output formats
//! - Path resolution utilities
//! - Common utilities

pub mod model;
pub mod paths;
pub mod render;
pub mod util;
