//! Command handlers
//!
//! Each handler builds a RecordSet and prints it with the selected renderer.

pub mod cache;
pub mod list;
pub mod scan;

use crate::core::model::RecordSet;
use crate::core::render::{RenderConfig, Renderer};

/// Render records to stdout
pub(crate) fn emit(records: &RecordSet, render_config: RenderConfig) {
    let output = Renderer::with_config(render_config).render(records);
    if !output.is_empty() {
        println!("{}", output);
    }
}
