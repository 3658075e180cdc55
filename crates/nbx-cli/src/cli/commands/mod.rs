//! CLI command handlers.

pub mod config;
pub mod datasets;
pub mod exec;
pub mod notebook;

use std::path::Path;

use anyhow::{Context, Result};
use nbx_core::Datasets;
use nbx_core::config::Config;

/// Loads the dataset graph: `--datasets`, else the configured file, else the
/// built-in graph.
pub fn load_datasets(flag: Option<&Path>, config: &Config) -> Result<Datasets> {
    match flag.or(config.notebook.datasets_file.as_deref()) {
        Some(path) => Datasets::load_from(path)
            .with_context(|| format!("load datasets from {}", path.display())),
        None => Datasets::builtin().context("load built-in datasets"),
    }
}
