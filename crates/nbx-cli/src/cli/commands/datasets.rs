//! Dataset command handlers.

use anyhow::Result;
use nbx_core::cell::DatasetPreview;
use nbx_core::{DispatchError, Datasets, Output};

pub fn list(datasets: &Datasets) {
    if datasets.is_empty() {
        println!("No datasets found.");
        return;
    }
    let width = datasets.keys().map(str::len).max().unwrap_or(0);
    for (key, dataset) in datasets.iter() {
        println!(
            "{key:<width$}  {:>3} items  {}",
            dataset.items.len(),
            dataset.description
        );
    }
}

pub fn show(datasets: &Datasets, key: &str) -> Result<()> {
    let Some(dataset) = datasets.get(key) else {
        return Err(DispatchError::DatasetNotFound {
            dataset: key.to_string(),
        }
        .into());
    };
    let output = Output::DatasetPreview(DatasetPreview::from_dataset(key, dataset));
    print!("{}", output.to_plain_text());
    Ok(())
}
