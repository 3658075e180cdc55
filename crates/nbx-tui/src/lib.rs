//! Full-screen notebook TUI for nbx.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
pub use features::{notebook, statusline};
use nbx_core::Datasets;
pub use runtime::TuiRuntime;
pub use state::{AppState, NotebookOptions};

/// Runs the interactive notebook until the user quits.
///
/// Must be called from inside a tokio runtime: typing schedules are spawned
/// as tasks on it.
pub async fn run_notebook(datasets: Datasets, options: NotebookOptions) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The notebook requires a terminal.\n\
             Use `nbx exec --action load:<dataset>` for non-interactive output."
        );
    }

    tracing::info!(
        datasets = datasets.len(),
        animated = options.timing.enabled,
        "starting notebook"
    );

    let mut runtime = TuiRuntime::new(datasets, &options)?;
    runtime.run()?;

    let cells = runtime.state.notebook.session.len();
    drop(runtime);
    tracing::info!(cells, "notebook closed");
    Ok(())
}
