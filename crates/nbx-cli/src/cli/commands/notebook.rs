//! Interactive notebook command.

use anyhow::Result;
use nbx_core::Datasets;
use nbx_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(datasets: Datasets, config: &Config, debug_status: bool) -> Result<()> {
    use std::time::Duration;

    use nbx_core::TypingTiming;
    use nbx_tui::NotebookOptions;

    let timing = TypingTiming::from_config(&config.animation);
    let stagger = if timing.enabled {
        Duration::from_millis(config.animation.stagger_ms)
    } else {
        Duration::ZERO
    };

    let options = NotebookOptions {
        title: config.notebook.title.clone(),
        timing,
        stagger,
        show_debug_status: debug_status,
    };
    nbx_tui::run_notebook(datasets, options).await
}

#[cfg(not(feature = "tui"))]
pub async fn run(_datasets: Datasets, _config: &Config, _debug_status: bool) -> Result<()> {
    anyhow::bail!(
        "nbx was built without the notebook UI.\n\
         Use `nbx exec --action load:<dataset>` instead."
    )
}
