//! Headless notebook: runs actions against a fresh session and prints cells.

use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::Result;
use nbx_core::config::Config;
use nbx_core::{Action, Cell, Datasets, Dispatcher, NotebookSession};

pub fn run(datasets: &Datasets, config: &Config, actions: &[String]) -> Result<()> {
    let session = run_actions(datasets, &config.notebook.title, actions, &mut io::stderr())?;

    let mut out = io::stdout().lock();
    for (index, cell) in session.cells().iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        write!(out, "{}", format_cell(index, cell))?;
    }
    Ok(())
}

/// Applies `actions` in order. Unparseable actions and failed lookups are
/// reported to `diagnostics` and the run continues.
fn run_actions(
    datasets: &Datasets,
    title: &str,
    actions: &[String],
    diagnostics: &mut impl Write,
) -> Result<NotebookSession> {
    let mut session = NotebookSession::new(vec![Cell::welcome(title, datasets)]);
    let dispatcher = Dispatcher::new(datasets);

    for raw in actions {
        let action: Action = match raw.parse() {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!(input = %raw, "{err}");
                writeln!(diagnostics, "Warning: {err} (skipped)")?;
                continue;
            }
        };
        if let Err(err) = dispatcher.dispatch(&action, &mut session) {
            writeln!(diagnostics, "Error: {err}")?;
        }
    }

    Ok(session)
}

/// Plain-text rendering of one cell.
fn format_cell(index: usize, cell: &Cell) -> String {
    let n = index + 1;
    let mut text = format!("In [{n}]:\n{}\n", cell.code);
    let output = cell.output.to_plain_text();
    let output = output.trim_end();
    if !output.is_empty() {
        let _ = write!(text, "\nOut [{n}]:\n{output}\n");
    }
    text
}

#[cfg(test)]
mod tests {
    use nbx_core::Output;

    use super::*;

    fn run_with(actions: &[&str]) -> (NotebookSession, String) {
        let datasets = Datasets::builtin().unwrap();
        let actions: Vec<String> = actions.iter().map(ToString::to_string).collect();
        let mut diagnostics = Vec::new();
        let session = run_actions(&datasets, "Test", &actions, &mut diagnostics).unwrap();
        (session, String::from_utf8(diagnostics).unwrap())
    }

    #[test]
    fn test_actions_append_in_order() {
        let (session, diagnostics) = run_with(&["load:skills_data", "explore:skills_data/programming"]);

        assert!(diagnostics.is_empty());
        assert_eq!(session.len(), 3);
        assert!(session.cells()[1].code.contains("load_dataset(\"skills_data\")"));
        assert!(session.cells()[2].code.contains("get_item(\"programming\")"));
    }

    #[test]
    fn test_unknown_kind_is_skipped_with_warning() {
        let (session, diagnostics) = run_with(&["teleport:somewhere", "load:about_data"]);

        assert_eq!(session.len(), 2);
        assert_eq!(
            diagnostics,
            "Warning: Unknown action type: teleport (skipped)\n"
        );
    }

    #[test]
    fn test_missing_dataset_reports_once_and_continues() {
        let (session, diagnostics) = run_with(&["load:nope", "load:projects_data"]);

        assert_eq!(session.len(), 2);
        assert_eq!(diagnostics, "Error: Dataset 'nope' not found\n");
    }

    #[test]
    fn test_format_cell_with_and_without_output() {
        let cell = Cell::new("x = 1", Output::Text("1".to_string()));
        assert_eq!(format_cell(0, &cell), "In [1]:\nx = 1\n\nOut [1]:\n1\n");

        let cell = Cell::new("pass", Output::Empty);
        assert_eq!(format_cell(4, &cell), "In [5]:\npass\n");
    }
}
