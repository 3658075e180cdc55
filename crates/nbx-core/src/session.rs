//! In-memory notebook session.

use crate::cell::Cell;

/// The ordered list of cells shown by the notebook.
///
/// Cells are only ever appended. `reset` restores a fresh copy of the cells
/// the session was created with, so nothing appended earlier survives.
#[derive(Debug, Clone, PartialEq)]
pub struct NotebookSession {
    initial: Vec<Cell>,
    cells: Vec<Cell>,
}

impl NotebookSession {
    pub fn new(initial: Vec<Cell>) -> Self {
        Self {
            cells: initial.clone(),
            initial,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn initial_len(&self) -> usize {
        self.initial.len()
    }

    /// Appends a cell and returns its index.
    pub fn append(&mut self, cell: Cell) -> usize {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    pub fn reset(&mut self) {
        self.cells.clone_from(&self.initial);
    }
}
