//! Resolves activated actions into new notebook cells.
//!
//! Load and explore actions synthesize a cell whose code mentions what was
//! loaded, with spans pointing at the next things to explore. Spans are found
//! by scanning the generated code, so offsets always match the text.

use std::fmt;
use std::fmt::Write;

use crate::cell::{Cell, DatasetPreview, ItemDetails, MarkerScan, Output};
use crate::dataset::{Dataset, Datasets, Item};
use crate::segments::char_len;
use crate::session::NotebookSession;
use crate::span::{Action, Span, SpanKind};

/// A recoverable lookup failure. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    DatasetNotFound { dataset: String },
    ItemNotFound { dataset: String, item_id: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::DatasetNotFound { dataset } => {
                write!(f, "Dataset '{dataset}' not found")
            }
            DispatchError::ItemNotFound { dataset, item_id } => {
                write!(f, "Item '{item_id}' not found in dataset '{dataset}'")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/// What a successful dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// A cell was appended at this index.
    Appended(usize),
    /// A custom handler ran.
    Invoked,
}

pub struct Dispatcher<'a> {
    datasets: &'a Datasets,
}

impl<'a> Dispatcher<'a> {
    pub fn new(datasets: &'a Datasets) -> Self {
        Self { datasets }
    }

    /// Runs `action` against `session`.
    ///
    /// Failures are logged once and returned; nothing is appended.
    pub fn dispatch(
        &self,
        action: &Action,
        session: &mut NotebookSession,
    ) -> Result<Dispatched, DispatchError> {
        let result = match action {
            Action::Custom(custom) => {
                custom.invoke();
                Ok(Dispatched::Invoked)
            }
            Action::LoadDataset { dataset } => self
                .load_dataset_cell(dataset)
                .map(|cell| Dispatched::Appended(session.append(cell))),
            Action::ExploreItem { dataset, item_id } => self
                .explore_item_cell(dataset, item_id)
                .map(|cell| Dispatched::Appended(session.append(cell))),
        };

        match &result {
            Ok(outcome) => tracing::debug!(%action, ?outcome, "dispatched action"),
            Err(err) => tracing::warn!(%action, "{err}"),
        }
        result
    }

    fn dataset(&self, key: &str) -> Result<&'a Dataset, DispatchError> {
        self.datasets
            .get(key)
            .ok_or_else(|| DispatchError::DatasetNotFound {
                dataset: key.to_string(),
            })
    }

    /// Builds the preview cell for a dataset.
    pub fn load_dataset_cell(&self, key: &str) -> Result<Cell, DispatchError> {
        let dataset = self.dataset(key)?;
        let explorable: Vec<(&Item, &str)> = dataset
            .items
            .iter()
            .filter_map(|item| Some((item, item.handle()?)))
            .collect();

        let mut code = format!(
            "# Loading dataset: {key}\n\
             dataset = load_dataset(\"{key}\")\n\
             \n\
             # Display basic information\n\
             dataset.info()"
        );
        if !explorable.is_empty() {
            code.push_str("\n\n# Explore an item:");
            for (_, handle) in &explorable {
                let _ = write!(code, "\ndataset.explore(\"{handle}\")");
            }
        }

        let mut scan = MarkerScan::new(&code);
        let spans = explorable
            .iter()
            .filter_map(|(item, handle)| {
                let marker = format!("dataset.explore(\"{handle}\")");
                let (start, end) = scan.find(&marker, &marker)?;
                let label = item.display_name().unwrap_or(*handle);
                Some(
                    Span::new(start, end, SpanKind::Function)
                        .with_tooltip(format!("Explore details for {label}"))
                        .with_action(Action::explore(key, *handle)),
                )
            })
            .collect();

        Ok(Cell::new(
            code,
            Output::DatasetPreview(DatasetPreview::from_dataset(key, dataset)),
        )
        .with_spans(spans))
    }

    /// Builds the detail cell for one item.
    pub fn explore_item_cell(&self, key: &str, item_id: &str) -> Result<Cell, DispatchError> {
        let item = self
            .dataset(key)?
            .find_item(item_id)
            .ok_or_else(|| DispatchError::ItemNotFound {
                dataset: key.to_string(),
                item_id: item_id.to_string(),
            })?;
        let related = item.related();
        let label = item.display_name().unwrap_or(item_id);

        let mut code = format!(
            "# Exploring details for: {label}\n\
             item = dataset.get_item(\"{item_id}\")\n\
             \n\
             # Display detailed information\n\
             display_details(item)"
        );
        let related_from = char_len(&code);
        if !related.is_empty() {
            code.push_str("\n\n# Related datasets:");
            for (name, _) in &related {
                let _ = write!(code, "\nitem.related(\"{name}\")");
            }
        }

        let mut scan = MarkerScan::starting_at(&code, related_from);
        let spans = related
            .iter()
            .filter_map(|(name, target)| {
                let found = scan.find(&format!("\"{name}\""), name)?;
                self.datasets.contains(target).then_some((found, target))
            })
            .map(|((start, end), target)| {
                Span::new(start, end, SpanKind::Keyword)
                    .with_tooltip(format!("Explore related dataset: {target}"))
                    .with_action(Action::load(*target))
            })
            .collect();

        Ok(Cell::new(code, Output::ItemDetails(ItemDetails::from_item(item))).with_spans(spans))
    }
}
