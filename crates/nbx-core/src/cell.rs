//! Notebook cells and their outputs.
//!
//! A cell pairs a snippet of (simulated) code with the output shown once the
//! snippet has finished typing. Cells are immutable after construction.

use std::fmt::Write;

use serde_json::Value;

use crate::dataset::{Dataset, Datasets, Item};
use crate::segments::{char_len, find_from};
use crate::span::{Action, Span, SpanKind};

/// Longest rendering of a nested value inside a preview table cell.
const PREVIEW_VALUE_MAX_CHARS: usize = 100;

/// One code + output pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub code: String,
    pub output: Output,
    pub spans: Vec<Span>,
}

impl Cell {
    pub fn new(code: impl Into<String>, output: Output) -> Self {
        Self {
            code: code.into(),
            output,
            spans: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_spans(mut self, spans: Vec<Span>) -> Self {
        self.spans = spans;
        self
    }

    /// Length of the code in characters (the typing animation's target).
    pub fn code_len(&self) -> usize {
        char_len(&self.code)
    }

    /// The opening cell listing every dataset.
    pub fn welcome(title: &str, datasets: &Datasets) -> Self {
        let mut code = format!(
            "# {title}\n\
             # Let's explore the available data\n\
             \n\
             datasets = list_available_datasets()\n\
             print(\"Available data sources:\")\n\
             for source in datasets:\n\
             \x20   print(f\"  > {{source}}\")\n\
             \n\
             # Click on any data source to explore it:"
        );
        let list_from = char_len(&code);
        for key in datasets.keys() {
            let _ = write!(code, "\n#   {key}");
        }

        let mut scan = MarkerScan::starting_at(&code, list_from);
        let spans = datasets
            .keys()
            .filter_map(|key| {
                let (start, end) = scan.find(&format!("#   {key}"), key)?;
                Some(
                    Span::new(start, end, SpanKind::Comment)
                        .with_tooltip(format!("Load {key} dataset"))
                        .with_action(Action::load(key)),
                )
            })
            .collect();

        let entries = datasets
            .iter()
            .map(|(key, dataset)| DatasetEntry {
                description: dataset.description.clone(),
                link: OutputLink::new(key, SpanKind::Keyword, Action::load(key)),
            })
            .collect();

        Cell::new(
            code,
            Output::DatasetList {
                heading: "Available data sources:".to_string(),
                entries,
            },
        )
        .with_spans(spans)
    }
}

/// A clickable target inside a cell's output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLink {
    pub label: String,
    pub kind: SpanKind,
    pub action: Action,
}

impl OutputLink {
    pub fn new(label: impl Into<String>, kind: SpanKind, action: Action) -> Self {
        Self {
            label: label.into(),
            kind,
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetEntry {
    pub description: String,
    pub link: OutputLink,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetPreview {
    pub name: String,
    pub description: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// One explore link per item.
    pub links: Vec<OutputLink>,
}

impl DatasetPreview {
    /// Tabulates a dataset. Columns are the union of item fields in
    /// first-seen order; missing values render empty.
    pub fn from_dataset(key: &str, dataset: &Dataset) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for item in &dataset.items {
            for (field, _) in item.fields() {
                if !columns.iter().any(|c| c == field) {
                    columns.push(field.to_string());
                }
            }
        }

        let rows = dataset
            .items
            .iter()
            .map(|item| {
                columns
                    .iter()
                    .map(|column| {
                        item.fields()
                            .find(|(field, _)| field == column)
                            .map(|(_, value)| preview_value(value))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        let links = dataset
            .items
            .iter()
            .filter_map(|item| {
                let handle = item.handle()?;
                let label = item.title().or_else(|| item.name()).unwrap_or(handle);
                Some(OutputLink::new(
                    label,
                    SpanKind::Function,
                    Action::explore(key, handle),
                ))
            })
            .collect();

        Self {
            name: dataset.display_name().to_string(),
            description: dataset.description.clone(),
            columns,
            rows,
            links,
        }
    }
}

/// How a field value is displayed in a detail view.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
    /// Pretty-printed JSON.
    Object(String),
}

impl FieldValue {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => FieldValue::List(items.iter().map(scalar_text).collect()),
            Value::Object(_) => FieldValue::Object(
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            ),
            other => FieldValue::Scalar(scalar_text(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetails {
    pub heading: String,
    pub fields: Vec<(String, FieldValue)>,
    /// `(label, link)` per related dataset.
    pub related: Vec<(String, OutputLink)>,
}

impl ItemDetails {
    pub fn from_item(item: &Item) -> Self {
        Self {
            heading: item.heading().to_string(),
            fields: item
                .fields()
                .map(|(key, value)| (key.to_string(), FieldValue::from_value(value)))
                .collect(),
            related: item
                .related()
                .into_iter()
                .map(|(label, target)| {
                    (
                        label.to_string(),
                        OutputLink::new(target, SpanKind::Keyword, Action::load(target)),
                    )
                })
                .collect(),
        }
    }
}

/// What a cell shows once its code has finished typing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Output {
    #[default]
    Empty,
    Text(String),
    DatasetList {
        heading: String,
        entries: Vec<DatasetEntry>,
    },
    DatasetPreview(DatasetPreview),
    ItemDetails(ItemDetails),
}

impl Output {
    /// Clickable targets in display order.
    pub fn links(&self) -> Vec<&OutputLink> {
        match self {
            Output::Empty | Output::Text(_) => Vec::new(),
            Output::DatasetList { entries, .. } => entries.iter().map(|e| &e.link).collect(),
            Output::DatasetPreview(preview) => preview.links.iter().collect(),
            Output::ItemDetails(details) => details.related.iter().map(|(_, link)| link).collect(),
        }
    }

    /// Plain-text rendering used outside the TUI.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        match self {
            Output::Empty => {}
            Output::Text(text) => out.push_str(text),
            Output::DatasetList { heading, entries } => {
                let _ = writeln!(out, "{heading}");
                for entry in entries {
                    let _ = writeln!(out, "  > {}", entry.link.label);
                    if !entry.description.is_empty() {
                        let _ = writeln!(out, "      {}", entry.description);
                    }
                }
            }
            Output::DatasetPreview(preview) => {
                let _ = writeln!(out, "Dataset: {}", preview.name);
                if !preview.description.is_empty() {
                    let _ = writeln!(out, "{}", preview.description);
                }
                if preview.rows.is_empty() {
                    let _ = writeln!(out, "No data available");
                } else {
                    let _ = writeln!(out, "{}", preview.columns.join(" | "));
                    for row in &preview.rows {
                        let _ = writeln!(out, "{}", row.join(" | "));
                    }
                }
                if !preview.links.is_empty() {
                    let labels: Vec<&str> = preview.links.iter().map(|l| l.label.as_str()).collect();
                    let _ = writeln!(out, "Click on any item for details: {}", labels.join(", "));
                }
            }
            Output::ItemDetails(details) => {
                let _ = writeln!(out, "{}", details.heading);
                for (key, value) in &details.fields {
                    match value {
                        FieldValue::Scalar(text) => {
                            let _ = writeln!(out, "{key}: {text}");
                        }
                        FieldValue::List(items) => {
                            let _ = writeln!(out, "{key}:");
                            for item in items {
                                let _ = writeln!(out, "  - {item}");
                            }
                        }
                        FieldValue::Object(json) => {
                            let _ = writeln!(out, "{key}:");
                            for line in json.lines() {
                                let _ = writeln!(out, "  {line}");
                            }
                        }
                    }
                }
                if !details.related.is_empty() {
                    let _ = writeln!(out, "Related:");
                    for (label, link) in &details.related {
                        let _ = writeln!(out, "  {label}: {}", link.label);
                    }
                }
            }
        }
        out
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn preview_value(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => {
            let json = value.to_string();
            if char_len(&json) > PREVIEW_VALUE_MAX_CHARS {
                let head: String = json.chars().take(PREVIEW_VALUE_MAX_CHARS).collect();
                format!("{head}...")
            } else {
                json
            }
        }
        other => scalar_text(other),
    }
}

/// Walks generated code left to right, locating marker substrings.
///
/// Each successful lookup resumes after the previous match, so repeated
/// markers resolve to successive occurrences.
pub(crate) struct MarkerScan<'a> {
    code: &'a str,
    cursor: usize,
}

impl<'a> MarkerScan<'a> {
    pub(crate) fn new(code: &'a str) -> Self {
        Self { code, cursor: 0 }
    }

    pub(crate) fn starting_at(code: &'a str, cursor: usize) -> Self {
        Self { code, cursor }
    }

    /// Finds the next `marker` and returns the char range of `target` within it.
    /// An empty `target` never matches.
    pub(crate) fn find(&mut self, marker: &str, target: &str) -> Option<(usize, usize)> {
        if target.is_empty() {
            return None;
        }
        let inner = marker.find(target)?;
        let at = find_from(self.code, marker, self.cursor)?;
        let start = at + char_len(&marker[..inner]);
        self.cursor = at + char_len(marker);
        Some((start, start + char_len(target)))
    }
}
