//! Interactive spans and the actions they carry.
//!
//! A span marks a character range of a cell's code as clickable. Offsets are
//! counted in `char`s against the full code string, independent of how much
//! of the code the typing animation has revealed so far.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use enum_map::Enum;

/// Visual flavor of an interactive span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Enum)]
pub enum SpanKind {
    #[default]
    Keyword,
    Function,
    Comment,
}

impl SpanKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SpanKind::Keyword => "keyword",
            SpanKind::Function => "function",
            SpanKind::Comment => "comment",
        }
    }
}

/// Caller-supplied behavior attached to a span.
///
/// The handler is opaque to the notebook: dispatching it appends nothing.
#[derive(Clone)]
pub struct CustomAction {
    label: String,
    handler: Arc<dyn Fn() + Send + Sync>,
}

impl CustomAction {
    pub fn new<F>(label: impl Into<String>, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs the handler.
    pub fn invoke(&self) {
        (self.handler)();
    }
}

impl fmt::Debug for CustomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomAction {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && Arc::ptr_eq(&self.handler, &other.handler)
    }
}

/// What happens when an interactive target is activated.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Append a cell previewing a dataset.
    LoadDataset { dataset: String },
    /// Append a cell showing one item of a dataset.
    ExploreItem { dataset: String, item_id: String },
    /// Escape hatch for caller-supplied behavior.
    Custom(CustomAction),
}

impl Action {
    pub fn load(dataset: impl Into<String>) -> Self {
        Action::LoadDataset {
            dataset: dataset.into(),
        }
    }

    pub fn explore(dataset: impl Into<String>, item_id: impl Into<String>) -> Self {
        Action::ExploreItem {
            dataset: dataset.into(),
            item_id: item_id.into(),
        }
    }

    /// Short tag used in logs and the status line.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::LoadDataset { .. } => "load_dataset",
            Action::ExploreItem { .. } => "explore_item",
            Action::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::LoadDataset { dataset } => write!(f, "load:{dataset}"),
            Action::ExploreItem { dataset, item_id } => write!(f, "explore:{dataset}/{item_id}"),
            Action::Custom(custom) => write!(f, "custom:{}", custom.label()),
        }
    }
}

/// Error returned when an action written as text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseActionError {
    /// The tag before `:` names no known action.
    UnknownKind(String),
    /// The tag is known but its argument is missing or malformed.
    Malformed { kind: &'static str, input: String },
}

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseActionError::UnknownKind(kind) => write!(f, "Unknown action type: {kind}"),
            ParseActionError::Malformed { kind, input } => {
                write!(f, "Malformed {kind} action: '{input}'")
            }
        }
    }
}

impl std::error::Error for ParseActionError {}

/// Parses `load:<dataset>` and `explore:<dataset>/<item>`.
///
/// The long tags `load_dataset` and `explore_item` are accepted as aliases.
/// Custom actions carry a handler and have no text form.
impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (kind, arg) = input.split_once(':').unwrap_or((input, ""));
        let arg = arg.trim();

        match kind.trim() {
            "load" | "load_dataset" => {
                if arg.is_empty() {
                    return Err(ParseActionError::Malformed {
                        kind: "load_dataset",
                        input: input.to_string(),
                    });
                }
                Ok(Action::load(arg))
            }
            "explore" | "explore_item" => match arg.split_once('/') {
                Some((dataset, item)) if !dataset.is_empty() && !item.is_empty() => {
                    Ok(Action::explore(dataset, item))
                }
                _ => Err(ParseActionError::Malformed {
                    kind: "explore_item",
                    input: input.to_string(),
                }),
            },
            other => Err(ParseActionError::UnknownKind(other.to_string())),
        }
    }
}

/// A clickable character range in a cell's code.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// First character of the range (inclusive).
    pub start: usize,
    /// End of the range (exclusive).
    pub end: usize,
    pub kind: SpanKind,
    pub tooltip: Option<String>,
    pub action: Option<Action>,
}

impl Span {
    pub fn new(start: usize, end: usize, kind: SpanKind) -> Self {
        Self {
            start,
            end,
            kind,
            tooltip: None,
            action: None,
        }
    }

    #[must_use]
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Number of characters covered (zero for inverted ranges).
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_parse_short_and_long_tags() {
        assert_eq!(
            "load:skills_data".parse::<Action>().unwrap(),
            Action::load("skills_data")
        );
        assert_eq!(
            "load_dataset:skills_data".parse::<Action>().unwrap(),
            Action::load("skills_data")
        );
        assert_eq!(
            "explore:skills_data/programming".parse::<Action>().unwrap(),
            Action::explore("skills_data", "programming")
        );
        assert_eq!(
            " explore_item : skills_data/programming ".parse::<Action>().unwrap(),
            Action::explore("skills_data", "programming")
        );
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = "delete:everything".parse::<Action>().unwrap_err();
        assert_eq!(err, ParseActionError::UnknownKind("delete".to_string()));
        assert_eq!(err.to_string(), "Unknown action type: delete");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            "load:".parse::<Action>(),
            Err(ParseActionError::Malformed { kind: "load_dataset", .. })
        ));
        assert!(matches!(
            "explore:skills_data".parse::<Action>(),
            Err(ParseActionError::Malformed { kind: "explore_item", .. })
        ));
        assert!(matches!(
            "explore:/programming".parse::<Action>(),
            Err(ParseActionError::Malformed { .. })
        ));
    }

    #[test]
    fn test_display_matches_parse() {
        let action = Action::explore("projects_data", "thesis");
        assert_eq!(action.to_string(), "explore:projects_data/thesis");
        assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
    }

    #[test]
    fn test_custom_action_invokes_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let custom = CustomAction::new("ping", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        custom.invoke();
        custom.invoke();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(custom.label(), "ping");
    }

    #[test]
    fn test_custom_action_equality_is_identity() {
        let a = CustomAction::new("same", || {});
        let b = CustomAction::new("same", || {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_span_len_saturates() {
        assert_eq!(Span::new(2, 10, SpanKind::Keyword).len(), 8);
        assert!(Span::new(5, 3, SpanKind::Comment).is_empty());
    }
}
