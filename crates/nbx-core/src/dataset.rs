//! The read-only dataset graph browsed by the notebook.
//!
//! Datasets are keyed collections of loosely shaped items. Each item should be
//! reachable through an `id` or `name` field and may point at other datasets
//! through a `related` object of `label -> dataset key`. Everything else on an
//! item is free-form and only displayed. Key and field order follow the
//! source JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Fields that identify or link an item and are hidden from displays.
const INTERNAL_FIELDS: &[&str] = &["id", "related"];

fn builtin_source() -> &'static str {
    include_str!("../datasets.json")
}

/// A single record in a dataset.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct Item {
    raw: Map<String, Value>,
}

impl Item {
    /// Builds an item from a JSON object. Non-objects yield an empty item.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(raw) => Self { raw },
            _ => Self::default(),
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    /// Stable identity used in `ExploreItem` actions: `id`, else `name`.
    pub fn handle(&self) -> Option<&str> {
        self.id().or_else(|| self.name())
    }

    /// Short label for code comments and tooltips: `name`, else `title`, else `id`.
    pub fn display_name(&self) -> Option<&str> {
        self.name().or_else(|| self.title()).or_else(|| self.id())
    }

    /// Heading for detail views: `title`, else `name`.
    pub fn heading(&self) -> &str {
        self.title()
            .or_else(|| self.name())
            .unwrap_or("Item Details")
    }

    /// True if `handle` names this item, checking `id` before `name`.
    pub fn matches(&self, handle: &str) -> bool {
        self.id() == Some(handle) || self.name() == Some(handle)
    }

    /// `(label, dataset key)` pairs from the `related` object.
    pub fn related(&self) -> Vec<(&str, &str)> {
        match self.raw.get("related") {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(label, key)| Some((label.as_str(), key.as_str()?)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Displayable fields (everything but `id` and `related`) in source order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.raw
            .iter()
            .filter(|(key, _)| !INTERNAL_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value))
    }
}

/// A named collection of items.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub name: String,
    pub description: String,
    pub items: Vec<Item>,
}

impl Dataset {
    /// Finds an item by `id`, falling back to `name`.
    pub fn find_item(&self, handle: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.id() == Some(handle))
            .or_else(|| self.items.iter().find(|item| item.name() == Some(handle)))
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed"
        } else {
            &self.name
        }
    }
}

/// All datasets, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Datasets {
    entries: Vec<(String, Dataset)>,
}

impl Datasets {
    /// The dataset graph compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(builtin_source()).context("Failed to parse built-in datasets")
    }

    /// Loads datasets from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read datasets from {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse datasets from {}", path.display()))
    }

    /// Parses a JSON object of `key -> dataset`.
    pub fn from_json(text: &str) -> Result<Self> {
        let root: Map<String, Value> =
            serde_json::from_str(text).context("datasets must be a JSON object")?;
        let mut entries = Vec::with_capacity(root.len());
        for (key, value) in root {
            let dataset: Dataset = serde_json::from_value(value)
                .with_context(|| format!("invalid dataset '{key}'"))?;
            entries.push((key, dataset));
        }
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<(String, Dataset)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Dataset> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, dataset)| dataset)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dataset)> {
        self.entries
            .iter()
            .map(|(key, dataset)| (key.as_str(), dataset))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_builtin_parses_in_order() {
        let datasets = Datasets::builtin().unwrap();
        let keys: Vec<_> = datasets.keys().collect();
        assert_eq!(
            keys,
            vec!["about_data", "skills_data", "education_data", "projects_data"]
        );
    }

    #[test]
    fn test_builtin_related_targets_exist() {
        let datasets = Datasets::builtin().unwrap();
        for (_, dataset) in datasets.iter() {
            for item in &dataset.items {
                assert!(item.handle().is_some());
                for (_, target) in item.related() {
                    assert!(datasets.contains(target), "dangling related key {target}");
                }
            }
        }
    }

    #[test]
    fn test_find_item_checks_id_then_name() {
        let dataset = Dataset {
            name: "d".to_string(),
            description: String::new(),
            items: vec![
                Item::from_value(json!({ "name": "a", "title": "By name" })),
                Item::from_value(json!({ "id": "a", "name": "b", "title": "By id" })),
            ],
        };

        assert_eq!(dataset.find_item("a").unwrap().title(), Some("By id"));
        assert_eq!(dataset.find_item("b").unwrap().title(), Some("By id"));
        assert!(dataset.find_item("c").is_none());
    }

    #[test]
    fn test_item_labels_fall_back() {
        let item = Item::from_value(json!({ "id": "x", "title": "Ex" }));
        assert_eq!(item.handle(), Some("x"));
        assert_eq!(item.display_name(), Some("Ex"));
        assert_eq!(item.heading(), "Ex");

        let bare = Item::from_value(json!({ "id": "", "count": 3 }));
        assert_eq!(bare.handle(), None);
        assert_eq!(bare.heading(), "Item Details");
    }

    #[test]
    fn test_fields_skip_internal_and_keep_order() {
        let item = Item::from_value(json!({
            "id": "masters",
            "title": "Master's Degree",
            "period": "2022 - 2024",
            "related": { "Skills": "skills_data" },
            "gpa": "4.0"
        }));

        let keys: Vec<_> = item.fields().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["title", "period", "gpa"]);
        assert_eq!(item.related(), vec![("Skills", "skills_data")]);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Datasets::from_json("[1, 2]").is_err());
        let err = Datasets::from_json(r#"{"a": {"items": 5}}"#).unwrap_err();
        assert!(format!("{err:#}").contains("invalid dataset 'a'"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"only": {"name": "only", "items": [{"id": "x"}]}}"#).unwrap();

        let datasets = Datasets::load_from(&path).unwrap();

        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets.get("only").unwrap().items.len(), 1);
        assert!(Datasets::load_from(&dir.path().join("missing.json")).is_err());
    }
}
