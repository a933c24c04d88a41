use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{FilterOption, OptionsSnapshot};
use crate::query::{FilterId, Query};

/// One selectable value of a list field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub id: FilterId,
    #[serde(default, alias = "title", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Any other fields the backend sends along (colors, parents, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OptionEntry {
    /// Parse either an object carrying `id` or a bare scalar id.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let id = map.get("id").and_then(FilterId::from_value)?;
                let name = map
                    .get("name")
                    .or_else(|| map.get("title"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let extra = map
                    .iter()
                    .filter(|(k, _)| !matches!(k.as_str(), "id" | "name" | "title"))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Some(Self { id, name, extra })
            }
            other => FilterId::from_value(other).map(|id| Self {
                id,
                name: None,
                extra: Map::new(),
            }),
        }
    }
}

/// Identifier-set field such as donors or outputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOption {
    name: String,
    list: Vec<OptionEntry>,
    selected: Vec<FilterId>,
}

impl ListOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn list(&self) -> &[OptionEntry] {
        &self.list
    }

    pub fn selected(&self) -> &[FilterId] {
        &self.selected
    }

    /// Selected ids that the last loaded list does not offer.
    pub fn stale_selection(&self) -> Vec<&FilterId> {
        self.selected
            .iter()
            .filter(|id| !self.list.iter().any(|entry| &entry.id == *id))
            .collect()
    }

    fn parse_selection(value: &Value) -> Option<Vec<FilterId>> {
        let ids: Vec<FilterId> = match value {
            Value::Array(items) => items.iter().filter_map(FilterId::from_value).collect(),
            Value::String(_) | Value::Number(_) => FilterId::from_value(value).into_iter().collect(),
            _ => return None,
        };
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Some(unique)
    }
}

impl FilterOption for ListOption {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_list(&mut self, snapshot: &OptionsSnapshot) {
        self.list = match snapshot.get(&self.name) {
            Some(Value::Array(items)) => {
                let entries: Vec<OptionEntry> =
                    items.iter().filter_map(OptionEntry::from_value).collect();
                if entries.len() != items.len() {
                    debug!(
                        field = %self.name,
                        skipped = items.len() - entries.len(),
                        "skipped malformed option entries"
                    );
                }
                entries
            }
            _ => Vec::new(),
        };
    }

    fn set_selected(&mut self, source: &Query) {
        let Some(ids) = source.get(&self.name).and_then(Self::parse_selection) else {
            return;
        };
        self.selected = ids;
        if !self.list.is_empty() {
            let stale = self.stale_selection();
            if !stale.is_empty() {
                debug!(field = %self.name, ?stale, "selection references unknown option values");
            }
        }
    }

    fn reset_value(&mut self) {
        self.selected.clear();
    }

    fn selected_for_query(&self) -> Option<Value> {
        if self.selected.is_empty() {
            None
        } else {
            Some(Value::Array(
                self.selected.iter().map(FilterId::to_value).collect(),
            ))
        }
    }

    fn available_count(&self) -> usize {
        self.list.len()
    }
}
