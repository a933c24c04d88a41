use serde_json::Value;

use super::{FilterOption, OptionsSnapshot};
use crate::query::Query;

/// Scalar-valued field such as free-text search or a date bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringOption {
    name: String,
    list: Vec<String>,
    selected: String,
}

impl StringOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn list(&self) -> &[String] {
        &self.list
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl FilterOption for StringOption {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_list(&mut self, snapshot: &OptionsSnapshot) {
        self.list = match snapshot.get(&self.name) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(other) => scalar_to_string(other).into_iter().collect(),
            None => Vec::new(),
        };
    }

    fn set_selected(&mut self, source: &Query) {
        let value = match source.get(&self.name) {
            Some(Value::Array(items)) => items.iter().find_map(scalar_to_string),
            Some(other) => scalar_to_string(other),
            None => None,
        };
        if let Some(value) = value {
            self.selected = value;
        }
    }

    fn reset_value(&mut self) {
        self.selected.clear();
    }

    fn selected_for_query(&self) -> Option<Value> {
        if self.selected.is_empty() {
            None
        } else {
            Some(Value::String(self.selected.clone()))
        }
    }

    fn available_count(&self) -> usize {
        self.list.len()
    }
}
