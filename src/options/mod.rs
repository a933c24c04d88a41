//! Filterable fields.
//!
//! Every field implements the same four-operation contract
//! ([`FilterOption::set_list`], [`FilterOption::set_selected`],
//! [`FilterOption::reset_value`], [`FilterOption::selected_for_query`]).
//! The two concrete variants differ only in their empty representation and
//! serialization shape:
//!
//! - [`StringOption`]: a single scalar (`search`, `startDate`, `finishDate`).
//! - [`ListOption`]: a set of identifiers (`donors`, `outputs`, ...).

mod list;
mod string;

pub use list::{ListOption, OptionEntry};
pub use string::StringOption;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::query::Query;

/// Scalar-valued fields, in declaration order.
pub const STRING_FIELDS: [&str; 3] = ["search", "startDate", "finishDate"];

/// Identifier-set fields, in declaration order.
pub const LIST_FIELDS: [&str; 5] = [
    "donors",
    "responsible",
    "commitments",
    "commitmentType",
    "outputs",
];

/// Available option values for a root, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionsSnapshot(Map<String, Value>);

impl OptionsSnapshot {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build from an arbitrary JSON value. Non-objects yield an empty snapshot.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One filterable field: its available values and its current selection.
pub trait FilterOption: fmt::Debug + Send + Sync {
    /// Stable field identifier; also the key used in queries and presets.
    fn name(&self) -> &str;

    /// Replace the available values with those found in `snapshot`.
    /// Never merges with a previous list.
    fn set_list(&mut self, snapshot: &OptionsSnapshot);

    /// Read this field's value out of `source`.
    /// A missing or malformed entry leaves the selection unchanged.
    fn set_selected(&mut self, source: &Query);

    /// Clear the selection to the empty representation.
    fn reset_value(&mut self);

    /// Query-serializable selection, or `None` when nothing is selected.
    fn selected_for_query(&self) -> Option<Value>;

    /// Number of values loaded by the last [`FilterOption::set_list`].
    fn available_count(&self) -> usize;
}

/// The eight fields a Gantt filter exposes.
pub fn default_options() -> Vec<Box<dyn FilterOption>> {
    let strings = STRING_FIELDS
        .iter()
        .map(|name| Box::new(StringOption::new(*name)) as Box<dyn FilterOption>);
    let lists = LIST_FIELDS
        .iter()
        .map(|name| Box::new(ListOption::new(*name)) as Box<dyn FilterOption>);
    strings.chain(lists).collect()
}
