//! Flat query/parameter mapping shared by URL state, presets and data fetches.
//!
//! A [`Query`] maps field names to JSON values: a scalar for string-valued
//! fields, an array of identifiers for list-valued fields. Absent keys mean
//! "no constraint on that field".
//!
//! The URL form accepts `key=value`, repeated `key=value` and `key[]=value`;
//! it always writes lists as `key[]=value`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a selectable list entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterId {
    Int(i64),
    Text(String),
}

impl FilterId {
    /// Normalize a raw JSON value into an id.
    ///
    /// Integral numbers and strings spelling an `i64` in canonical form
    /// (`"7"`, `"-3"`, not `"007"` or `"+5"`) become [`FilterId::Int`];
    /// other non-empty strings stay textual. Everything else is rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int).or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| Self::Int(f as i64))
            }),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else if let Some(n) = trimmed
                    .parse::<i64>()
                    .ok()
                    .filter(|n| n.to_string() == trimmed)
                {
                    Some(Self::Int(n))
                } else {
                    Some(Self::Text(trimmed.to_string()))
                }
            }
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for FilterId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FilterId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Flat key -> value parameter mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, Value>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an arbitrary JSON value. Non-objects yield an empty query.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map.into_iter().collect()),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a URL query string (with or without the leading `?`).
    pub fn from_url_query(input: &str) -> Self {
        let input = input.trim().trim_start_matches('?');
        let mut scalars: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut bracketed: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            match key.strip_suffix("[]") {
                Some(base) if !base.is_empty() => {
                    bracketed
                        .entry(base.to_string())
                        .or_default()
                        .push(value.into_owned());
                }
                _ => scalars
                    .entry(key.into_owned())
                    .or_default()
                    .push(value.into_owned()),
            }
        }

        let mut query = Self::default();
        for (key, mut values) in scalars {
            let value = if values.len() == 1 {
                Value::String(values.remove(0))
            } else {
                Value::Array(values.into_iter().map(Value::String).collect())
            };
            query.0.insert(key, value);
        }
        for (key, values) in bracketed {
            query
                .0
                .insert(key, Value::Array(values.into_iter().map(Value::String).collect()));
        }
        query
    }

    /// Serialize to a URL query string (no leading `?`).
    pub fn to_url_query(&self) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            match value {
                Value::Array(items) => {
                    let array_key = format!("{key}[]");
                    for item in items {
                        if let Some(text) = scalar_text(item) {
                            out.append_pair(&array_key, &text);
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar_text(other) {
                        out.append_pair(key, &text);
                    }
                }
            }
        }
        out.finish()
    }
}

impl FromIterator<(String, Value)> for Query {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
