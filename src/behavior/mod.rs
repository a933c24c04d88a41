//! Result behaviors: how matching and non-matching items are presented.
//!
//! A behavior is single-use. It is created right before a filter request,
//! applies its effect to an [`ItemStore`], and must be cancelled before it is
//! dropped or replaced. Cancellation is synchronous and restores every flag
//! the behavior touched.

mod hide;
mod highlight;
mod show;

pub use hide::HideBehavior;
pub use highlight::HighlightBehavior;
pub use show::ShowBehavior;

use clap::ValueEnum;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::FilterError;

/// How filtered-out items are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultMode {
    /// Only matching items stay visible.
    #[default]
    Show,
    /// Matching items are hidden.
    Hide,
    /// Everything stays visible; matching items are emphasized.
    Highlight,
}

impl ResultMode {
    pub const ALL: [ResultMode; 3] = [Self::Show, Self::Hide, Self::Highlight];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Show => "SHOW",
            Self::Hide => "HIDE",
            Self::Highlight => "HIGHLIGHT",
        }
    }

    /// Fresh behavior instance for this mode.
    pub fn behavior(self) -> Box<dyn ResultBehavior> {
        match self {
            Self::Show => Box::new(ShowBehavior::default()),
            Self::Hide => Box::new(HideBehavior::default()),
            Self::Highlight => Box::new(HighlightBehavior::default()),
        }
    }
}

impl fmt::Display for ResultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHOW" => Ok(Self::Show),
            "HIDE" => Ok(Self::Hide),
            "HIGHLIGHT" => Ok(Self::Highlight),
            _ => Err(FilterError::UnknownResultMode(s.to_string())),
        }
    }
}

/// Strategy applying one result mode to a set of items.
pub trait ResultBehavior: fmt::Debug + Send {
    fn mode(&self) -> ResultMode;

    /// Apply the effect: `filtered` holds the uids of items matching the
    /// active criteria, `all_items` is the complete collection.
    fn filter(&mut self, all_items: &ItemStore, filtered: &[String]);

    /// Undo the applied effect. Safe to call repeatedly and on an instance
    /// that never filtered.
    fn cancel_filtration(&mut self);

    /// Whether an effect from this instance is currently in place.
    fn is_applied(&self) -> bool;
}

/// Factory used by the controller to instantiate behaviors.
pub type BehaviorFactory = Box<dyn Fn(ResultMode) -> Box<dyn ResultBehavior> + Send + Sync>;

pub fn default_factory() -> BehaviorFactory {
    Box::new(ResultMode::behavior)
}

/// One chart row as seen by the behaviors.
#[derive(Debug, Clone, PartialEq)]
pub struct GanttItem {
    pub uid: String,
    pub visible: bool,
    pub highlighted: bool,
    pub data: Value,
}

impl GanttItem {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            visible: true,
            highlighted: false,
            data: Value::Null,
        }
    }

    /// Build from a payload object, keyed by `uid` with `id` as fallback.
    pub fn from_value(value: &Value) -> Option<Self> {
        let uid = uid_of(value)?;
        Some(Self {
            uid,
            visible: true,
            highlighted: false,
            data: value.clone(),
        })
    }
}

fn uid_of(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    let raw = obj.get("uid").or_else(|| obj.get("id"))?;
    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Locate the item array inside a raw data payload.
fn payload_items(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => ["items", "tasks", "data"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Uids of every item found in a raw data payload, in payload order.
pub fn payload_uids(payload: &Value) -> Vec<String> {
    payload_items(payload).iter().filter_map(uid_of).collect()
}

/// Shared, mutable item collection a behavior acts upon.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Arc<RwLock<Vec<GanttItem>>>,
}

impl ItemStore {
    pub fn new(items: Vec<GanttItem>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    pub fn from_payload(payload: &Value) -> Self {
        Self::new(
            payload_items(payload)
                .iter()
                .filter_map(GanttItem::from_value)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<GanttItem> {
        self.items.read().clone()
    }

    pub fn visible_uids(&self) -> Vec<String> {
        self.items
            .read()
            .iter()
            .filter(|item| item.visible)
            .map(|item| item.uid.clone())
            .collect()
    }

    pub fn highlighted_uids(&self) -> Vec<String> {
        self.items
            .read()
            .iter()
            .filter(|item| item.highlighted)
            .map(|item| item.uid.clone())
            .collect()
    }

    pub fn get(&self, uid: &str) -> Option<GanttItem> {
        self.items.read().iter().find(|item| item.uid == uid).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flags {
    visible: bool,
    highlighted: bool,
}

/// Undo journal shared by the concrete behaviors.
///
/// Prior flags are recorded by position, so items sharing a uid are
/// restored independently.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    applied: Option<(ItemStore, Vec<Flags>)>,
}

impl Journal {
    pub(crate) fn apply(
        &mut self,
        store: &ItemStore,
        filtered: &[String],
        mark: impl Fn(&mut GanttItem, bool),
    ) {
        self.undo();
        let matching: HashSet<&str> = filtered.iter().map(String::as_str).collect();
        let mut items = store.items.write();
        let previous: Vec<Flags> = items
            .iter()
            .map(|item| Flags {
                visible: item.visible,
                highlighted: item.highlighted,
            })
            .collect();
        for item in items.iter_mut() {
            let matched = matching.contains(item.uid.as_str());
            mark(item, matched);
        }
        drop(items);
        self.applied = Some((store.clone(), previous));
    }

    pub(crate) fn undo(&mut self) {
        let Some((store, previous)) = self.applied.take() else {
            return;
        };
        for (item, flags) in store.items.write().iter_mut().zip(previous) {
            item.visible = flags.visible;
            item.highlighted = flags.highlighted;
        }
    }

    pub(crate) fn is_applied(&self) -> bool {
        self.applied.is_some()
    }
}

#[cfg(test)]
pub(crate) fn sample_store() -> ItemStore {
    ItemStore::new(["a", "b", "c", "d"].into_iter().map(GanttItem::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("show".parse::<ResultMode>().unwrap(), ResultMode::Show);
        assert_eq!(" Hide ".parse::<ResultMode>().unwrap(), ResultMode::Hide);
        assert_eq!("HIGHLIGHT".parse::<ResultMode>().unwrap(), ResultMode::Highlight);
        assert!(matches!(
            "blink".parse::<ResultMode>(),
            Err(FilterError::UnknownResultMode(_))
        ));
    }

    #[test]
    fn mode_serializes_uppercase() {
        assert_eq!(serde_json::to_value(ResultMode::Highlight).unwrap(), json!("HIGHLIGHT"));
        let mode: ResultMode = serde_json::from_value(json!("HIDE")).unwrap();
        assert_eq!(mode, ResultMode::Hide);
    }

    #[test]
    fn each_mode_builds_matching_behavior() {
        for mode in ResultMode::ALL {
            let behavior = mode.behavior();
            assert_eq!(behavior.mode(), mode);
            assert!(!behavior.is_applied());
        }
    }

    #[test]
    fn store_from_payload_finds_items() {
        let store = ItemStore::from_payload(&json!({
            "tasks": [{"uid": "t1"}, {"id": 2}, {"name": "no id"}]
        }));
        assert_eq!(store.visible_uids(), vec!["t1", "2"]);
        assert_eq!(store.get("t1").unwrap().data, json!({"uid": "t1"}));
    }

    #[test]
    fn payload_uids_accepts_bare_arrays() {
        assert_eq!(payload_uids(&json!([{"uid": "x"}, {"uid": ""}, 3])), vec!["x"]);
        assert!(payload_uids(&json!("nope")).is_empty());
    }

    #[test]
    fn journal_restores_items_sharing_a_uid() {
        let mut hidden = GanttItem::new("x");
        hidden.visible = false;
        let store = ItemStore::new(vec![hidden, GanttItem::new("x"), GanttItem::new("y")]);
        let before = store.snapshot();

        let mut journal = Journal::default();
        journal.apply(&store, &["y".to_string()], |item, matched| {
            item.visible = matched;
        });
        assert_eq!(store.visible_uids(), vec!["y"]);
        journal.undo();

        assert_eq!(store.snapshot(), before);
        let flags: Vec<bool> = store.snapshot().iter().map(|item| item.visible).collect();
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn journal_restores_prior_flags() {
        let store = sample_store();
        let mut journal = Journal::default();
        journal.apply(&store, &["a".to_string()], |item, matched| {
            item.visible = matched;
            item.highlighted = !matched;
        });
        assert_eq!(store.visible_uids(), vec!["a"]);
        journal.undo();
        journal.undo();
        assert_eq!(store.visible_uids().len(), 4);
        assert!(store.highlighted_uids().is_empty());
        assert!(!journal.is_applied());
    }
}
