//! The filter controller for one Gantt root.
//!
//! [`GanttFilter`] owns the option map, the active result behavior and the
//! user's saved presets. It is the only writer of any of them.
//!
//! Behavior lifecycle: `NONE -> ACTIVE -> NONE -> ACTIVE ...`. The only way
//! into `ACTIVE` is [`GanttFilter::filter_items`], which cancels the previous
//! instance first; [`GanttFilter::reset_filters`] moves back to `NONE`.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::api::{GanttApi, UserPreset};
use crate::behavior::{
    BehaviorFactory, ItemStore, ResultBehavior, ResultMode, default_factory, payload_uids,
};
use crate::error::{FilterError, Result};
use crate::options::{FilterOption, default_options};
use crate::query::Query;

pub struct GanttFilter<A: GanttApi> {
    api: A,
    root_uid: String,
    options: BTreeMap<String, Box<dyn FilterOption>>,
    result: ResultMode,
    behavior: Option<Box<dyn ResultBehavior>>,
    make_behavior: BehaviorFactory,
    user_presets: Vec<UserPreset>,
    active_preset: Option<usize>,
    loading: bool,
}

impl<A: GanttApi> fmt::Debug for GanttFilter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GanttFilter")
            .field("root_uid", &self.root_uid)
            .field("options", &self.options)
            .field("result", &self.result)
            .field("behavior", &self.behavior)
            .field("user_presets", &self.user_presets)
            .field("active_preset", &self.active_preset)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl<A: GanttApi> GanttFilter<A> {
    /// Controller with the eight standard Gantt fields.
    pub fn new(api: A, root_uid: impl Into<String>) -> Self {
        Self::with_options(api, root_uid, default_options())
    }

    /// Controller with a custom field set. Later duplicates of a name win.
    pub fn with_options(
        api: A,
        root_uid: impl Into<String>,
        options: Vec<Box<dyn FilterOption>>,
    ) -> Self {
        let options = options
            .into_iter()
            .map(|option| (option.name().to_string(), option))
            .collect();
        Self {
            api,
            root_uid: root_uid.into(),
            options,
            result: ResultMode::default(),
            behavior: None,
            make_behavior: default_factory(),
            user_presets: Vec::new(),
            active_preset: None,
            loading: true,
        }
    }

    /// Replace how behaviors are instantiated.
    pub fn with_behavior_factory(mut self, factory: BehaviorFactory) -> Self {
        self.make_behavior = factory;
        self
    }

    pub fn with_result_mode(mut self, mode: ResultMode) -> Self {
        self.result = mode;
        self
    }

    /// Bootstrap: load presets and option values concurrently, then restore
    /// the selection from `query`.
    ///
    /// `loading` clears as soon as the option values are in and the selection
    /// is restored, whether or not the preset fetch has finished. A failed
    /// preset fetch is logged and leaves the preset list as it was; a failed
    /// option fetch is returned and leaves `loading` set.
    pub async fn initialize(&mut self, query: &Query) -> Result<()> {
        self.loading = true;
        info!(root_uid = %self.root_uid, "initializing gantt filter");

        let Self {
            api,
            root_uid,
            options,
            loading,
            ..
        } = self;
        let api: &A = api;
        let root_uid = root_uid.as_str();

        let restore_options = async {
            let snapshot = api.fetch_filters(root_uid).await?;
            for option in options.values_mut() {
                option.set_list(&snapshot);
            }
            for option in options.values_mut() {
                option.set_selected(query);
            }
            *loading = false;
            debug!(root_uid, "filter options restored");
            Ok::<(), FilterError>(())
        };
        let (presets, restored) = tokio::join!(api.fetch_user_filters(root_uid), restore_options);

        match presets {
            Ok(presets) => {
                debug!(count = presets.len(), "loaded user presets");
                self.user_presets = presets;
            }
            Err(err) => warn!(root_uid = %self.root_uid, "failed to load user presets: {err}"),
        }
        restored
    }

    /// Restore selections from a query-shaped source. Fields the source does
    /// not mention keep their current selection.
    pub fn apply_query(&mut self, source: &Query) {
        for option in self.options.values_mut() {
            option.set_selected(source);
        }
    }

    /// Replace the current selection with a saved preset.
    ///
    /// `None` is a no-op. Does not re-filter; call [`GanttFilter::filter_items`]
    /// or [`GanttFilter::refresh`] afterwards to apply it.
    pub fn choose_user_preset(&mut self, index: Option<usize>) -> Result<()> {
        let Some(index) = index else {
            return Ok(());
        };
        let params = self
            .user_presets
            .get(index)
            .map(|preset| preset.params.clone())
            .ok_or_else(|| FilterError::PresetOutOfRange {
                index,
                len: self.user_presets.len(),
            })?;

        self.reset_filter_options();
        self.apply_query(&params);
        self.active_preset = Some(index);
        debug!(index, "applied user preset");
        Ok(())
    }

    /// Cancel the active behavior, if any. Selections are kept.
    pub fn reset_filters(&mut self) {
        if let Some(mut behavior) = self.behavior.take() {
            debug!(mode = %behavior.mode(), "cancelling active result behavior");
            behavior.cancel_filtration();
        }
    }

    /// Clear every selection. The active behavior is left alone.
    pub fn reset_filter_options(&mut self) {
        for option in self.options.values_mut() {
            option.reset_value();
        }
    }

    /// Save the current selection as a new preset and persist the list.
    ///
    /// The local list keeps the new preset even if persisting fails.
    pub async fn save_user_preset(&mut self, name: impl Into<String>) -> Result<usize> {
        let preset = UserPreset::new(name, self.params());
        info!(name = %preset.name, "saving user preset");
        self.user_presets.push(preset);
        let index = self.user_presets.len() - 1;
        self.active_preset = Some(index);

        self.persist_presets().await?;
        Ok(index)
    }

    /// Remove the preset at `index` and persist the list.
    ///
    /// The local removal stands even if persisting fails.
    pub async fn remove_user_preset(&mut self, index: usize) -> Result<UserPreset> {
        if index >= self.user_presets.len() {
            return Err(FilterError::PresetOutOfRange {
                index,
                len: self.user_presets.len(),
            });
        }
        self.active_preset = None;
        let removed = self.user_presets.remove(index);
        info!(name = %removed.name, index, "removing user preset");

        self.persist_presets().await?;
        Ok(removed)
    }

    async fn persist_presets(&self) -> Result<()> {
        if let Err(err) = self
            .api
            .update_user_filters(&self.root_uid, &self.user_presets)
            .await
        {
            warn!(
                root_uid = %self.root_uid,
                "failed to persist user presets, local list kept: {err}"
            );
            return Err(err.into());
        }
        Ok(())
    }

    /// Replace the preset list with the remote one.
    pub async fn fetch_user_presets(&mut self) -> Result<&[UserPreset]> {
        let presets = self.api.fetch_user_filters(&self.root_uid).await?;
        debug!(count = presets.len(), "fetched user presets");
        self.user_presets = presets;
        Ok(self.user_presets.as_slice())
    }

    /// Raw dataset for this root filtered by `params`.
    pub async fn fetch_filtered_data(&self, params: &Query) -> Result<Value> {
        Ok(self.api.fetch_data(&self.root_uid, params).await?)
    }

    /// Apply the current result mode: cancel the previous behavior, build a
    /// fresh one and run it.
    pub fn filter_items(&mut self, all_items: &ItemStore, filtered: &[String]) {
        self.reset_filters();
        let mut behavior = (self.make_behavior)(self.result);
        debug!(
            mode = %self.result,
            total = all_items.len(),
            matching = filtered.len(),
            "applying result behavior"
        );
        behavior.filter(all_items, filtered);
        self.behavior = Some(behavior);
    }

    /// Fetch the data matching the current selection and apply the result
    /// mode to `all_items`. Returns the matching uids.
    pub async fn refresh(&mut self, all_items: &ItemStore) -> Result<Vec<String>> {
        let params = self.params();
        let payload = self.fetch_filtered_data(&params).await?;
        let matching = payload_uids(&payload);
        self.filter_items(all_items, &matching);
        Ok(matching)
    }

    /// Query-shaped snapshot of every non-empty selection.
    pub fn params(&self) -> Query {
        self.options
            .values()
            .filter_map(|option| {
                option
                    .selected_for_query()
                    .map(|value| (option.name().to_string(), value))
            })
            .collect()
    }

    pub fn root_uid(&self) -> &str {
        &self.root_uid
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result_mode(&self) -> ResultMode {
        self.result
    }

    /// Takes effect on the next [`GanttFilter::filter_items`].
    pub fn set_result_mode(&mut self, mode: ResultMode) {
        self.result = mode;
    }

    /// Mode of the active behavior, or `None` when nothing is applied.
    pub fn active_mode(&self) -> Option<ResultMode> {
        self.behavior.as_ref().map(|behavior| behavior.mode())
    }

    pub fn user_presets(&self) -> &[UserPreset] {
        &self.user_presets
    }

    pub fn active_preset(&self) -> Option<usize> {
        self.active_preset
    }

    pub fn option(&self, name: &str) -> Option<&dyn FilterOption> {
        self.options.get(name).map(|option| option.as_ref())
    }

    pub fn options(&self) -> impl Iterator<Item = &dyn FilterOption> {
        self.options.values().map(|option| option.as_ref())
    }
}
