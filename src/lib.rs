//! Client-side filter controller for Gantt views.
//!
//! A [`GanttFilter`] owns the filterable fields of one chart root, keeps
//! their selection in sync with a flat [`Query`], persists named presets
//! through a [`GanttApi`] and applies a [`ResultMode`] (show, hide or
//! highlight) to an [`ItemStore`].

pub mod api;
pub mod behavior;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod options;
pub mod query;

pub use api::{ApiError, GanttApi, HttpGanttApi, UserPreset};
pub use behavior::{GanttItem, ItemStore, ResultBehavior, ResultMode};
pub use cli::{Cli, Commands, parse_cli, run_with_parsed};
pub use config::FilterConfig;
pub use controller::GanttFilter;
pub use error::{FilterError, Result};
pub use options::{FilterOption, ListOption, OptionsSnapshot, StringOption};
pub use query::{FilterId, Query};
