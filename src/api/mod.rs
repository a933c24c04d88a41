//! Remote API collaborator.
//!
//! The controller talks to the backend exclusively through [`GanttApi`], so
//! tests can substitute an in-memory implementation. [`HttpGanttApi`] is the
//! reqwest-backed production client.

mod http;

pub use http::HttpGanttApi;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

use crate::options::OptionsSnapshot;
use crate::query::Query;

/// Errors produced by the remote API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid api url: {0}")]
    Url(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("api returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode api response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Transport failures and 5xx responses may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_timeout() || err.is_connect(),
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Url(_) | Self::Decode(_) => false,
        }
    }
}

/// A named snapshot of option selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreset {
    pub name: String,
    #[serde(default)]
    pub params: Query,
}

impl UserPreset {
    pub fn new(name: impl Into<String>, params: Query) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Wire shape of the preset list, both directions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFiltersPayload {
    #[serde(default)]
    pub user_filters: Vec<UserPreset>,
}

/// Backend operations scoped to a root identifier.
pub trait GanttApi: Send + Sync {
    /// Available option values, keyed by field name.
    fn fetch_filters(
        &self,
        root_uid: &str,
    ) -> impl Future<Output = Result<OptionsSnapshot, ApiError>> + Send;

    /// The current user's saved presets.
    fn fetch_user_filters(
        &self,
        root_uid: &str,
    ) -> impl Future<Output = Result<Vec<UserPreset>, ApiError>> + Send;

    /// Replace the saved preset list wholesale.
    fn update_user_filters(
        &self,
        root_uid: &str,
        presets: &[UserPreset],
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Dataset for the root, filtered by `params`. Returned raw.
    fn fetch_data(
        &self,
        root_uid: &str,
        params: &Query,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}
