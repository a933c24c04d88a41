//! Error type for the filter controller.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum FilterError {
    /// Fetch or persist against the remote API failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("preset index {index} is out of range ({len} presets saved)")]
    PresetOutOfRange { index: usize, len: usize },

    #[error("unknown result mode '{0}' (expected SHOW, HIDE or HIGHLIGHT)")]
    UnknownResultMode(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FilterError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_retryable(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        let err = FilterError::PresetOutOfRange { index: 3, len: 1 };
        assert_eq!(
            err.to_string(),
            "preset index 3 is out of range (1 presets saved)"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn api_errors_keep_their_classification() {
        let err: FilterError = ApiError::Status {
            status: 502,
            body: "bad gateway".into(),
        }
        .into();
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "api returned status 502: bad gateway");
    }
}
