//! Error type shared by every fallible store, resolver and storage operation.
//! Every failure is local: a rejected call leaves the store exactly as it was.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DialError {
    #[error("Panel not found: {0}")]
    PanelNotFound(String),

    #[error("Preset not found: {preset} in panel {panel}")]
    PresetNotFound { panel: String, preset: String },

    /// The path is unknown to the panel's schema or names a control of the
    /// wrong kind for the operation
    #[error("Invalid path `{path}` in panel {panel}")]
    InvalidPath { panel: String, path: String },

    /// Bare number literals are schema constants, not controls
    #[error("Path `{path}` in panel {panel} is read-only")]
    ReadOnly { panel: String, path: String },

    #[error("Value for `{path}` must be {expected}")]
    TypeMismatch { path: String, expected: String },

    /// Numbers must be finite; spring fields finite and in range
    #[error("Invalid value for `{path}`: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yml::Error),
}

impl DialError {
    /// True for the `NotFound` class (unknown panel or preset)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DialError::PanelNotFound(_) | DialError::PresetNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DialError>;
