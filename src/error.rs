//! Configuration errors
//!
//! The simulation itself never fails at runtime; everything that can go
//! wrong is caught while settings and kind tables are loaded.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown entity kind `{0}`")]
    UnknownKind(String),

    #[error("entity kind `{0}` is defined more than once")]
    DuplicateKind(String),

    #[error("entity kind `{kind}` is used as {role} but has behavior {actual}")]
    WrongBehavior {
        kind: String,
        role: &'static str,
        actual: &'static str,
    },

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
