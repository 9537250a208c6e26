//! Library configuration

use serde::Deserialize;

use crate::QueryError;

/// What selection construction does with a failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Return the error
    #[default]
    Strict,
    /// Log it and produce no selection
    Lenient,
}

impl Mode {
    /// Apply the mode to a construction failure
    pub(crate) fn settle<T>(self, err: QueryError) -> Result<Option<T>, QueryError> {
        match self {
            Mode::Strict => Err(err),
            Mode::Lenient => {
                tracing::warn!("Selection failed: {}", err);
                Ok(None)
            }
        }
    }
}

/// Query configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub mode: Mode,
}

impl QueryConfig {
    pub fn strict() -> Self {
        Self { mode: Mode::Strict }
    }

    pub fn lenient() -> Self {
        Self { mode: Mode::Lenient }
    }

    /// Load from JSON such as `{"mode": "lenient"}`. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
