//! Schema definitions for demo configurations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::playback::step::{saturating_total, validate_definitions, StepDefinition};
use crate::playback::PlaybackError;

/// Errors raised while loading or looking up demos
#[derive(Error, Debug)]
pub enum DemoError {
    #[error("failed to read demo file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse demo file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("demo has an empty key")]
    MissingKey,

    #[error("demo '{key}' is not playable: {source}")]
    Invalid {
        key: String,
        #[source]
        source: PlaybackError,
    },

    #[error("unknown demo '{0}'")]
    Unknown(String),
}

/// Where a demo definition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DemoSource {
    /// Embedded in the binary
    #[default]
    Builtin,
    /// Loaded from the demos directory
    User,
}

/// A label/value pair shown on the results panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetric {
    pub label: String,
    pub value: String,
}

/// A complete demo: its steps plus the results revealed on completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoDefinition {
    /// Unique key used on the command line (e.g., "takeoff")
    pub key: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ordered steps; order is execution order
    pub steps: Vec<StepDefinition>,
    #[serde(default)]
    pub results: Vec<ResultMetric>,
    #[serde(skip)]
    pub source: DemoSource,
}

impl DemoDefinition {
    /// Parse a demo definition from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check that this demo can be played
    pub fn validate(&self) -> Result<(), DemoError> {
        if self.key.trim().is_empty() {
            return Err(DemoError::MissingKey);
        }
        validate_definitions(&self.steps).map_err(|source| DemoError::Invalid {
            key: self.key.clone(),
            source,
        })
    }

    /// Sum of nominal step durations
    pub fn nominal_total(&self) -> Duration {
        saturating_total(self.steps.iter().map(StepDefinition::nominal_duration))
    }
}
