//! Load run and trigger configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::archive::DEFAULT_INNER_SUFFIX;

/// Archive location and sweep limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Path to the zip container (`rdf-files.tar.zip`)
    pub archive_path: PathBuf,
    /// Suffix of the inner archive inside the container
    pub inner_suffix: String,
    /// Stop after this many documents (None = whole corpus)
    pub max_documents: Option<usize>,
    /// Suppress the progress spinner
    pub quiet: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("Resources/rdf-files.tar.zip"),
            inner_suffix: DEFAULT_INNER_SUFFIX.to_string(),
            max_documents: None,
            quiet: false,
        }
    }
}

/// Whether the marker file gates the load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerPolicy {
    /// First start only creates the marker; the load runs on the next start
    TwoPhase,
    /// Load on every invocation
    Always,
}

/// One-shot trigger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Location of the zero-byte marker file
    pub marker_path: PathBuf,
    pub policy: TriggerPolicy,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            marker_path: PathBuf::from(".gutenberg-graph/loaded.marker"),
            policy: TriggerPolicy::TwoPhase,
        }
    }
}
