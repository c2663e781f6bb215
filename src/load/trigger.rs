//! One-shot trigger gating the bulk load
//!
//! The launch tooling starts the loader twice: the first start only leaves
//! a zero-byte marker behind, the second (and every later) start performs
//! the load. Only the marker's existence matters; its content is never
//! read, and nothing here ever removes it.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Failed to create trigger marker {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Presence-only marker file
#[derive(Debug, Clone)]
pub struct OneShotTrigger {
    marker: PathBuf,
}

impl OneShotTrigger {
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker
    }

    /// Whether the marker is already in place
    pub fn is_armed(&self) -> bool {
        self.marker.exists()
    }

    /// Decide whether this invocation should load
    ///
    /// Returns `true` when the marker exists. Otherwise creates it and
    /// returns `false`: the caller must not load on this invocation.
    pub fn should_run(&self) -> Result<bool, TriggerError> {
        if self.is_armed() {
            debug!("Trigger marker present at {}", self.marker.display());
            return Ok(true);
        }

        if let Some(parent) = self.marker.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.create_error(source))?;
            }
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.marker)
        {
            Ok(_) => {
                info!(
                    "Created trigger marker {}; load deferred to the next run",
                    self.marker.display()
                );
                Ok(false)
            }
            // Another process created it between the check and the open
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(true),
            Err(source) => Err(self.create_error(source)),
        }
    }

    fn create_error(&self, source: std::io::Error) -> TriggerError {
        TriggerError::Create {
            path: self.marker.clone(),
            source,
        }
    }
}
