//! Staging service configuration.
//!
//! Configuration is resolved once at process startup and passed into
//! [`FilesService`](crate::FilesService); nothing in this crate reads
//! process-wide environment state during request handling. The [`Default`]
//! impl supplies the conventional platform-temp-dir layout, so even the
//! defaults are an explicit opt-in by the caller's initialization code rather
//! than something the service looks up behind its back.

use crate::constants::{DEFAULT_OUTPUT_SUBDIR, DEFAULT_TRIGGER_SUBDIR};
use std::env;
use std::path::{Path, PathBuf};

/// Locations of the two directory trees the staging service owns.
#[derive(Clone, Debug)]
pub struct FilesConfig {
    output_dir: PathBuf,
    trigger_dir: PathBuf,
}

impl FilesConfig {
    /// Create a configuration with explicit root directories.
    pub fn new(output_dir: impl Into<PathBuf>, trigger_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            trigger_dir: trigger_dir.into(),
        }
    }

    /// Directory tree holding producer-created files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Mirrored directory tree holding trigger markers.
    pub fn trigger_dir(&self) -> &Path {
        &self.trigger_dir
    }
}

impl Default for FilesConfig {
    /// The conventional layout: `<temp>/batch/files` and `<temp>/batch/triggers`.
    fn default() -> Self {
        let temp = env::temp_dir();
        Self {
            output_dir: temp.join(DEFAULT_OUTPUT_SUBDIR),
            trigger_dir: temp.join(DEFAULT_TRIGGER_SUBDIR),
        }
    }
}
