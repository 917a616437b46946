//! Local file staging with trigger markers.
//!
//! This crate provides the staging side of a file-based batch pipeline.
//! Producers allocate uniquely named files under an *output root*; once a
//! file's contents are complete, a *trigger* marker is written under a second
//! root that mirrors the output tree's relative layout. A polling consumer
//! (for example a batch scheduler) watches the trigger tree and picks up the
//! stored file named by each marker.
//!
//! ## Design principles
//!
//! - The two roots are plain directory trees on a local, single-node
//!   filesystem; there is no in-memory index, so every operation re-reads the
//!   tree from disk.
//! - Stored files are never mutated by this crate after allocation; writing
//!   the contents is the producer's job.
//! - Uniqueness of allocated names is delegated to the filesystem's atomic
//!   exclusive-create primitive, never to an in-process lock, so concurrent
//!   producers in separate processes are safe.
//! - Trigger files mirror stored files by relative path; the mirrored layout
//!   itself is the contract consumers rely on.
//!
//! ## Directory layout
//!
//! ```text
//! <output_dir>/
//! └── reports/
//!     └── daily.csv.20260806.k3Qz1x      # stored file, producer-written
//! <trigger_dir>/
//! └── reports/
//!     └── daily.csv.20260806.k3Qz1x      # marker, content = absolute stored path
//! ```
//!
//! ## Example usage
//!
//! ```no_run
//! use stage_files::{FilesConfig, FilesService};
//! use std::fs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = FilesService::new(FilesConfig::default())?;
//!
//! let stored = service.create_file("reports", "daily.csv")?;
//! fs::write(&stored, "a,b,c")?;
//! let _trigger = service.create_trigger(&stored)?;
//! # Ok(())
//! # }
//! ```

mod config;
mod constants;
mod files;

pub use config::FilesConfig;
pub use constants::{DEFAULT_OUTPUT_SUBDIR, DEFAULT_TRIGGER_SUBDIR};
pub use files::{FileInfo, FilesService};

use std::path::PathBuf;

/// Errors that can occur during staging operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// File name contains a path separator; nesting goes through the path parameter
    #[error("invalid file name '{0}': must not contain path separators (use the path parameter to create directories)")]
    InvalidName(String),

    /// Target directory could not be created
    #[error("failed to create directory {path}: {source}", path = path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A path that must be a directory exists but is something else
    #[error("path {path} exists but is not a directory", path = path.display())]
    NotADirectory { path: PathBuf },

    /// Stored-file path is not a strict descendant of the output root
    #[error("path {path} is not under the output directory {root}", path = path.display(), root = root.display())]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Traversal of the output tree failed
    #[error("failed to traverse the output directory: {0}")]
    Traversal(#[from] walkdir::Error),
}

/// Result type for staging operations.
pub type FilesResult<T> = std::result::Result<T, FilesError>;
