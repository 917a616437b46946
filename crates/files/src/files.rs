//! Staging file service implementation
//!
//! This module provides the core implementation of the staging system through
//! the [`FilesService`] type. It manages two directory trees: the *output*
//! tree where producers stage files, and the *trigger* tree where a marker is
//! written for each completed file.
//!
//! # Storage Layout
//!
//! Stored files live at `output_dir/<path>/<name>.<yyyymmdd>.<token>` where
//! `<path>` is the caller-supplied directory hierarchy, the date stamp groups
//! files allocated on the same day, and `<token>` is chosen by the
//! filesystem's exclusive-create primitive. The trigger counterpart of a
//! stored file is the same relative path remapped under the trigger root.
//!
//! # Consistency Model
//!
//! No state is cached between calls: enumeration and deletion re-read the
//! tree from disk every time, so there is no stale-index problem and no
//! isolation either. A listing may observe a file that is still being
//! written, and deletion may race with allocation. The only serialization
//! point in the whole module is the OS-level atomic file create used by
//! [`FilesService::create_file`].

use crate::constants::DATE_STAMP_FORMAT;
use crate::{FilesConfig, FilesError, FilesResult};
use chrono::{DateTime, Local, Utc};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read-only projection of a stored file.
///
/// Recomputed from disk on every enumeration, never persisted. Carries
/// enough data to reconstruct both the stored-file path and its mirrored
/// trigger path, plus the metadata the sort order is built from.
///
/// The ordering used by [`FilesService::list_files`] is defined on this type:
/// last-modified timestamp first, then relative path. On an unchanged tree
/// this is total, deterministic, and reproducible across calls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FileInfo {
    /// Path of the stored file relative to the output root
    relative_path: PathBuf,

    /// Absolute path of the stored file
    stored_path: PathBuf,

    /// Path of the corresponding marker under the trigger root
    trigger_path: PathBuf,

    /// Last-modified timestamp of the stored file (UTC)
    modified: DateTime<Utc>,

    /// Size of the stored file in bytes
    size_bytes: u64,
}

impl FileInfo {
    /// Path of the stored file relative to the output root.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Absolute path of the stored file.
    pub fn stored_path(&self) -> &Path {
        &self.stored_path
    }

    /// Path of the corresponding marker under the trigger root.
    ///
    /// The marker may or may not exist; this is the location
    /// [`FilesService::create_trigger`] writes to for this file.
    pub fn trigger_path(&self) -> &Path {
        &self.trigger_path
    }

    /// Last-modified timestamp of the stored file.
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Size of the stored file in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

impl Ord for FileInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.modified
            .cmp(&other.modified)
            .then_with(|| self.relative_path.cmp(&other.relative_path))
    }
}

impl PartialOrd for FileInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Service managing the staging output tree and its mirrored trigger tree.
///
/// # Design
///
/// - Synchronous and blocking: every method is a plain filesystem call on the
///   caller's thread; no background work, timers, or internal locking.
/// - Stateless between calls: the instance holds only the two root paths.
/// - Concurrency-safe allocation: unique names come from the filesystem's
///   exclusive-create primitive, which holds across process boundaries.
#[derive(Debug)]
pub struct FilesService {
    /// Canonicalized root of the output tree
    output_dir: PathBuf,

    /// Root of the trigger tree, created lazily on first marker write
    trigger_dir: PathBuf,
}

impl FilesService {
    /// Creates the service, establishing the output root.
    ///
    /// The output directory and any missing ancestors are created if absent,
    /// then canonicalized so that every handle returned by
    /// [`Self::create_file`] is an absolute path. The trigger directory is
    /// left untouched until the first [`Self::create_trigger`] call.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - The output directory cannot be created (`DirectoryCreation`)
    /// - The output path exists but is not a directory (`NotADirectory`)
    /// - Canonicalisation fails (`Io`)
    pub fn new(config: FilesConfig) -> FilesResult<Self> {
        let output_dir = config.output_dir();

        fs::create_dir_all(output_dir).map_err(|source| FilesError::DirectoryCreation {
            path: output_dir.to_path_buf(),
            source,
        })?;

        if !output_dir.is_dir() {
            return Err(FilesError::NotADirectory {
                path: output_dir.to_path_buf(),
            });
        }

        let output_dir = output_dir.canonicalize()?;

        Ok(Self {
            output_dir,
            trigger_dir: config.trigger_dir().to_path_buf(),
        })
    }

    /// Allocates a fresh, empty, uniquely named file under the output root.
    ///
    /// `path` names a directory hierarchy below the output root and may
    /// contain separators; `name` must be a bare file name. The allocated
    /// file is named `<name>.<yyyymmdd>.<token>`, so files staged on the same
    /// day share a common infix, and the trailing token comes from an atomic
    /// exclusive create: two concurrent calls with identical arguments always
    /// yield two distinct paths, even from separate processes.
    ///
    /// The returned file exists and is empty. Writing its contents (and
    /// eventually triggering it) is the caller's responsibility; this crate
    /// never touches the file again.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `name` contains `/` or `\` (`InvalidName`; nothing is written to
    ///   disk in this case)
    /// - The target directory cannot be created or is not a directory after
    ///   the attempt (`DirectoryCreation` / `NotADirectory`)
    /// - The exclusive create itself fails (`Io`)
    pub fn create_file(&self, path: &str, name: &str) -> FilesResult<PathBuf> {
        if name.contains('/') || name.contains('\\') {
            return Err(FilesError::InvalidName(name.to_string()));
        }

        let directory = self.output_dir.join(path);
        fs::create_dir_all(&directory).map_err(|source| FilesError::DirectoryCreation {
            path: directory.clone(),
            source,
        })?;
        if !directory.is_dir() {
            return Err(FilesError::NotADirectory { path: directory });
        }

        let prefix = format!("{name}.{}.", Local::now().format(DATE_STAMP_FORMAT));
        let (file, stored_path) = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(&directory)?
            .keep()
            .map_err(|persist| FilesError::Io(persist.error))?;
        drop(file);

        Ok(stored_path)
    }

    /// Writes the trigger marker for a stored file, returning the marker path.
    ///
    /// The marker is created at the stored file's path relative to the output
    /// root, remapped under the trigger root, with missing ancestor
    /// directories created on the way. Its entire content is the stored
    /// file's absolute path. Calling this twice for the same stored file
    /// rewrites the same marker (last write wins).
    ///
    /// The marker write is a plain text write, not an atomic rename, and no
    /// ordering with the producer's own writes is enforced here: callers must
    /// finish writing the stored file before triggering it.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `stored` is not a strict descendant of the output root
    ///   (`PathOutsideRoot`; a programming error in the caller, failed fast)
    /// - The marker's ancestor directories cannot be created
    ///   (`DirectoryCreation`)
    /// - The marker write fails (`Io`)
    pub fn create_trigger(&self, stored: &Path) -> FilesResult<PathBuf> {
        let relative = self.relative_to_output(stored)?;

        let trigger_path = self.trigger_dir.join(relative);
        if let Some(parent) = trigger_path.parent() {
            fs::create_dir_all(parent).map_err(|source| FilesError::DirectoryCreation {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = stored.to_string_lossy();
        fs::write(&trigger_path, content.as_bytes())?;

        Ok(trigger_path)
    }

    /// Lists stored files in a stable order, returning one page.
    ///
    /// The output tree is walked recursively and filtered to regular files;
    /// directories and symlinks are excluded. The filtered set is sorted by
    /// the [`FileInfo`] ordering (modified timestamp, then relative path) and
    /// the window `[start, start + page_size)` is returned, clamped to the
    /// available count.
    ///
    /// A `start` at or past the end yields an empty page, as does
    /// `page_size == 0`. Both parameters are unsigned, so a negative offset
    /// cannot be expressed.
    ///
    /// # Errors
    ///
    /// Propagates traversal failures (for example an unreadable
    /// subdirectory) as `Traversal` and metadata failures as `Io`.
    pub fn list_files(&self, start: usize, page_size: usize) -> FilesResult<Vec<FileInfo>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.output_dir) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            files.push(self.file_info(entry.path(), &entry.metadata()?)?);
        }

        files.sort();
        Ok(files.into_iter().skip(start).take(page_size).collect())
    }

    /// Deletes every stored file under the output root, best effort.
    ///
    /// Returns the number of regular files *discovered* during traversal,
    /// which can exceed the number actually deleted: per-file removal
    /// failures (permissions, concurrent removal) are logged and swallowed,
    /// never raised. Directories are left in place.
    ///
    /// Trigger markers are not touched, so markers for deleted files may
    /// remain in the trigger tree; resolving that asymmetry is the consumer's
    /// concern.
    ///
    /// # Errors
    ///
    /// Fails only if the output root itself cannot be traversed; failures
    /// below the root are logged and skipped.
    pub fn delete_all(&self) -> FilesResult<usize> {
        let mut discovered = 0;
        for entry in WalkDir::new(&self.output_dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    tracing::warn!("skipping unreadable entry during bulk delete: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            discovered += 1;
            if let Err(err) = fs::remove_file(entry.path()) {
                tracing::warn!(
                    "failed to delete staged file {}: {}",
                    entry.path().display(),
                    err
                );
            }
        }

        Ok(discovered)
    }

    /// Directory tree holding producer-created files.
    pub fn upload_directory(&self) -> &Path {
        &self.output_dir
    }

    /// Mirrored directory tree holding trigger markers.
    pub fn trigger_directory(&self) -> &Path {
        &self.trigger_dir
    }

    /// Derives a stored file's path relative to the output root.
    ///
    /// The input must be a strict descendant: the output root itself has no
    /// mirrored marker, so an empty relative path is rejected along with
    /// paths outside the root.
    fn relative_to_output<'a>(&self, stored: &'a Path) -> FilesResult<&'a Path> {
        let relative = stored
            .strip_prefix(&self.output_dir)
            .map_err(|_| FilesError::PathOutsideRoot {
                path: stored.to_path_buf(),
                root: self.output_dir.clone(),
            })?;

        if relative.as_os_str().is_empty() {
            return Err(FilesError::PathOutsideRoot {
                path: stored.to_path_buf(),
                root: self.output_dir.clone(),
            });
        }

        Ok(relative)
    }

    fn file_info(&self, stored: &Path, metadata: &fs::Metadata) -> FilesResult<FileInfo> {
        let relative = self.relative_to_output(stored)?;

        Ok(FileInfo {
            relative_path: relative.to_path_buf(),
            stored_path: stored.to_path_buf(),
            trigger_path: self.trigger_dir.join(relative),
            modified: DateTime::<Utc>::from(metadata.modified()?),
            size_bytes: metadata.len(),
        })
    }
}
