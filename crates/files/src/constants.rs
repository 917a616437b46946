//! Constants used throughout the staging crate.
//!
//! Path constants live here so the conventional layout is defined in one
//! place.

/// Default output subdirectory, relative to the platform temp directory.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "batch/files";

/// Default trigger subdirectory, relative to the platform temp directory.
pub const DEFAULT_TRIGGER_SUBDIR: &str = "batch/triggers";

/// `strftime` format of the calendar-date stamp embedded in allocated file names.
pub(crate) const DATE_STAMP_FORMAT: &str = "%Y%m%d";
