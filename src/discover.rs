//! File discovery by filename prefix
//!
//! Each device drops its recordings into one session directory with a
//! device-specific prefix (wrist exports as `activity*`, erg exports as
//! `concept2*`). Thin glue around the core: paths in, tables out.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SyncError;

/// Non-recursive listing of files in `dir` whose names start with
/// `prefix`, sorted by file name for a deterministic load order.
pub fn discover(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, SyncError> {
    let entries = fs::read_dir(dir).map_err(|source| SyncError::FileAccess {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SyncError::FileAccess {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type().map_err(|source| SyncError::FileAccess {
            path: entry.path(),
            source,
        })?;
        if file_type.is_file() && entry.file_name().to_string_lossy().starts_with(prefix) {
            found.push(entry.path());
        }
    }
    found.sort();

    debug!(dir = %dir.display(), prefix, files = found.len(), "discovered recordings");
    Ok(found)
}
