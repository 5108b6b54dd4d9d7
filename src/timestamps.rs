//! Timestamp snapshot and restore
//!
//! The external encrypter rewrites every file it touches, so access and
//! modification times are lost in the transform. They are captured here
//! before any file is handed to the encrypter and reapplied afterwards at
//! the transcoded paths.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::error::{AxsyncError, ErrorCategory, ErrorKind, Result};

/// Access/modification pair at full platform precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub accessed: FileTime,
    pub modified: FileTime,
}

/// Per-run mapping of file path to its pre-transform timestamps. Built
/// fresh each run, rekeyed by the transcoder, consumed by [`restore`],
/// never persisted. Iteration order is unspecified.
pub type FileTimestampMap = HashMap<PathBuf, Timestamps>;

/// Reads one file's timestamps from its metadata.
pub fn stat_times(path: &Path) -> Result<Timestamps> {
    let metadata = fs::metadata(path).map_err(|e| metadata_error(path, e))?;
    Ok(Timestamps {
        accessed: FileTime::from_last_access_time(&metadata),
        modified: FileTime::from_last_modification_time(&metadata),
    })
}

/// Snapshots timestamps for every candidate file. A file that vanished
/// between enumeration and here fails the whole run; there is no retry.
pub fn snapshot(files: &[PathBuf]) -> Result<FileTimestampMap> {
    let mut map = FileTimestampMap::with_capacity(files.len());
    for path in files {
        map.insert(path.clone(), stat_times(path)?);
    }
    Ok(map)
}

/// Reapplies recorded timestamps at the (already transcoded) paths. A
/// missing target means the encrypter did not produce the expected name;
/// that propagates without retry or rollback.
pub fn restore(map: &FileTimestampMap) -> Result<()> {
    for (path, stamps) in map {
        filetime::set_file_times(path, stamps.accessed, stamps.modified).map_err(|e| {
            let kind = if e.kind() == io::ErrorKind::NotFound {
                ErrorKind::RestoreTargetMissing
            } else {
                ErrorKind::Io
            };
            AxsyncError::with_kind_and_source(
                ErrorCategory::Internal,
                kind,
                format!("failed to restore timestamps on {}", path.display()),
                e,
            )
        })?;
        log::debug!("restored timestamps on {}", path.display());
    }
    Ok(())
}

fn metadata_error(path: &Path, err: io::Error) -> AxsyncError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    AxsyncError::with_kind_and_source(
        category,
        ErrorKind::MetadataUnavailable,
        format!("failed to read metadata of {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_then_restore_at_renamed_path() {
        let temp_dir = TempDir::new().unwrap();
        let before = temp_dir.path().join("notes.txt");
        let after = temp_dir.path().join(".axxnotes-txt");
        fs::write(&before, b"contents").unwrap();

        let accessed = FileTime::from_unix_time(1_500_000_000, 0);
        let modified = FileTime::from_unix_time(1_400_000_000, 0);
        filetime::set_file_times(&before, accessed, modified).unwrap();

        let map = snapshot(std::slice::from_ref(&before)).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&before].modified, modified);

        // Simulate the external transform's rename, then restore under the
        // new key.
        fs::rename(&before, &after).unwrap();
        let mut renamed = FileTimestampMap::new();
        renamed.insert(after.clone(), map[&before]);
        restore(&renamed).unwrap();

        let stamps = stat_times(&after).unwrap();
        assert_eq!(stamps.accessed, accessed);
        assert_eq!(stamps.modified, modified);
    }

    #[test]
    fn test_snapshot_missing_file_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let gone = temp_dir.path().join("vanished.txt");
        let err = snapshot(&[gone]).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::MetadataUnavailable));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_restore_missing_target_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let mut map = FileTimestampMap::new();
        map.insert(
            temp_dir.path().join(".axxnever-created"),
            Timestamps {
                accessed: FileTime::from_unix_time(0, 0),
                modified: FileTime::from_unix_time(0, 0),
            },
        );
        let err = restore(&map).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::RestoreTargetMissing));
    }
}
