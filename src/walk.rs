//! Candidate-file enumeration
//!
//! Walks the root directory (optionally into subdirectories) and applies
//! include/exclude glob patterns to paths relative to the root. Excludes
//! are consulted first, both when deciding whether to descend into a
//! directory and when deciding whether a file makes the cut; a file
//! matching an include and an exclude is excluded. The sync tool's own
//! metadata directory is pruned unconditionally.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use crate::config::{RESERVED_DIR, RecursionMode};
use crate::error::{AxsyncError, ErrorCategory, ErrorKind, Result};

/// Compiled include/exclude predicates.
#[derive(Debug)]
pub struct PathFilter {
    includes: GlobSet,
    excludes: GlobSet,
}

impl PathFilter {
    /// Compiles pattern lists into matchers. An empty include list selects
    /// everything; an empty exclude list excludes nothing.
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        let includes = if includes.is_empty() {
            build_globset(&["*".to_string()])?
        } else {
            build_globset(includes)?
        };
        Ok(Self {
            includes,
            excludes: build_globset(excludes)?,
        })
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.excludes.is_match(relative)
    }

    fn is_included(&self, relative: &Path) -> bool {
        self.includes.is_match(relative)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            AxsyncError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::PatternInvalid,
                format!("invalid glob pattern {pattern:?}"),
                e,
            )
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| {
        AxsyncError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::PatternInvalid,
            "failed to compile glob patterns",
            e,
        )
    })
}

/// Enumerates the files a run will operate on. Directories are pruned
/// before descent (reserved name first, then excludes); files are kept if
/// no exclude matches and at least one include does.
pub fn collect_files(
    root: &Path,
    mode: RecursionMode,
    filter: &PathFilter,
) -> Result<Vec<PathBuf>> {
    let max_depth = match mode {
        RecursionMode::ThisDirectoryOnly => 1,
        RecursionMode::IncludeSubdirectories => usize::MAX,
    };

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter();
    for entry in walker.filter_entry(|e| should_descend(root, e, filter)) {
        let entry = entry.map_err(|e| {
            AxsyncError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::WalkFailed,
                format!("failed to enumerate under {}", root.display()),
                e,
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if filter.is_excluded(relative) {
            continue;
        }
        if filter.is_included(relative) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

fn should_descend(root: &Path, entry: &DirEntry, filter: &PathFilter) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    if entry.file_name() == OsStr::new(RESERVED_DIR) {
        return false;
    }
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    !filter.is_excluded(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_tree(temp_dir: &TempDir) -> PathBuf {
        let root = temp_dir.path().to_path_buf();
        fs::write(root.join("notes.txt"), b"n").unwrap();
        fs::write(root.join("data.bin"), b"d").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/inner.txt"), b"i").unwrap();
        fs::create_dir(root.join(RESERVED_DIR)).unwrap();
        fs::write(root.join(RESERVED_DIR).join("state.txt"), b"s").unwrap();
        root
    }

    fn relative_sorted(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        let mut names: Vec<String> = files
            .into_iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    fn strings(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_patterns_select_everything_outside_reserved() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(&temp_dir);
        let filter = PathFilter::new(&[], &[]).unwrap();
        let files =
            collect_files(&root, RecursionMode::IncludeSubdirectories, &filter).unwrap();
        assert_eq!(
            relative_sorted(&root, files),
            vec!["data.bin", "notes.txt", "sub/inner.txt"]
        );
    }

    #[test]
    fn test_include_pattern_filters_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(&temp_dir);
        let filter = PathFilter::new(&strings(&["*.txt"]), &[]).unwrap();
        let files =
            collect_files(&root, RecursionMode::IncludeSubdirectories, &filter).unwrap();
        assert_eq!(
            relative_sorted(&root, files),
            vec!["notes.txt", "sub/inner.txt"]
        );
    }

    #[test]
    fn test_exclude_takes_precedence_over_include() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(&temp_dir);
        let filter = PathFilter::new(&strings(&["*"]), &strings(&["*.txt"])).unwrap();
        let files =
            collect_files(&root, RecursionMode::IncludeSubdirectories, &filter).unwrap();
        assert_eq!(relative_sorted(&root, files), vec!["data.bin"]);
    }

    #[test]
    fn test_excluded_directory_is_not_descended() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(&temp_dir);
        let filter = PathFilter::new(&strings(&["*.txt"]), &strings(&["sub"])).unwrap();
        let files =
            collect_files(&root, RecursionMode::IncludeSubdirectories, &filter).unwrap();
        assert_eq!(relative_sorted(&root, files), vec!["notes.txt"]);
    }

    #[test]
    fn test_this_directory_only_skips_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(&temp_dir);
        let filter = PathFilter::new(&strings(&["*.txt"]), &[]).unwrap();
        let files = collect_files(&root, RecursionMode::ThisDirectoryOnly, &filter).unwrap();
        assert_eq!(relative_sorted(&root, files), vec!["notes.txt"]);
    }

    #[test]
    fn test_reserved_directory_always_pruned() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(&temp_dir);
        // Even an include pattern naming the reserved directory does not
        // reach into it.
        let reserved_glob = format!("{RESERVED_DIR}/*");
        let filter = PathFilter::new(&strings(&["*", reserved_glob.as_str()]), &[]).unwrap();
        let files =
            collect_files(&root, RecursionMode::IncludeSubdirectories, &filter).unwrap();
        let names = relative_sorted(&root, files);
        assert!(names.iter().all(|n| !n.starts_with(RESERVED_DIR)));
    }

    #[test]
    fn test_invalid_pattern_is_user_error() {
        let err = PathFilter::new(&strings(&["a[unclosed"]), &[]).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::PatternInvalid));
        assert_eq!(err.category, ErrorCategory::User);
    }
}
