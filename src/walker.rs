//! Directory traversal.
//!
//! Uses the `ignore` crate's walker with its standard filters switched off:
//! only the rules in [`PathFilter`] decide what is skipped. Excluded
//! directories are pruned, not descended into.

use std::fs::FileType;
use std::io::Read;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use ignore::WalkBuilder;
use thiserror::Error;

use crate::filter::{extension_key, relative_path, PathFilter};

/// Errors that can occur while resolving the project root.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file that passed every filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the project root, `/`-separated.
    pub relative: String,
    /// Size in bytes at walk time.
    pub size: u64,
    /// Statistics key, see [`extension_key`].
    pub extension: CompactString,
}

/// What a directory entry is, as far as the report is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    /// A regular file, or a symlink resolving to one. Carries the size of
    /// the target.
    File { size: u64 },
}

/// Classify an entry without following directory symlinks.
///
/// Symlinks to files are resolved and treated as the file they point to.
/// Symlinks to directories, dangling links and special files yield `None`.
/// The tree and the file walk both go through here so they list the same
/// things.
pub fn classify_entry(path: &Path, file_type: FileType) -> Option<EntryKind> {
    if file_type.is_dir() {
        return Some(EntryKind::Dir);
    }
    if !file_type.is_file() && !file_type.is_symlink() {
        return None;
    }
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Some(EntryKind::File { size: meta.len() }),
        Ok(_) => None,
        Err(err) => {
            log::warn!("skipping {}: {}", path.display(), err);
            None
        }
    }
}

/// Check that `root` is an existing directory and return its canonical form.
pub fn resolve_root(root: &Path) -> Result<PathBuf, WalkError> {
    let metadata = std::fs::metadata(root).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WalkError::NotFound {
                path: root.to_path_buf(),
            }
        } else {
            WalkError::Io {
                path: root.to_path_buf(),
                source: e,
            }
        }
    })?;

    if !metadata.is_dir() {
        return Err(WalkError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    root.canonicalize().map_err(|e| WalkError::Io {
        path: root.to_path_buf(),
        source: e,
    })
}

/// Walk `root` and return every accepted file, sorted by relative path.
///
/// Entries that cannot be read are logged and skipped.
pub fn walk_files(root: &Path, filter: &PathFilter) -> Vec<FileRecord> {
    let prune_root = root.to_path_buf();
    let prune_filter = filter.clone();

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if !is_dir {
                return true;
            }
            match relative_path(&prune_root, entry.path()) {
                Some(rel) => prune_filter.accepts_dir(&rel),
                None => true,
            }
        })
        .build();

    let mut files = Vec::new();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };

        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            continue;
        }

        let Some(rel) = relative_path(root, entry.path()) else {
            continue;
        };
        if !filter.accepts_file(&rel, entry.path()) {
            continue;
        }
        let Some(EntryKind::File { size }) = classify_entry(entry.path(), file_type) else {
            continue;
        };

        files.push(FileRecord {
            extension: extension_key(entry.path()),
            path: entry.into_path(),
            relative: rel,
            size,
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    log::debug!("walk of {} accepted {} files", root.display(), files.len());
    files
}

/// Count newline-delimited records in a file.
///
/// A trailing line without a newline still counts. Returns `None` when the
/// file cannot be read.
pub fn count_lines(path: &Path) -> Option<usize> {
    let mut file = std::fs::File::open(path).ok()?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).ok()?;
    Some(count_lines_in(&bytes))
}

/// [`count_lines`] over an in-memory buffer.
pub fn count_lines_in(bytes: &[u8]) -> usize {
    let newlines = bytecount::count(bytes, b'\n');
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}
