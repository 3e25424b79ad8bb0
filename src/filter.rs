//! Path filtering.
//!
//! Three independent rules decide what reaches the report:
//!
//! - excluded directories, matched segment-exactly against the start of the
//!   path relative to the project root;
//! - excluded file patterns, where `*` and `?` are the only wildcards and the
//!   pattern must match the whole relative path;
//! - the inclusion list, which admits a file by extension or by exact name.

use std::path::Path;

use compact_str::CompactString;
use glob::{MatchOptions, Pattern};

use crate::config::ScanConfig;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compiled filter rules for one run.
#[derive(Debug, Clone)]
pub struct PathFilter {
    excluded_dirs: Vec<String>,
    excluded_files: Vec<Pattern>,
    included: Vec<String>,
}

impl PathFilter {
    /// Compile the rules held by `config`.
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            excluded_dirs: config.excluded_dirs.clone(),
            excluded_files: config
                .excluded_files
                .iter()
                .filter_map(|p| compile_pattern(p))
                .collect(),
            included: config.included_extensions.clone(),
        }
    }

    /// `rel` equals an excluded directory or lives beneath one.
    pub fn is_excluded_dir(&self, rel: &str) -> bool {
        self.excluded_dirs
            .iter()
            .any(|dir| is_same_or_descendant(rel, dir))
    }

    /// `rel` fully matches one of the excluded file patterns.
    pub fn is_excluded_file(&self, rel: &str) -> bool {
        self.excluded_files
            .iter()
            .any(|pattern| pattern.matches_with(rel, MATCH_OPTIONS))
    }

    /// Either exclusion rule applies.
    pub fn is_excluded(&self, rel: &str) -> bool {
        self.is_excluded_dir(rel) || self.is_excluded_file(rel)
    }

    /// The file's extension or exact name is on the inclusion list.
    pub fn is_included(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str());
        let ext = path.extension().and_then(|e| e.to_str());

        self.included.iter().any(|entry| {
            ext.is_some_and(|e| e.eq_ignore_ascii_case(entry)) || name == Some(entry.as_str())
        })
    }

    /// A directory at `rel` should be descended into and shown.
    pub fn accepts_dir(&self, rel: &str) -> bool {
        !self.is_excluded(rel)
    }

    /// A file at `rel` (absolute `path`) belongs in the report.
    pub fn accepts_file(&self, rel: &str, path: &Path) -> bool {
        !self.is_excluded(rel) && self.is_included(path)
    }
}

/// Compile a `*`/`?` pattern.
///
/// Brackets are escaped so they match literally, and runs of `*` collapse to
/// a single `*` because `glob` reserves `**` for whole path components.
pub fn compile_pattern(raw: &str) -> Option<Pattern> {
    let mut escaped = String::with_capacity(raw.len() + 4);
    let mut prev_star = false;

    for c in raw.chars() {
        match c {
            '*' if prev_star => continue,
            '[' | ']' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            _ => escaped.push(c),
        }
        prev_star = c == '*';
    }

    match Pattern::new(&escaped) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            log::warn!("ignoring unusable file pattern {:?}: {}", raw, e);
            None
        }
    }
}

fn is_same_or_descendant(rel: &str, dir: &str) -> bool {
    match rel.strip_prefix(dir) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

/// Path of `path` relative to `root`, `/`-separated. `None` for the root
/// itself or paths outside it.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }

    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

/// Key used to group a file in statistics: its lower-cased extension, or
/// the file name when it has none.
pub fn extension_key(path: &Path) -> CompactString {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => CompactString::from(ext.to_lowercase()),
        None => path
            .file_name()
            .map(|n| CompactString::from(n.to_string_lossy().as_ref()))
            .unwrap_or_default(),
    }
}
