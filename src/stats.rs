//! Per-extension file and line statistics.

use std::collections::BTreeMap;
use std::path::Path;

use compact_str::CompactString;
use serde::Serialize;

use crate::filter::PathFilter;
use crate::tree::format_number;
use crate::walker::{count_lines, walk_files, FileRecord};

/// Counts for one extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionStats {
    pub files: usize,
    pub lines: usize,
}

/// Aggregated statistics for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total_files: usize,
    pub total_lines: usize,
    /// Keyed by extension, iterated alphabetically.
    pub by_extension: BTreeMap<CompactString, ExtensionStats>,
}

impl ProjectStats {
    /// Add one file. `lines` is `None` when the file could not be read; the
    /// file still counts.
    pub fn record(&mut self, extension: &str, lines: Option<usize>) {
        let lines = lines.unwrap_or(0);
        let entry = self
            .by_extension
            .entry(CompactString::from(extension))
            .or_default();
        entry.files += 1;
        entry.lines += lines;
        self.total_files += 1;
        self.total_lines += lines;
    }
}

/// Statistics over the files in `files` no larger than `max_file_size`.
pub fn stats_for_files(files: &[FileRecord], max_file_size: u64) -> ProjectStats {
    let mut stats = ProjectStats::default();

    for file in files.iter().filter(|f| f.size <= max_file_size) {
        let lines = count_lines(&file.path);
        if lines.is_none() {
            log::warn!("cannot count lines in {}, counting the file only", file.relative);
        }
        stats.record(&file.extension, lines);
    }

    stats
}

/// Walk `root` and collect statistics.
pub fn collect_stats(root: &Path, filter: &PathFilter, max_file_size: u64) -> ProjectStats {
    let files = walk_files(root, filter);
    let stats = stats_for_files(&files, max_file_size);
    log::debug!(
        "statistics: {} files, {} lines, {} extensions",
        stats.total_files,
        stats.total_lines,
        stats.by_extension.len()
    );
    stats
}

/// Markdown table, one row per extension, then totals.
pub fn format_stats(stats: &ProjectStats) -> String {
    let mut output = String::with_capacity(128 + stats.by_extension.len() * 32);
    output.push_str("| Extension | Files | Lines |\n");
    output.push_str("|-----------|------:|------:|\n");

    for (ext, entry) in &stats.by_extension {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            ext,
            format_number(entry.files),
            format_number(entry.lines)
        ));
    }

    output.push_str(&format!(
        "| **Total** | **{}** | **{}** |\n",
        format_number(stats.total_files),
        format_number(stats.total_lines)
    ));
    output
}
