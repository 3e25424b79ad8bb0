//! Report assembly.
//!
//! Sections are concatenated in a fixed order: header, statistics (opt-in),
//! structure, file contents (opt-out). The mode flags only decide which
//! sections appear, never how a section looks.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::stats::{format_stats, ProjectStats};

/// Timestamp format used in the header.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while writing the report.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Identity of a scan, printed at the top of the report.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub project_name: String,
    pub scanned_at: DateTime<Local>,
    /// Absolute scanned directory.
    pub root: PathBuf,
}

/// Everything that goes into one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportSections<'a> {
    pub header: &'a ReportHeader,
    /// Present when statistics were requested.
    pub stats: Option<&'a ProjectStats>,
    /// Rendered tree, newline-terminated.
    pub tree: &'a str,
    /// Rendered file blocks, present unless contents are suppressed.
    pub contents: Option<&'a str>,
}

/// Concatenate the sections into the final report text.
pub fn assemble_report(sections: &ReportSections<'_>) -> String {
    let contents_len = sections.contents.map_or(0, str::len);
    let mut output = String::with_capacity(1024 + sections.tree.len() + contents_len);

    let header = sections.header;
    output.push_str("# PROJECT ANALYSIS\n\n");
    output.push_str(&format!("**Project:** {}\n", header.project_name));
    output.push_str(&format!(
        "**Scan date:** {}\n",
        header.scanned_at.format(TIMESTAMP_FORMAT)
    ));
    output.push_str(&format!(
        "**Scanned directory:** {}\n\n",
        header.root.display()
    ));
    output.push_str("---\n\n");

    if let Some(stats) = sections.stats {
        output.push_str("# PROJECT STATISTICS\n\n");
        output.push_str(&format_stats(stats));
        output.push_str("\n---\n\n");
    }

    output.push_str("# PROJECT STRUCTURE\n\n");
    output.push_str(sections.tree);
    output.push_str("\n---\n\n");

    if let Some(contents) = sections.contents {
        output.push_str("# FILE CONTENTS\n\n");
        output.push_str(contents);
    }

    output
}

/// Write `report` to `path` as UTF-8, replacing any existing file.
pub fn write_report(path: &Path, report: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    std::fs::write(path, report).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}
