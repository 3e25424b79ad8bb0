//! Scan configuration.
//!
//! A [`ScanConfig`] is built once (defaults, optional JSON file, CLI flags)
//! and then passed by reference to every phase of a run. Nothing mutates it
//! after the run starts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default byte threshold above which file contents are truncated.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024;

/// Default cap on entries emitted by the tree renderer.
pub const DEFAULT_MAX_TREE_ITEMS: usize = 2000;

/// Default report file name, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "project_analysis.md";

/// Directories skipped by default, anchored at the project root.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "out",
    "coverage",
    ".next",
    ".nuxt",
    ".cache",
    ".idea",
    ".vscode",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    "vendor",
];

/// Extensions (and exact file names) eligible for the report by default.
pub const DEFAULT_INCLUDED_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "json", "md", "mdx", "css", "scss", "sass", "less",
    "html", "vue", "svelte", "py", "rs", "go", "java", "kt", "rb", "php", "c", "h", "cpp", "hpp",
    "cs", "swift", "yml", "yaml", "toml", "xml", "sh", "sql", "graphql", "prisma", "Dockerfile",
];

/// File patterns skipped by default.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "*.lock",
    "*.min.js",
    "*.min.css",
    "*.map",
    "*.log",
    ".DS_Store",
];

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("max_tree_items must be greater than zero")]
    ZeroTreeCap,
}

/// Everything a run needs to know. Immutable once the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Project root to scan.
    pub root: PathBuf,
    /// Where the report is written.
    pub output: PathBuf,
    /// Files larger than this (in bytes) are truncated to their first lines.
    pub max_file_size: u64,
    /// Directory names excluded together with everything beneath them.
    pub excluded_dirs: Vec<String>,
    /// Extensions without the leading dot, or exact file names.
    pub included_extensions: Vec<String>,
    /// `*`/`?` glob patterns matched against the whole relative path.
    pub excluded_files: Vec<String>,
    /// Suppress the contents section.
    pub tree_only: bool,
    /// Suppress the contents section but keep tree and statistics.
    pub no_content: bool,
    /// Emit the statistics section.
    pub show_stats: bool,
    /// Cap on tree entries.
    pub max_tree_items: usize,
    /// Try the system `tree` utility before the built-in renderer.
    pub prefer_system_tree: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            excluded_dirs: to_strings(DEFAULT_EXCLUDED_DIRS),
            included_extensions: to_strings(DEFAULT_INCLUDED_EXTENSIONS),
            excluded_files: to_strings(DEFAULT_EXCLUDED_FILES),
            tree_only: false,
            no_content: false,
            show_stats: false,
            max_tree_items: DEFAULT_MAX_TREE_ITEMS,
            prefer_system_tree: true,
        }
    }
}

impl ScanConfig {
    /// Default configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether the file contents section is written.
    pub fn emit_contents(&self) -> bool {
        !self.tree_only && !self.no_content
    }

    /// Normalize list entries and check invariants.
    ///
    /// Extensions lose a leading dot, directory entries lose surrounding
    /// separators, and duplicates are dropped (first occurrence wins).
    pub fn normalized(mut self) -> Result<Self, ConfigError> {
        if self.max_tree_items == 0 {
            return Err(ConfigError::ZeroTreeCap);
        }

        self.included_extensions = dedup(
            self.included_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty()),
        );
        self.excluded_dirs = dedup(
            self.excluded_dirs
                .iter()
                .map(|d| d.replace('\\', "/").trim_matches('/').to_string())
                .filter(|d| !d.is_empty()),
        );
        self.excluded_files = dedup(self.excluded_files.iter().filter(|p| !p.is_empty()).cloned());

        Ok(self)
    }
}

/// Strip whitespace and the leading dot from an inclusion entry.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// Append `extra` to `base`, skipping entries already present.
pub fn merge_lists(base: &mut Vec<String>, extra: &[String]) {
    for item in extra {
        if !base.contains(item) {
            base.push(item.clone());
        }
    }
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
