//! Fluent builder API for projmap.
//!
//! [`Projmap`] collects settings into a [`ScanConfig`] and runs the three
//! phases (tree, statistics, contents) against it, each from its own walk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::{merge_lists, ScanConfig};
use crate::content::render_contents;
use crate::errors::ProjmapError;
use crate::filter::{relative_path, PathFilter};
use crate::report::{assemble_report, write_report, ReportHeader, ReportSections};
use crate::stats::{collect_stats, ProjectStats};
use crate::tree::{render_tree, root_label};
use crate::walker::{resolve_root, walk_files, WalkError};

/// Builder for a project report.
///
/// # Examples
///
/// ```no_run
/// use projmap::builder::Projmap;
///
/// let summary = Projmap::new("./my-project")
///     .output("analysis.md")
///     .show_stats(true)
///     .add_excluded_dirs(&["fixtures"])
///     .run()
///     .unwrap();
///
/// println!("{} files written to {}", summary.files_included, summary.output.display());
/// ```
#[derive(Debug, Clone)]
pub struct Projmap {
    config: ScanConfig,
}

impl Projmap {
    /// Create a builder with default settings for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: ScanConfig::new(root),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Report destination.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = path.into();
        self
    }

    /// Byte threshold above which contents are truncated.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// Replace the inclusion list.
    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.config.included_extensions = owned(exts);
        self
    }

    /// Extend the inclusion list.
    pub fn add_extensions(mut self, exts: &[&str]) -> Self {
        merge_lists(&mut self.config.included_extensions, &owned(exts));
        self
    }

    /// Replace the excluded directories.
    pub fn excluded_dirs(mut self, dirs: &[&str]) -> Self {
        self.config.excluded_dirs = owned(dirs);
        self
    }

    /// Extend the excluded directories.
    pub fn add_excluded_dirs(mut self, dirs: &[&str]) -> Self {
        merge_lists(&mut self.config.excluded_dirs, &owned(dirs));
        self
    }

    /// Replace the excluded file patterns.
    pub fn excluded_files(mut self, patterns: &[&str]) -> Self {
        self.config.excluded_files = owned(patterns);
        self
    }

    /// Extend the excluded file patterns.
    pub fn add_excluded_files(mut self, patterns: &[&str]) -> Self {
        merge_lists(&mut self.config.excluded_files, &owned(patterns));
        self
    }

    /// Only write header, statistics and tree.
    pub fn tree_only(mut self, on: bool) -> Self {
        self.config.tree_only = on;
        self
    }

    /// Skip file contents.
    pub fn no_content(mut self, on: bool) -> Self {
        self.config.no_content = on;
        self
    }

    /// Include the statistics section.
    pub fn show_stats(mut self, on: bool) -> Self {
        self.config.show_stats = on;
        self
    }

    /// Cap on tree entries.
    pub fn max_tree_items(mut self, items: usize) -> Self {
        self.config.max_tree_items = items;
        self
    }

    /// Whether to try the system `tree` utility first.
    pub fn prefer_system_tree(mut self, on: bool) -> Self {
        self.config.prefer_system_tree = on;
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Build the report in memory without writing it.
    pub fn render(self) -> Result<RenderedReport, ProjmapError> {
        self.render_at(Local::now())
    }

    /// [`Projmap::render`] with a fixed scan time.
    pub fn render_at(self, scanned_at: DateTime<Local>) -> Result<RenderedReport, ProjmapError> {
        let root = resolve_root(&self.config.root).map_err(setup_error)?;
        let config = self.config.normalized()?;
        let config = exclude_output_file(config, &root);
        generate(&root, &config, scanned_at)
    }

    /// Build the report and write it to the configured output path.
    pub fn run(self) -> Result<RunSummary, ProjmapError> {
        let output = self.config.output.clone();
        let rendered = self.render()?;
        write_report(&output, &rendered.text)?;
        log::info!("report written to {}", output.display());

        Ok(rendered.summary(output))
    }
}

/// A report held in memory.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Full report text.
    pub text: String,
    /// Canonical project root.
    pub root: PathBuf,
    pub project_name: String,
    /// Files in the contents section, or that would be there if it were
    /// not suppressed.
    pub files_included: usize,
    pub tree_entries: usize,
    pub tree_truncated: bool,
    pub tree_provider: &'static str,
    pub stats: Option<ProjectStats>,
}

impl RenderedReport {
    fn summary(self, output: PathBuf) -> RunSummary {
        RunSummary {
            output,
            root: self.root,
            project_name: self.project_name,
            files_included: self.files_included,
            tree_entries: self.tree_entries,
            tree_truncated: self.tree_truncated,
            tree_provider: self.tree_provider,
            stats: self.stats,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output: PathBuf,
    pub root: PathBuf,
    pub project_name: String,
    pub files_included: usize,
    pub tree_entries: usize,
    pub tree_truncated: bool,
    pub tree_provider: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProjectStats>,
}

fn generate(
    root: &Path,
    config: &ScanConfig,
    scanned_at: DateTime<Local>,
) -> Result<RenderedReport, ProjmapError> {
    let filter = PathFilter::new(config);
    let project_name = root_label(root);

    log::debug!("rendering tree for {}", root.display());
    let tree = render_tree(root, config, &filter);

    let stats = if config.show_stats {
        log::debug!("collecting statistics");
        Some(collect_stats(root, &filter, config.max_file_size))
    } else {
        None
    };

    let files = walk_files(root, &filter);
    let contents = if config.emit_contents() {
        log::debug!("rendering {} file blocks", files.len());
        Some(render_contents(&files, config.max_file_size))
    } else {
        None
    };

    let header = ReportHeader {
        project_name: project_name.clone(),
        scanned_at,
        root: root.to_path_buf(),
    };
    let text = assemble_report(&ReportSections {
        header: &header,
        stats: stats.as_ref(),
        tree: &tree.text,
        contents: contents.as_deref(),
    });

    Ok(RenderedReport {
        text,
        root: root.to_path_buf(),
        project_name,
        files_included: files.len(),
        tree_entries: tree.entries,
        tree_truncated: tree.truncated,
        tree_provider: tree.provider,
        stats,
    })
}

/// Keep a report written inside the project out of its own next run.
fn exclude_output_file(mut config: ScanConfig, root: &Path) -> ScanConfig {
    let output = absolute(&config.output);
    let resolved = match (output.parent(), output.file_name()) {
        (Some(parent), Some(name)) => parent.canonicalize().ok().map(|p| p.join(name)),
        _ => None,
    };
    let output = resolved.unwrap_or(output);

    if let Some(rel) = relative_path(root, &output) {
        log::debug!("excluding report file {} from the scan", rel);
        merge_lists(&mut config.excluded_files, &[rel]);
    }
    config
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn setup_error(err: WalkError) -> ProjmapError {
    match err {
        WalkError::NotFound { path } => ProjmapError::PathNotFound(path),
        WalkError::NotADirectory { path } => ProjmapError::NotADirectory(path),
        other => ProjmapError::Walk(other),
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    /// The reference layout: two TypeScript sources plus noise that the
    /// default rules exclude.
    fn create_ts_project() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/left-pad")).unwrap();
        fs::write(
            dir.path().join("src/index.ts"),
            "import { x } from './utils';\nconsole.log(x);\nexport {};\n",
        )
        .unwrap();
        fs::write(dir.path().join("src/utils.ts"), "").unwrap();
        fs::write(dir.path().join("package-lock.json"), "{}\n").unwrap();
        fs::write(dir.path().join("node_modules/left-pad/index.js"), "x\n").unwrap();

        dir
    }

    fn builder(dir: &TempDir) -> Projmap {
        Projmap::new(dir.path())
            .output(dir.path().join("report.md"))
            .prefer_system_tree(false)
    }

    #[test]
    fn test_end_to_end_scenario() {
        let dir = create_ts_project();
        let rendered = builder(&dir).show_stats(true).render_at(fixed_time()).unwrap();
        let text = &rendered.text;

        assert!(text.contains("├── src/\n") || text.contains("└── src/\n"));
        assert!(text.contains("    ├── index.ts\n"));
        assert!(text.contains("    └── utils.ts\n"));
        assert!(!text.contains("node_modules"));
        assert!(!text.contains("package-lock.json"));

        assert_eq!(text.matches("```typescript\n").count(), 2);
        assert!(text.contains("## src/index.ts\n"));
        assert!(text.contains("## src/utils.ts\n"));

        let stats = rendered.stats.unwrap();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_lines, 3);
        assert_eq!(stats.by_extension["ts"].files, 2);
        assert!(text.contains("| ts | 2 | 3 |"));
        assert_eq!(rendered.files_included, 2);
    }

    #[test]
    fn test_contents_sorted_by_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b/z.ts"), "z\n").unwrap();
        fs::write(dir.path().join("a.ts"), "a\n").unwrap();
        fs::write(dir.path().join("c.ts"), "c\n").unwrap();

        let text = builder(&dir).render_at(fixed_time()).unwrap().text;
        let a = text.find("## a.ts").unwrap();
        let bz = text.find("## b/z.ts").unwrap();
        let c = text.find("## c.ts").unwrap();
        assert!(a < bz && bz < c);
    }

    #[test]
    fn test_mode_flags_compose() {
        let dir = create_ts_project();

        let tree_only = builder(&dir)
            .tree_only(true)
            .show_stats(true)
            .render_at(fixed_time())
            .unwrap()
            .text;
        assert!(tree_only.contains("# PROJECT STATISTICS"));
        assert!(tree_only.contains("# PROJECT STRUCTURE"));
        assert!(!tree_only.contains("# FILE CONTENTS"));

        let no_content = builder(&dir).no_content(true).render_at(fixed_time()).unwrap().text;
        assert!(!no_content.contains("# PROJECT STATISTICS"));
        assert!(no_content.contains("# PROJECT STRUCTURE"));
        assert!(!no_content.contains("# FILE CONTENTS"));

        let full = builder(&dir).render_at(fixed_time()).unwrap().text;
        assert!(full.contains("# FILE CONTENTS"));
    }

    #[test]
    fn test_repeat_runs_identical_except_timestamp() {
        let dir = create_ts_project();

        let first = builder(&dir).show_stats(true).run().unwrap();
        let first_text = fs::read_to_string(&first.output).unwrap();
        let second = builder(&dir).show_stats(true).run().unwrap();
        let second_text = fs::read_to_string(&second.output).unwrap();

        let strip = |s: &str| -> String {
            s.lines()
                .filter(|l| !l.starts_with("**Scan date:**"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(strip(&first_text), strip(&second_text));
        // The report itself lives in the project and must not be picked up.
        assert!(!second_text.contains("report.md"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_appears_in_every_section() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.ts"), "a\nb\n").unwrap();
        symlink(dir.path().join("real.ts"), dir.path().join("link.ts")).unwrap();

        let rendered = builder(&dir).show_stats(true).render_at(fixed_time()).unwrap();
        let text = &rendered.text;

        assert!(text.contains("├── link.ts\n└── real.ts\n"));
        assert!(text.contains("## link.ts\n"));
        assert!(text.contains("## real.ts\n"));
        assert_eq!(rendered.tree_entries, 2);
        assert_eq!(rendered.files_included, 2);

        let stats = rendered.stats.unwrap();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_lines, 4);
    }

    #[test]
    fn test_missing_root_is_fatal_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.md");

        let err = Projmap::new(dir.path().join("missing"))
            .output(&output)
            .run()
            .unwrap_err();

        assert!(matches!(err, ProjmapError::PathNotFound(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, "").unwrap();

        let err = Projmap::new(&file)
            .output(dir.path().join("out.md"))
            .run()
            .unwrap_err();
        assert!(matches!(err, ProjmapError::NotADirectory(_)));
    }

    #[test]
    fn test_custom_lists() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("fixtures")).unwrap();
        fs::write(dir.path().join("fixtures/a.ts"), "").unwrap();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        fs::write(dir.path().join("main.zig"), "").unwrap();

        let text = builder(&dir)
            .add_excluded_dirs(&["fixtures"])
            .add_extensions(&["zig", "Makefile"])
            .render_at(fixed_time())
            .unwrap()
            .text;

        assert!(!text.contains("fixtures"));
        assert!(text.contains("## Makefile"));
        assert!(text.contains("## main.zig"));
    }

    #[test]
    fn test_header_fields() {
        let dir = create_ts_project();
        let rendered = builder(&dir).render_at(fixed_time()).unwrap();

        assert!(rendered
            .text
            .starts_with(&format!("# PROJECT ANALYSIS\n\n**Project:** {}\n", rendered.project_name)));
        assert!(rendered.text.contains("**Scan date:** 2025-01-02 03:04:05\n"));
        assert!(rendered
            .text
            .contains(&format!("**Scanned directory:** {}\n", rendered.root.display())));
    }
}
