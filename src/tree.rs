//! Project tree rendering.
//!
//! The tree section is produced by a [`TreeProvider`]. Two exist: the
//! built-in renderer, which draws box-drawing connectors itself, and
//! [`SystemTreeProvider`], which feeds the same filtered path list to the
//! external `tree` utility. Both see exactly the same entries, so exclusions
//! are identical whichever one draws the result.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use smallvec::SmallVec;
use thiserror::Error;

use crate::config::ScanConfig;
use crate::filter::{relative_path, PathFilter};
use crate::walker::{classify_entry, EntryKind};

/// Box-drawing characters for tree rendering.
const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const VERTICAL: &str = "│   ";
const SPACE: &str = "    ";

/// Errors from a tree provider. Never fatal: the caller falls back to the
/// built-in renderer.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("`{program}` is not available")]
    Unavailable { program: String },

    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("`{program}` produced no output")]
    EmptyOutput { program: String },

    #[error("`{program}` output differs from the built-in layout at line {line}")]
    Mismatch { program: String, line: usize },
}

/// One visible line of the tree, below the root line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the project root, `/`-separated.
    pub relative: String,
    /// Final path component.
    pub name: String,
    pub is_dir: bool,
    /// Last child of its parent.
    pub is_last: bool,
    /// `is_last` of every ancestor between the root and this entry.
    pub ancestors: SmallVec<[bool; 16]>,
}

/// Entries in display order, cut off at the item cap.
#[derive(Debug, Clone, Default)]
pub struct TreeWalk {
    pub entries: Vec<TreeEntry>,
    /// More entries existed past the cap.
    pub truncated: bool,
}

/// A rendered tree section.
#[derive(Debug, Clone)]
pub struct TreeListing {
    /// Tree text, root line first, newline-terminated.
    pub text: String,
    /// Entries below the root line.
    pub entries: usize,
    pub truncated: bool,
    /// Name of the provider that drew it.
    pub provider: &'static str,
}

/// Something that can draw the tree section.
pub trait TreeProvider {
    /// Short name for logs and run summaries.
    fn name(&self) -> &'static str;

    /// Render the filtered tree rooted at `root`.
    fn render(
        &self,
        root: &Path,
        config: &ScanConfig,
        filter: &PathFilter,
    ) -> Result<TreeListing, TreeError>;
}

/// Draws the tree in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTreeProvider;

impl BuiltinTreeProvider {
    /// Infallible form of [`TreeProvider::render`].
    pub fn listing(&self, root: &Path, config: &ScanConfig, filter: &PathFilter) -> TreeListing {
        let walk = collect_entries(root, filter, config.max_tree_items);
        TreeListing {
            text: format_tree(&root_label(root), &walk, config.max_tree_items),
            entries: walk.entries.len(),
            truncated: walk.truncated,
            provider: self.name(),
        }
    }
}

impl TreeProvider for BuiltinTreeProvider {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn render(
        &self,
        root: &Path,
        config: &ScanConfig,
        filter: &PathFilter,
    ) -> Result<TreeListing, TreeError> {
        Ok(self.listing(root, config, filter))
    }
}

/// Pipes the filtered path list into `tree --fromfile`.
#[derive(Debug, Clone)]
pub struct SystemTreeProvider {
    program: String,
}

impl Default for SystemTreeProvider {
    fn default() -> Self {
        Self::new("tree")
    }
}

impl SystemTreeProvider {
    /// Use `program` as the `tree` executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Probe the executable with `--version`.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    fn run(&self, listing: &str) -> Result<String, TreeError> {
        let mut child = Command::new(&self.program)
            .args([
                "--fromfile",
                "--dirsfirst",
                "--noreport",
                "--charset=utf-8",
                "-a",
                "-n",
                "-N",
                "-",
            ])
            .env("LC_ALL", "C")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(listing.as_bytes())
                .map_err(|source| self.spawn_error(source))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|source| self.spawn_error(source))?;

        if !output.status.success() {
            return Err(TreeError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `index` counts lines below the root line.
    fn mismatch(&self, index: usize) -> TreeError {
        TreeError::Mismatch {
            program: self.program.clone(),
            line: index + 2,
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> TreeError {
        TreeError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl TreeProvider for SystemTreeProvider {
    fn name(&self) -> &'static str {
        "system"
    }

    fn render(
        &self,
        root: &Path,
        config: &ScanConfig,
        filter: &PathFilter,
    ) -> Result<TreeListing, TreeError> {
        let walk = collect_entries(root, filter, config.max_tree_items);

        let mut listing = String::with_capacity(walk.entries.len() * 32);
        for entry in &walk.entries {
            listing.push_str(&entry.relative);
            if entry.is_dir {
                listing.push('/');
            }
            listing.push('\n');
        }

        let raw = self.run(&listing)?;

        // The first line names the listing source and is dropped. Some builds
        // pad indents with NO-BREAK SPACE, and directories may lack the
        // trailing slash. Any other difference from the built-in drawing is
        // an error.
        let drawn: Vec<String> = raw
            .lines()
            .skip(1)
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.replace('\u{a0}', " "))
            .collect();
        if drawn.is_empty() && !walk.entries.is_empty() {
            return Err(TreeError::EmptyOutput {
                program: self.program.clone(),
            });
        }

        let text = format_tree(&root_label(root), &walk, config.max_tree_items);
        let expected = text.lines().skip(1).take(walk.entries.len());
        for (index, (got, want)) in drawn.iter().zip(expected).enumerate() {
            if got.trim_end_matches('/') != want.trim_end_matches('/') {
                return Err(self.mismatch(index));
            }
        }
        if drawn.len() != walk.entries.len() {
            return Err(self.mismatch(drawn.len().min(walk.entries.len())));
        }

        Ok(TreeListing {
            text,
            entries: walk.entries.len(),
            truncated: walk.truncated,
            provider: self.name(),
        })
    }
}

/// Pick the provider for this run.
pub fn select_provider(config: &ScanConfig) -> Box<dyn TreeProvider> {
    if config.prefer_system_tree {
        let system = SystemTreeProvider::default();
        if system.is_available() {
            return Box::new(system);
        }
        log::debug!("system tree utility unavailable, using built-in renderer");
    }
    Box::new(BuiltinTreeProvider)
}

/// Render the tree section, falling back to the built-in renderer when the
/// selected provider fails.
pub fn render_tree(root: &Path, config: &ScanConfig, filter: &PathFilter) -> TreeListing {
    let provider = select_provider(config);
    match provider.render(root, config, filter) {
        Ok(listing) => listing,
        Err(err) => {
            log::warn!("{} tree provider failed ({}), using built-in", provider.name(), err);
            BuiltinTreeProvider.listing(root, config, filter)
        }
    }
}

struct Child {
    path: PathBuf,
    relative: String,
    name: String,
    is_dir: bool,
}

struct Frame {
    children: Vec<Child>,
    next: usize,
    ancestors: SmallVec<[bool; 16]>,
}

/// Walk the filtered hierarchy in display order, stopping after
/// `max_items` entries.
///
/// Iterative: each stack frame holds one directory's sorted children and
/// the is-last flags of its ancestors.
pub fn collect_entries(root: &Path, filter: &PathFilter, max_items: usize) -> TreeWalk {
    let mut walk = TreeWalk::default();
    let mut stack = vec![Frame {
        children: list_children(root, root, filter),
        next: 0,
        ancestors: SmallVec::new(),
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.next >= frame.children.len() {
            stack.pop();
            continue;
        }
        if walk.entries.len() >= max_items {
            walk.truncated = true;
            break;
        }

        let index = frame.next;
        frame.next += 1;
        let is_last = index + 1 == frame.children.len();
        let ancestors = frame.ancestors.clone();
        let child = &frame.children[index];

        walk.entries.push(TreeEntry {
            relative: child.relative.clone(),
            name: child.name.clone(),
            is_dir: child.is_dir,
            is_last,
            ancestors: ancestors.clone(),
        });

        if child.is_dir {
            let children = list_children(root, &child.path, filter);
            let mut nested = ancestors;
            nested.push(is_last);
            stack.push(Frame {
                children,
                next: 0,
                ancestors: nested,
            });
        }
    }

    walk
}

/// Accepted children of `dir`: directories first, then byte-wise by name.
fn list_children(root: &Path, dir: &Path, filter: &PathFilter) -> Vec<Child> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(err) => {
            log::warn!("cannot list {}: {}", dir.display(), err);
            return Vec::new();
        }
    };

    let mut children: Vec<(std::ffi::OsString, Child)> = Vec::new();
    for entry in read {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("cannot read entry in {}: {}", dir.display(), err);
                continue;
            }
        };

        let path = entry.path();
        let Some(relative) = relative_path(root, &path) else {
            continue;
        };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        let is_dir = file_type.is_dir();
        let accepted = if is_dir {
            filter.accepts_dir(&relative)
        } else {
            filter.accepts_file(&relative, &path)
                && matches!(
                    classify_entry(&path, file_type),
                    Some(EntryKind::File { .. })
                )
        };
        if !accepted {
            continue;
        }

        let os_name = entry.file_name();
        children.push((
            os_name.clone(),
            Child {
                name: os_name.to_string_lossy().into_owned(),
                path,
                relative,
                is_dir,
            },
        ));
    }

    children.sort_by(|(a_name, a), (b_name, b)| {
        b.is_dir.cmp(&a.is_dir).then_with(|| a_name.cmp(b_name))
    });
    children.into_iter().map(|(_, child)| child).collect()
}

/// Draw `walk` under a root line labelled `root_name`.
pub fn format_tree(root_name: &str, walk: &TreeWalk, max_items: usize) -> String {
    let mut output = String::with_capacity(64 + walk.entries.len() * 48);
    output.push_str(root_name);
    output.push_str("/\n");

    for entry in &walk.entries {
        for &ancestor_is_last in &entry.ancestors {
            output.push_str(if ancestor_is_last { SPACE } else { VERTICAL });
        }
        output.push_str(if entry.is_last { LAST_BRANCH } else { BRANCH });
        output.push_str(&entry.name);
        if entry.is_dir {
            output.push('/');
        }
        output.push('\n');
    }

    if walk.truncated {
        output.push_str(&truncation_notice(max_items));
    }
    output
}

fn truncation_notice(max_items: usize) -> String {
    format!("... (tree truncated at {} entries)\n", format_number(max_items))
}

/// Display name for the root line.
pub fn root_label(root: &Path) -> String {
    root.file_name().map_or_else(
        || root.to_string_lossy().into_owned(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Format file size for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes < KB {
        format!("{}B", bytes)
    } else if bytes < MB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    }
}

/// Format number with thousands separators.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
