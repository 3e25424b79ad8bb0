//! Projmap - snapshot a project directory into a single markdown report.
//!
//! Projmap walks a directory tree, applies directory/file exclusion rules and
//! an extension allow-list, and writes one report containing a header, an
//! optional statistics table, a tree view of the included paths, and the
//! contents of each included file (truncated when oversized).
//!
//! # Quick Start
//!
//! ```no_run
//! use projmap::builder::Projmap;
//!
//! let summary = Projmap::new("./my-project")
//!     .output("project_analysis.md")
//!     .show_stats(true)
//!     .run()
//!     .unwrap();
//!
//! println!("Included {} files", summary.files_included);
//! ```
//!
//! # Modules
//!
//! - [`config`] - Scan configuration and defaults
//! - [`filter`] - Directory, file-pattern and extension rules
//! - [`walker`] - Filtered directory traversal and line counting
//! - [`tree`] - Tree providers and rendering
//! - [`stats`] - Per-extension statistics
//! - [`language`] - Extension to fence-tag mapping
//! - [`content`] - File content blocks
//! - [`report`] - Report assembly and writing
//! - [`builder`] - Fluent API tying the phases together

pub mod config;
pub mod filter;
pub mod errors;
pub mod walker;
pub mod tree;
pub mod stats;
pub mod language;
pub mod content;
pub mod report;
pub mod builder;

// Re-export key types at crate root for convenience
pub use builder::{Projmap, RenderedReport, RunSummary};
pub use config::{ConfigError, ScanConfig};
pub use errors::ProjmapError;
pub use filter::PathFilter;
pub use report::OutputError;
pub use stats::{ExtensionStats, ProjectStats};
pub use tree::{BuiltinTreeProvider, SystemTreeProvider, TreeError, TreeListing, TreeProvider};
pub use walker::{FileRecord, WalkError};
