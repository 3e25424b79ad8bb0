//! Error types for projmap.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::report::OutputError;
use crate::walker::WalkError;

/// Top-level error type for projmap operations.
///
/// Only setup failures and the final report write surface here. Per-file
/// read failures are recovered where they happen and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum ProjmapError {
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Map an error to its exit code.
pub fn exit_code(error: &ProjmapError) -> i32 {
    match error {
        ProjmapError::PathNotFound(_) => 3,
        ProjmapError::NotADirectory(_) => 4,
        ProjmapError::Io(_) => 1,
        ProjmapError::Walk(_) => 2,
        ProjmapError::Config(_) => 1,
        ProjmapError::Output(_) => 1,
    }
}
