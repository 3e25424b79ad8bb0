//! Projmap CLI - snapshot a project directory into a single markdown report.

use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::{generate, Shell};
use projmap::builder::{Projmap, RunSummary};
use projmap::config::{merge_lists, ScanConfig};
use projmap::errors::{exit_code, ProjmapError};
use projmap::tree::format_number;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "projmap")]
#[command(about = "Snapshot a project directory into a single markdown report")]
#[command(version)]
struct Cli {
    /// Project directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Report file to write (default: project_analysis.md)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Files larger than this many bytes show only their first 50 lines
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Replace the included extensions (comma separated)
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Add to the included extensions
    #[arg(long, value_delimiter = ',')]
    add_extensions: Vec<String>,

    /// Replace the excluded directories
    #[arg(long, value_delimiter = ',')]
    exclude_dirs: Option<Vec<String>>,

    /// Add to the excluded directories
    #[arg(long, value_delimiter = ',')]
    add_exclude_dirs: Vec<String>,

    /// Replace the excluded file patterns (`*` and `?` wildcards)
    #[arg(long, value_delimiter = ',')]
    exclude_files: Option<Vec<String>>,

    /// Add to the excluded file patterns
    #[arg(long, value_delimiter = ',')]
    add_exclude_files: Vec<String>,

    /// Write only the header, statistics and tree
    #[arg(long)]
    tree_only: bool,

    /// Skip the file contents section
    #[arg(long)]
    no_content: bool,

    /// Include per-extension statistics
    #[arg(long)]
    stats: bool,

    /// Maximum number of tree entries
    #[arg(long)]
    max_tree_items: Option<usize>,

    /// Never use the system `tree` utility
    #[arg(long)]
    builtin_tree: bool,

    /// Load settings from a JSON file; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the run summary (or error) as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(shell) = cli.completions {
        generate(shell, &mut Cli::command(), "projmap", &mut std::io::stdout());
        return;
    }

    let json_output = cli.json;
    let result = build_config(cli).and_then(|config| Projmap::from_config(config).run());

    match result {
        Ok(summary) => {
            if let Err(e) = print_summary(&summary, json_output) {
                report_error(&e, json_output);
            }
        }
        Err(e) => report_error(&e, json_output),
    }
}

fn report_error(e: &ProjmapError, json_output: bool) -> ! {
    if json_output {
        #[derive(Serialize)]
        struct ErrorOutput {
            error: String,
        }

        let payload = ErrorOutput {
            error: e.to_string(),
        };

        let json = serde_json::to_string(&payload)
            .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
        eprintln!("{json}");
    } else {
        eprintln!("error: {}", e);
    }
    std::process::exit(exit_code(e));
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Defaults, then the config file, then flags.
fn build_config(cli: Cli) -> Result<ScanConfig, ProjmapError> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };

    config.root = cli.path;
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(size) = cli.max_file_size {
        config.max_file_size = size;
    }
    if let Some(items) = cli.max_tree_items {
        config.max_tree_items = items;
    }

    if let Some(exts) = cli.extensions {
        config.included_extensions = exts;
    }
    merge_lists(&mut config.included_extensions, &cli.add_extensions);

    if let Some(dirs) = cli.exclude_dirs {
        config.excluded_dirs = dirs;
    }
    merge_lists(&mut config.excluded_dirs, &cli.add_exclude_dirs);

    if let Some(patterns) = cli.exclude_files {
        config.excluded_files = patterns;
    }
    merge_lists(&mut config.excluded_files, &cli.add_exclude_files);

    config.tree_only |= cli.tree_only;
    config.no_content |= cli.no_content;
    config.show_stats |= cli.stats;
    if cli.builtin_tree {
        config.prefer_system_tree = false;
    }

    Ok(config)
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<(), ProjmapError> {
    if json {
        let json = serde_json::to_string_pretty(summary)
            .map_err(|e| ProjmapError::Io(std::io::Error::other(e.to_string())))?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "Wrote {} ({} files, {} tree entries{})",
        summary.output.display(),
        format_number(summary.files_included),
        format_number(summary.tree_entries),
        if summary.tree_truncated { ", tree truncated" } else { "" }
    );
    if let Some(stats) = &summary.stats {
        println!(
            "{} lines across {} extensions",
            format_number(stats.total_lines),
            stats.by_extension.len()
        );
    }
    Ok(())
}
