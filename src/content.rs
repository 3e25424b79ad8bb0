//! File content blocks.
//!
//! Each included file becomes a `## <relative path>` heading followed by a
//! fenced block. Failures reading a file are rendered in place of its
//! content; they never end the run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::language::fence_tag;
use crate::tree::{format_number, format_size};
use crate::walker::FileRecord;

/// Lines kept from a file over the size limit.
pub const TRUNCATED_LINES: usize = 50;

/// Render the block for `file`, including its heading and trailing rule.
pub fn render_file_block(file: &FileRecord, max_file_size: u64) -> String {
    let mut output = String::with_capacity(file.size.min(max_file_size) as usize + 128);
    output.push_str(&format!("## {}\n\n", file.relative));

    if file.size > max_file_size {
        output.push_str(&truncated_body(&file.path, file.size, max_file_size));
    } else {
        output.push_str(&full_body(&file.path));
    }

    output.push_str("\n---\n\n");
    output
}

fn full_body(path: &Path) -> String {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("cannot read {}: {}", path.display(), err);
            return unavailable(&err.to_string());
        }
    };

    match String::from_utf8(bytes) {
        Ok(text) => fenced(fence_tag(path), &text),
        Err(_) => {
            log::warn!("{} is not valid UTF-8", path.display());
            unavailable("not valid UTF-8 text")
        }
    }
}

fn truncated_body(path: &Path, size: u64, max_file_size: u64) -> String {
    let head = match read_head(path, TRUNCATED_LINES) {
        Ok(head) => head,
        Err(err) => {
            log::warn!("cannot read {}: {}", path.display(), err);
            return unavailable(&err.to_string());
        }
    };

    let mut output = format!(
        "*File truncated: {} bytes ({}) exceeds the {} byte limit. Showing the first {} lines.*\n\n",
        format_number(usize::try_from(size).unwrap_or(usize::MAX)),
        format_size(size),
        format_number(usize::try_from(max_file_size).unwrap_or(usize::MAX)),
        TRUNCATED_LINES
    );
    output.push_str(&fenced("", &head));
    output
}

/// First `max_lines` lines of a file, newline-terminated. Invalid UTF-8 is
/// replaced rather than rejected since only a preview is shown.
fn read_head(path: &Path, max_lines: usize) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut head = String::new();
    let mut line = Vec::new();

    for _ in 0..max_lines {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        head.push_str(&String::from_utf8_lossy(&line));
    }

    Ok(head)
}

fn unavailable(reason: &str) -> String {
    format!("*File unavailable: {}*\n", reason)
}

/// Wrap `text` in a fence longer than any backtick run inside it.
pub fn fenced(tag: &str, text: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(text).max(2) + 1);
    let mut output = String::with_capacity(text.len() + 2 * fence.len() + tag.len() + 3);
    output.push_str(&fence);
    output.push_str(tag);
    output.push('\n');
    output.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(&fence);
    output.push('\n');
    output
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Render every file's block, in the order given.
pub fn render_contents(files: &[FileRecord], max_file_size: u64) -> String {
    files
        .iter()
        .map(|file| render_file_block(file, max_file_size))
        .collect()
}
