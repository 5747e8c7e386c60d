//! Unified diff parser.
//!
//! Turns raw `git diff` output into structured [`FileChange`] records with
//! ordered [`Hunk`]s and line-level [`Line`] annotations. Parsing is
//! best-effort and total over arbitrary text: sections that do not open with
//! a well-formed `diff --git a/<old> b/<new>` header are skipped rather than
//! reported as errors, so upstream tools can feed partial or noisy diffs.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sentinel returned by [`extract_file_name`] when a section has no header.
pub const UNKNOWN_FILE: &str = "unknown";

/// Compiled once, reused across all parse calls
static FILE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^diff --git a/(.+) b/(.+)$").expect("hardcoded header regex"));

/// `@@ -<oldStart>[,<oldCount>] +<newStart>[,<newCount>] @@` — counts optional
static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("hardcoded hunk regex")
});

/// Classification of a single diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// The raw `@@ ... @@` hunk header
    Header,
    /// Unchanged line present on both sides
    Context,
    /// Line added on the new side
    Addition,
    /// Line removed from the old side
    Deletion,
}

/// One line within a hunk, with the leading marker character stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub kind: LineKind,

    /// Line text without its `+`/`-`/space marker; header lines keep the
    /// full `@@ ... @@` text
    pub content: String,

    /// Line number on the old side (context and deletions only)
    pub old_line: Option<u32>,

    /// Line number on the new side (context and additions only)
    pub new_line: Option<u32>,
}

/// One contiguous change region parsed from an `@@` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,

    /// Ordered lines, beginning with a synthetic [`LineKind::Header`] line
    pub lines: Vec<Line>,
}

/// One file's worth of changes from a `diff --git` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path on the old side, byte-for-byte from the header
    pub old_path: String,

    /// Path on the new side, byte-for-byte from the header
    pub new_path: String,

    /// Set when the section contains a `Binary files` marker; binary files
    /// carry no hunks
    pub is_binary: bool,

    /// Set by a `new file mode` header line
    pub is_new: bool,

    /// Set by a `deleted file mode` header line
    pub is_deleted: bool,

    /// Holds whenever the old and new paths differ
    pub is_renamed: bool,

    /// Ordered hunks; empty for binary files
    pub hunks: Vec<Hunk>,
}

/// Aggregate change counts across a parsed diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub files_changed: usize,
    pub additions: usize,
    pub deletions: usize,
}

/// Parse raw unified diff text into file-change records.
///
/// Never fails: malformed sections are dropped from the output. Callers that
/// need strict validation can compare the result length against
/// [`split_by_file`].
pub fn parse(text: &str) -> Vec<FileChange> {
    split_by_file(text)
        .iter()
        .filter_map(|section| parse_section(section))
        .collect()
}

/// Split raw diff text into per-file sections.
///
/// Each section begins at a `diff --git ` marker line and runs until the next
/// marker or end of input, preserving the section's exact bytes. Text before
/// the first marker belongs to no file and is discarded.
pub fn split_by_file(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut in_section = false;

    for line in text.split_inclusive('\n') {
        if line.starts_with("diff --git ") {
            if in_section {
                sections.push(std::mem::take(&mut current));
            }
            in_section = true;
            current.push_str(line);
        } else if in_section {
            current.push_str(line);
        }
    }

    if in_section && !current.is_empty() {
        sections.push(current);
    }

    sections
}

/// Extract the new-side path from one file section.
///
/// Returns [`UNKNOWN_FILE`] when no `diff --git` header matches — display
/// flows use this as a label before committing to a full parse.
pub fn extract_file_name(section: &str) -> String {
    for line in section.lines() {
        if let Some(caps) = FILE_HEADER_RE.captures(line) {
            return caps[2].to_string();
        }
    }
    UNKNOWN_FILE.to_string()
}

/// Tally additions and deletions across all hunks of all files.
///
/// `files_changed` counts records whether or not they contain hunks.
pub fn stats(files: &[FileChange]) -> DiffStats {
    let mut additions = 0;
    let mut deletions = 0;

    for file in files {
        for hunk in &file.hunks {
            for line in &hunk.lines {
                match line.kind {
                    LineKind::Addition => additions += 1,
                    LineKind::Deletion => deletions += 1,
                    _ => {}
                }
            }
        }
    }

    DiffStats {
        files_changed: files.len(),
        additions,
        deletions,
    }
}

fn parse_section(section: &str) -> Option<FileChange> {
    let header = section.lines().next()?;
    let caps = match FILE_HEADER_RE.captures(header) {
        Some(caps) => caps,
        None => {
            tracing::debug!(first_line = header, "Skipping section without a diff header");
            return None;
        }
    };

    let old_path = caps[1].to_string();
    let new_path = caps[2].to_string();
    let mut change = FileChange {
        is_renamed: old_path != new_path,
        old_path,
        new_path,
        is_binary: false,
        is_new: false,
        is_deleted: false,
        hunks: Vec::new(),
    };

    // Metadata can appear anywhere in the section, not just directly under
    // the header.
    for line in section.lines() {
        if line.starts_with("Binary files ") {
            change.is_binary = true;
        } else if line.starts_with("new file mode") {
            change.is_new = true;
        } else if line.starts_with("deleted file mode") {
            change.is_deleted = true;
        }
    }

    // Binary sections never carry hunks.
    if change.is_binary {
        return Some(change);
    }

    let mut current: Option<Hunk> = None;
    let mut old_line: u32 = 0;
    let mut new_line: u32 = 0;

    for line in section.lines().skip(1) {
        if let Some(caps) = HUNK_HEADER_RE.captures(line) {
            if let Some(hunk) = current.take() {
                change.hunks.push(hunk);
            }

            let old_start = caps[1].parse().unwrap_or(1);
            let old_count = caps.get(2).map_or(1, |m| m.as_str().parse().unwrap_or(1));
            let new_start = caps[3].parse().unwrap_or(1);
            let new_count = caps.get(4).map_or(1, |m| m.as_str().parse().unwrap_or(1));

            old_line = old_start;
            new_line = new_start;

            current = Some(Hunk {
                old_start,
                old_count,
                new_start,
                new_count,
                lines: vec![Line {
                    kind: LineKind::Header,
                    content: line.to_string(),
                    old_line: None,
                    new_line: None,
                }],
            });
            continue;
        }

        let Some(hunk) = current.as_mut() else {
            // Lines outside an open hunk (index, mode, ---/+++ headers) carry
            // no line-level content.
            continue;
        };

        // `+++`/`---` are file metadata, never additions or deletions.
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        }

        if let Some(rest) = line.strip_prefix('+') {
            hunk.lines.push(Line {
                kind: LineKind::Addition,
                content: rest.to_string(),
                old_line: None,
                new_line: Some(new_line),
            });
            new_line += 1;
        } else if let Some(rest) = line.strip_prefix('-') {
            hunk.lines.push(Line {
                kind: LineKind::Deletion,
                content: rest.to_string(),
                old_line: Some(old_line),
                new_line: None,
            });
            old_line += 1;
        } else if let Some(rest) = line.strip_prefix(' ') {
            hunk.lines.push(Line {
                kind: LineKind::Context,
                content: rest.to_string(),
                old_line: Some(old_line),
                new_line: Some(new_line),
            });
            old_line += 1;
            new_line += 1;
        }
        // Anything else (e.g. `\ No newline at end of file`) is ignored.
    }

    if let Some(hunk) = current.take() {
        change.hunks.push(hunk);
    }

    Some(change)
}
