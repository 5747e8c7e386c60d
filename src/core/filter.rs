//! Ignore filter for raw diff text.
//!
//! Drops whole file sections (typically lockfiles) before parsing or
//! analysis, so downstream consumers never see them. Operates on raw text and
//! reassembles the survivors byte-for-byte — retained sections are never
//! re-serialized.

use glob::Pattern;

use super::parser::{extract_file_name, split_by_file};

/// Remove file sections whose path matches any ignore pattern.
///
/// Each section's new-side path is tested by basename and by full path,
/// first as an exact string and then as a glob. Patterns that fail to compile
/// as globs still participate as exact matches. Sections are kept in their
/// original order and original bytes.
pub fn filter_ignored(text: &str, patterns: &[String]) -> String {
    if patterns.is_empty() {
        return text.to_string();
    }

    let globs: Vec<Option<Pattern>> = patterns.iter().map(|p| Pattern::new(p).ok()).collect();

    split_by_file(text)
        .into_iter()
        .filter(|section| {
            let path = extract_file_name(section);
            let ignored = is_ignored(&path, patterns, &globs);
            if ignored {
                tracing::debug!(path = %path, "Dropping ignored file from diff");
            }
            !ignored
        })
        .collect()
}

fn is_ignored(path: &str, patterns: &[String], globs: &[Option<Pattern>]) -> bool {
    let basename = path.rsplit('/').next().unwrap_or(path);

    patterns.iter().zip(globs).any(|(pattern, glob)| {
        if pattern == path || pattern == basename {
            return true;
        }
        match glob {
            Some(glob) => glob.matches(path) || glob.matches(basename),
            None => false,
        }
    })
}
