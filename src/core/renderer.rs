//! Diff rendering.
//!
//! Three presentation forms over parsed diffs: an annotated line-by-line view
//! with optional coloring and line numbers, a compact change-count summary,
//! and a two-column "diff vs. annotation" comparison. All three are pure
//! string transformations; coloring is cosmetic and turning it off yields the
//! same text without escapes.

use super::parser::{self, FileChange, LineKind};
use super::style::{color, fg, BOLD, RESET};

/// Width of the line-number gutter columns in the annotated view.
const GUTTER_WIDTH: usize = 4;

/// Options shared by all render entry points.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit ANSI color escapes
    pub colors: bool,

    /// Show old/new line-number gutters in the annotated view
    pub line_numbers: bool,

    /// Accepted for forward compatibility; rendering does not consume it yet
    pub context_lines: usize,

    /// Target output width in columns
    pub max_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            colors: true,
            line_numbers: true,
            context_lines: 3,
            max_width: 80,
        }
    }
}

/// Render the annotated line-by-line view.
///
/// Each file gets a bordered header sized to `max_width`, carrying a status
/// suffix (` (new)`, ` (deleted)`, ` (renamed from <old>)` — first match
/// wins, in that order). Binary files render a fixed placeholder instead of
/// hunks. With `line_numbers` on, every content line is
/// `<old> <new> │ <marker><content>`; hunk headers render as their raw
/// `@@ ... @@` text with neither numbers nor marker.
pub fn render_annotated(text: &str, opts: &RenderOptions) -> String {
    let mut out = String::new();

    for file in parser::parse(text) {
        out.push_str(&file_header(&file, opts));
        out.push('\n');

        if file.is_binary {
            let placeholder = "  (binary files differ)";
            if opts.colors {
                out.push_str(&format!("{}{}{}", fg(color::GRAY), placeholder, RESET));
            } else {
                out.push_str(placeholder);
            }
            out.push('\n');
            continue;
        }

        for hunk in &file.hunks {
            for line in &hunk.lines {
                out.push_str(&render_line(line, opts));
                out.push('\n');
            }
        }
    }

    out
}

/// Render the compact summary view: one totals line, then one line per file
/// with a bracketed status tag where applicable.
pub fn render_summary(text: &str, opts: &RenderOptions) -> String {
    let files = parser::parse(text);
    let totals = parser::stats(&files);

    let mut out = format!(
        "{} files changed, {} additions(+), {} deletions(-)\n",
        totals.files_changed, totals.additions, totals.deletions
    );

    for file in &files {
        let tag = if file.is_new {
            Some(("[new]", color::GREEN))
        } else if file.is_deleted {
            Some(("[deleted]", color::RED))
        } else if file.is_renamed {
            Some(("[renamed]", color::YELLOW))
        } else {
            None
        };

        match tag {
            Some((tag, tag_color)) if opts.colors => {
                out.push_str(&format!(
                    "  {} {}{}{}\n",
                    file.new_path,
                    fg(tag_color),
                    tag,
                    RESET
                ));
            }
            Some((tag, _)) => {
                out.push_str(&format!("  {} {}\n", file.new_path, tag));
            }
            None => {
                out.push_str(&format!("  {}\n", file.new_path));
            }
        }
    }

    out
}

/// Render raw diff text and an annotation text side by side.
///
/// Pairing is strictly positional by line index — the annotation has no
/// inherent line-for-line correspondence to the diff, and no semantic
/// alignment is attempted. Column widths derive from `max_width`: the left
/// column gets `(max_width - 3) / 2`, the right column the remainder after
/// the 3-column separator. The shorter side is padded with empty rows.
pub fn render_two_column(diff_text: &str, annotation_text: &str, opts: &RenderOptions) -> String {
    let left_width = opts.max_width.saturating_sub(3) / 2;
    let right_width = opts.max_width.saturating_sub(3) - left_width;

    let diff_lines: Vec<&str> = diff_text.lines().collect();
    let annotation_lines: Vec<&str> = annotation_text.lines().collect();
    let rows = diff_lines.len().max(annotation_lines.len());

    let mut out = String::new();
    for i in 0..rows {
        let diff_line = diff_lines.get(i).copied().unwrap_or("");
        let annotation_line = annotation_lines.get(i).copied().unwrap_or("");

        let left = pad_to(diff_line, left_width);
        let right = truncate_to(annotation_line, right_width);

        if opts.colors && diff_line.starts_with('+') {
            out.push_str(&format!("{}{}{} │ {}\n", fg(color::GREEN), left, RESET, right));
        } else if opts.colors && diff_line.starts_with('-') {
            out.push_str(&format!("{}{}{} │ {}\n", fg(color::RED), left, RESET, right));
        } else {
            out.push_str(&format!("{} │ {}\n", left, right));
        }
    }

    out
}

fn file_header(file: &FileChange, opts: &RenderOptions) -> String {
    // Status checks are mutually exclusive, first match wins.
    let suffix = if file.is_new {
        " (new)".to_string()
    } else if file.is_deleted {
        " (deleted)".to_string()
    } else if file.is_renamed {
        format!(" (renamed from {})", file.old_path)
    } else {
        String::new()
    };

    let label = format!("── {}{} ", file.new_path, suffix);
    let fill = opts.max_width.saturating_sub(label.chars().count());
    let header = format!("{}{}", label, "─".repeat(fill));

    if opts.colors {
        format!("{}{}{}", BOLD, header, RESET)
    } else {
        header
    }
}

fn render_line(line: &parser::Line, opts: &RenderOptions) -> String {
    if line.kind == LineKind::Header {
        // Raw header text: no gutter, no marker.
        return if opts.colors {
            format!("{}{}{}", fg(color::CYAN), line.content, RESET)
        } else {
            line.content.clone()
        };
    }

    let marker = match line.kind {
        LineKind::Addition => '+',
        LineKind::Deletion => '-',
        _ => ' ',
    };

    let body = if opts.line_numbers {
        format!(
            "{} {} │ {}{}",
            gutter(line.old_line),
            gutter(line.new_line),
            marker,
            line.content
        )
    } else {
        format!("{}{}", marker, line.content)
    };

    if !opts.colors {
        return body;
    }

    match line.kind {
        LineKind::Addition => format!("{}{}{}", fg(color::GREEN), body, RESET),
        LineKind::Deletion => format!("{}{}{}", fg(color::RED), body, RESET),
        _ => format!("{}{}{}", fg(color::GRAY), body, RESET),
    }
}

fn gutter(number: Option<u32>) -> String {
    match number {
        Some(n) => format!("{:<width$}", n, width = GUTTER_WIDTH),
        None => " ".repeat(GUTTER_WIDTH),
    }
}

fn pad_to(text: &str, width: usize) -> String {
    format!("{:<width$}", truncate_to(text, width), width = width)
}

fn truncate_to(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: &str = "\
diff --git a/src/app.ts b/src/app.ts
index 83db48f..bf269f4 100644
--- a/src/app.ts
+++ b/src/app.ts
@@ -1,3 +1,4 @@
 const a = 1;
-const b = 2;
+const b = 3;
+const c = 4;
 console.log(a);
";

    fn plain() -> RenderOptions {
        RenderOptions {
            colors: false,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_annotated_round_trips_without_colors() {
        let rendered = render_annotated(DIFF, &plain());

        // Stripping the gutter reproduces marker + content verbatim for
        // every hunk line.
        let stripped: Vec<&str> = rendered
            .lines()
            .filter_map(|l| l.split_once("│ ").map(|(_, rest)| rest))
            .collect();
        assert_eq!(
            stripped,
            vec![
                " const a = 1;",
                "-const b = 2;",
                "+const b = 3;",
                "+const c = 4;",
                " console.log(a);",
            ]
        );
    }

    #[test]
    fn test_annotated_contains_no_escapes_when_colors_off() {
        let rendered = render_annotated(DIFF, &plain());
        assert!(!rendered.contains('\x1b'));
    }

    #[test]
    fn test_colors_only_add_escapes() {
        let colored = render_annotated(DIFF, &RenderOptions::default());
        let plain_text = render_annotated(DIFF, &plain());

        let de_escaped: String = {
            // strip CSI sequences: ESC '[' ... 'm'
            let mut out = String::new();
            let mut chars = colored.chars();
            while let Some(c) = chars.next() {
                if c == '\x1b' {
                    for c in chars.by_ref() {
                        if c == 'm' {
                            break;
                        }
                    }
                } else {
                    out.push(c);
                }
            }
            out
        };
        assert_eq!(de_escaped, plain_text);
    }

    #[test]
    fn test_annotated_gutter_numbers() {
        let rendered = render_annotated(DIFF, &plain());
        let lines: Vec<&str> = rendered.lines().collect();

        // header border, raw hunk header, then numbered lines
        assert!(lines[0].starts_with("── src/app.ts "));
        assert_eq!(lines[1], "@@ -1,3 +1,4 @@");
        assert_eq!(lines[2], "1    1    │  const a = 1;");
        assert_eq!(lines[3], "2         │ -const b = 2;");
        assert_eq!(lines[4], "     2    │ +const b = 3;");
    }

    #[test]
    fn test_annotated_without_line_numbers() {
        let opts = RenderOptions {
            colors: false,
            line_numbers: false,
            ..RenderOptions::default()
        };
        let rendered = render_annotated(DIFF, &opts);
        assert!(rendered.contains("\n-const b = 2;\n"));
        assert!(rendered.contains("\n+const b = 3;\n"));
        assert!(!rendered.contains('│'));
    }

    #[test]
    fn test_header_border_sized_to_max_width() {
        let opts = RenderOptions {
            colors: false,
            max_width: 40,
            ..RenderOptions::default()
        };
        let rendered = render_annotated(DIFF, &opts);
        let header = rendered.lines().next().unwrap();
        assert_eq!(header.chars().count(), 40);
    }

    #[test]
    fn test_status_suffix_priority() {
        // new wins over renamed even when paths differ
        let diff = "\
diff --git a/old.rs b/new.rs
new file mode 100644
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,1 @@
+x
";
        let rendered = render_annotated(diff, &plain());
        assert!(rendered.contains("new.rs (new)"));
        assert!(!rendered.contains("renamed"));

        let renamed = "\
diff --git a/old.rs b/new.rs
--- a/old.rs
+++ b/new.rs
@@ -1,1 +1,1 @@
-x
+y
";
        let rendered = render_annotated(renamed, &plain());
        assert!(rendered.contains("new.rs (renamed from old.rs)"));
    }

    #[test]
    fn test_binary_placeholder() {
        let diff = "\
diff --git a/x.png b/x.png
Binary files a/x.png and b/x.png differ
";
        let rendered = render_annotated(diff, &plain());
        assert!(rendered.contains("(binary files differ)"));
        assert!(!rendered.contains('│'));
    }

    #[test]
    fn test_summary_totals_and_tags() {
        let diff = "\
diff --git a/src/app.ts b/src/app.ts
--- a/src/app.ts
+++ b/src/app.ts
@@ -1,2 +1,2 @@
 const a = 1;
-const b = 2;
+const b = 3;
diff --git a/added.rs b/added.rs
new file mode 100644
--- /dev/null
+++ b/added.rs
@@ -0,0 +1,1 @@
+x
";
        let rendered = render_summary(diff, &plain());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "2 files changed, 2 additions(+), 1 deletions(-)");
        assert_eq!(lines[1], "  src/app.ts");
        assert_eq!(lines[2], "  added.rs [new]");
    }

    #[test]
    fn test_two_column_row_count_and_widths() {
        let diff = "+added\n-removed\n context\n";
        let annotation = "this line was added\n";
        let opts = RenderOptions {
            colors: false,
            max_width: 43,
            ..RenderOptions::default()
        };

        let rendered = render_two_column(diff, annotation, &opts);
        let lines: Vec<&str> = rendered.lines().collect();

        // rows = max(3 diff lines, 1 annotation line)
        assert_eq!(lines.len(), 3);

        // left column is (43 - 3) / 2 = 20 columns, padded
        assert_eq!(lines[0], format!("{:<20} │ this line was added", "+added"));
        // missing annotation lines render as empty right cells
        assert_eq!(lines[1], format!("{:<20} │ ", "-removed"));
    }

    #[test]
    fn test_two_column_truncates_long_cells() {
        let diff = "+this diff line is much longer than the column\n";
        let annotation = "annotation text that is also far too long for its cell\n";
        let opts = RenderOptions {
            colors: false,
            max_width: 23,
            ..RenderOptions::default()
        };

        let rendered = render_two_column(diff, annotation, &opts);
        let line = rendered.lines().next().unwrap();
        // left 10 + separator 3 + right 10
        assert_eq!(line.chars().count(), 23);
        assert!(line.starts_with("+this diff"));
    }

    #[test]
    fn test_two_column_marks_changes_when_colored() {
        let opts = RenderOptions {
            max_width: 23,
            ..RenderOptions::default()
        };
        let rendered = render_two_column("+a\n-b\n c\n", "x\ny\nz\n", &opts);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with(&fg(color::GREEN)));
        assert!(lines[1].starts_with(&fg(color::RED)));
        assert!(!lines[2].contains('\x1b'));
    }
}
