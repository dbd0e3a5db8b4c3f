//! Indentation normalizer.
//!
//! Strips accidental leading whitespace from prose while keeping the indentation that carries
//! meaning: list nesting, quotes, tables, footnotes, raw HTML, rules, definition lists, and the
//! interiors of fenced code and display math.

use once_cell::sync::Lazy;
use regex::Regex;

static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d*[.)]|[*+-])\s").expect("list item pattern"));

/// Scanner state carried from one line to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Column of the opening fence while inside fenced code.
    pub fence_indent: Option<usize>,
    pub in_math: bool,
}

impl ScanState {
    pub fn in_fenced_code(&self) -> bool {
        self.fence_indent.is_some()
    }

    /// Consumes one line, returning the follow-up state and the line as it should be emitted.
    pub fn step(self, line: &str) -> (Self, String) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return (self, String::new());
        }

        if trimmed.starts_with("```") {
            let fence_indent = match self.fence_indent {
                Some(_) => None,
                None => Some(leading_width(line)),
            };
            let next = Self {
                fence_indent,
                ..self
            };
            return (next, trimmed.to_string());
        }

        if let Some(indent) = self.fence_indent {
            return (self, dedent_code_line(line, indent));
        }

        if trimmed.starts_with("$$") {
            let single_line = trimmed.len() > 4 && trimmed.ends_with("$$");
            let next = Self {
                in_math: self.in_math ^ !single_line,
                ..self
            };
            return (next, keep_indent(line));
        }
        if trimmed.starts_with("\\[") {
            let single_line = trimmed.len() > 2 && trimmed.ends_with("\\]");
            let next = Self {
                in_math: self.in_math || !single_line,
                ..self
            };
            return (next, keep_indent(line));
        }
        if trimmed.starts_with("\\]") {
            return (
                Self {
                    in_math: false,
                    ..self
                },
                keep_indent(line),
            );
        }
        if self.in_math {
            return (self, keep_indent(line));
        }

        if is_structural(trimmed) {
            (self, keep_indent(line))
        } else {
            (self, with_hard_break(line, trimmed))
        }
    }
}

/// Normalizes leading whitespace line by line. The result has no trailing newline.
pub fn normalize_indentation(input: &str) -> String {
    let (_, lines) = input.lines().fold(
        (ScanState::default(), Vec::new()),
        |(state, mut lines), line| {
            let (next, emitted) = state.step(line);
            lines.push(emitted);
            (next, lines)
        },
    );

    let mut out = lines.join("\n");
    let content_len = out.trim_end_matches('\n').len();
    out.truncate(content_len);
    out
}

fn leading_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Removes the opening fence's indentation from a code line, or all leading whitespace when the
/// line is indented less than the fence.
fn dedent_code_line(line: &str, fence_indent: usize) -> String {
    let body = line.trim_end();
    if leading_width(body) >= fence_indent {
        body[fence_indent..].to_string()
    } else {
        body.trim_start().to_string()
    }
}

fn keep_indent(line: &str) -> String {
    with_hard_break(line, line.trim_end())
}

/// Re-appends a Markdown hard break (two trailing spaces) when the source line had one.
fn with_hard_break(line: &str, body: &str) -> String {
    if line.ends_with("  ") && !body.trim().is_empty() {
        format!("{body}  ")
    } else {
        body.to_string()
    }
}

fn is_structural(trimmed: &str) -> bool {
    const PREFIXES: [&str; 9] = [">", "|", "[^", "<", "---", "***", "___", ": ", ":\t"];
    PREFIXES.iter().any(|prefix| trimmed.starts_with(prefix)) || LIST_ITEM.is_match(trimmed)
}
