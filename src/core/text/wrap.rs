//! ANSI-aware word wrapping.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{extract_ansi_code, AnsiCodeTracker};
use super::width::{grapheme_width, visible_width};

/// Wraps `text` to `width` columns, splitting on spaces and breaking words that cannot fit.
///
/// Active styles are re-opened at the start of every continuation line, and trailing whitespace
/// is trimmed from every output line.
pub fn wrap_text_with_ansi(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() || width == 0 {
        return vec![String::new()];
    }

    let mut result = Vec::new();
    let mut tracker = AnsiCodeTracker::default();
    for input_line in text.split('\n') {
        let line = format!("{}{}", tracker.active_codes(), input_line);
        result.extend(wrap_single_line(&line, width));
        track_codes(input_line, &mut tracker);
    }

    result
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect()
}

fn wrap_single_line(line: &str, width: usize) -> Vec<String> {
    if visible_width(line) <= width {
        return vec![line.to_string()];
    }

    let mut tracker = AnsiCodeTracker::default();
    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for token in split_tokens(line) {
        let token_width = visible_width(&token);
        let is_space = token_width > 0 && visible_text(&token).trim().is_empty();

        if token_width > width && !is_space {
            if current_width > 0 {
                wrapped.push(close_line(&current, &tracker));
            }
            let mut pieces = break_long_word(&token, width, &mut tracker);
            current = pieces.pop().unwrap_or_default();
            current_width = visible_width(&current);
            wrapped.extend(pieces);
            continue;
        }

        if current_width > 0 && current_width + token_width > width {
            let reopen = tracker.active_codes();
            if is_space {
                // Dropped whitespace may still carry a style change.
                current.push_str(&escapes_only(&token));
            }
            wrapped.push(close_line(&current, &tracker));
            track_codes(&token, &mut tracker);
            if is_space {
                current = tracker.active_codes();
                current_width = 0;
            } else {
                current = format!("{reopen}{token}");
                current_width = token_width;
            }
            continue;
        }

        current.push_str(&token);
        current_width += token_width;
        track_codes(&token, &mut tracker);
    }

    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

fn close_line(line: &str, tracker: &AnsiCodeTracker) -> String {
    format!("{}{}", line.trim_end(), tracker.line_end_reset())
}

/// Splits into alternating word / space runs; escapes attach to the run that follows them.
fn split_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut pending_ansi = String::new();
    let mut in_space = false;
    let mut idx = 0;

    while idx < text.len() {
        if let Some(ansi) = extract_ansi_code(text, idx) {
            pending_ansi.push_str(ansi.code);
            idx += ansi.len();
            continue;
        }
        let Some(ch) = text[idx..].chars().next() else {
            break;
        };
        let is_space = ch == ' ';
        if is_space != in_space && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current.push_str(&pending_ansi);
        pending_ansi.clear();
        current.push(ch);
        in_space = is_space;
        idx += ch.len_utf8();
    }

    current.push_str(&pending_ansi);
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn break_long_word(word: &str, width: usize, tracker: &mut AnsiCodeTracker) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = tracker.active_codes();
    let mut current_width = 0;
    let mut idx = 0;

    while idx < word.len() {
        if let Some(ansi) = extract_ansi_code(word, idx) {
            current.push_str(ansi.code);
            tracker.process(ansi.code);
            idx += ansi.len();
            continue;
        }

        let text_end = next_escape_or_end(word, idx);
        for grapheme in word[idx..text_end].graphemes(true) {
            let grapheme_cols = grapheme_width(grapheme);
            if current_width > 0 && current_width + grapheme_cols > width {
                current.push_str(tracker.line_end_reset());
                lines.push(std::mem::replace(&mut current, tracker.active_codes()));
                current_width = 0;
            }
            current.push_str(grapheme);
            current_width += grapheme_cols;
        }
        idx = text_end;
    }

    lines.push(current);
    lines
}

fn track_codes(text: &str, tracker: &mut AnsiCodeTracker) {
    let mut idx = 0;
    while idx < text.len() {
        if let Some(ansi) = extract_ansi_code(text, idx) {
            tracker.process(ansi.code);
            idx += ansi.len();
        } else {
            idx += text[idx..].chars().next().map_or(1, char::len_utf8);
        }
    }
}

fn escapes_only(text: &str) -> String {
    let mut out = String::new();
    let mut idx = 0;
    while idx < text.len() {
        if let Some(ansi) = extract_ansi_code(text, idx) {
            out.push_str(ansi.code);
            idx += ansi.len();
        } else {
            idx += text[idx..].chars().next().map_or(1, char::len_utf8);
        }
    }
    out
}

fn visible_text(text: &str) -> String {
    super::ansi::strip_ansi(text)
}

fn next_escape_or_end(line: &str, mut idx: usize) -> usize {
    while idx < line.len() {
        if extract_ansi_code(line, idx).is_some() {
            break;
        }
        idx += line[idx..].chars().next().map_or(1, char::len_utf8);
    }
    idx
}
