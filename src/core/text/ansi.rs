//! ANSI escape parsing, SGR style tracking, and literal color-code substitution.

use crate::config::Replacement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiCodeKind {
    Csi,
    Osc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiCode<'a> {
    pub code: &'a str,
    pub kind: AnsiCodeKind,
}

impl AnsiCode<'_> {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// Returns the escape sequence starting at byte `pos`, if any.
pub fn extract_ansi_code(input: &str, pos: usize) -> Option<AnsiCode<'_>> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }

    match bytes.get(pos + 1)? {
        b'[' => {
            let end = bytes[pos + 2..]
                .iter()
                .position(|b| (0x40..=0x7e).contains(b))?;
            Some(AnsiCode {
                code: &input[pos..pos + 2 + end + 1],
                kind: AnsiCodeKind::Csi,
            })
        }
        b']' => {
            let mut idx = pos + 2;
            while idx < bytes.len() {
                if bytes[idx] == 0x07 {
                    return Some(AnsiCode {
                        code: &input[pos..=idx],
                        kind: AnsiCodeKind::Osc,
                    });
                }
                if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
                    return Some(AnsiCode {
                        code: &input[pos..idx + 2],
                        kind: AnsiCodeKind::Osc,
                    });
                }
                idx += 1;
            }
            None
        }
        _ => None,
    }
}

/// Removes every escape sequence, leaving the visible text.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(ansi) = extract_ansi_code(input, idx) {
            idx += ansi.len();
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}

/// Applies literal color-code replacements in order, for palettes that clash with the user's
/// terminal theme. Empty `from` keys are skipped.
pub fn apply_color_replacements(input: &str, replacements: &[Replacement]) -> String {
    replacements
        .iter()
        .filter(|replacement| !replacement.from.is_empty())
        .fold(input.to_string(), |text, replacement| {
            text.replace(&replacement.from, &replacement.to)
        })
}

/// Tracks active SGR attributes so wrapped continuation lines can re-open them.
#[derive(Debug, Default)]
pub struct AnsiCodeTracker {
    bold: bool,
    dim: bool,
    italic: bool,
    underline: bool,
    strikethrough: bool,
    fg_color: Option<String>,
    bg_color: Option<String>,
}

impl AnsiCodeTracker {
    pub fn process(&mut self, ansi_code: &str) {
        let Some(params) = ansi_code
            .strip_prefix("\x1b[")
            .and_then(|rest| rest.strip_suffix('m'))
        else {
            return;
        };

        if params.is_empty() {
            *self = Self::default();
            return;
        }

        let parts: Vec<&str> = params.split(';').collect();
        let mut idx = 0;
        while idx < parts.len() {
            let code = parts[idx].parse::<u16>().unwrap_or(0);
            if code == 38 || code == 48 {
                let span = match parts.get(idx + 1) {
                    Some(&"5") => 3,
                    Some(&"2") => 5,
                    _ => 1,
                };
                if span > 1 && idx + span <= parts.len() {
                    let color = parts[idx..idx + span].join(";");
                    if code == 38 {
                        self.fg_color = Some(color);
                    } else {
                        self.bg_color = Some(color);
                    }
                    idx += span;
                    continue;
                }
            }

            match code {
                0 => *self = Self::default(),
                1 => self.bold = true,
                2 => self.dim = true,
                3 => self.italic = true,
                4 => self.underline = true,
                9 => self.strikethrough = true,
                22 => {
                    self.bold = false;
                    self.dim = false;
                }
                23 => self.italic = false,
                24 => self.underline = false,
                29 => self.strikethrough = false,
                39 => self.fg_color = None,
                49 => self.bg_color = None,
                30..=37 | 90..=97 => self.fg_color = Some(code.to_string()),
                40..=47 | 100..=107 => self.bg_color = Some(code.to_string()),
                _ => {}
            }
            idx += 1;
        }
    }

    pub fn active_codes(&self) -> String {
        let flags = [
            (self.bold, "1"),
            (self.dim, "2"),
            (self.italic, "3"),
            (self.underline, "4"),
            (self.strikethrough, "9"),
        ];
        let mut codes: Vec<&str> = flags
            .iter()
            .filter(|(active, _)| *active)
            .map(|(_, code)| *code)
            .collect();
        codes.extend(self.fg_color.as_deref());
        codes.extend(self.bg_color.as_deref());

        if codes.is_empty() {
            String::new()
        } else {
            format!("\x1b[{}m", codes.join(";"))
        }
    }

    /// Underline bleeds into the padding of a wrapped line, so it is closed at line end.
    pub fn line_end_reset(&self) -> &'static str {
        if self.underline {
            "\x1b[24m"
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_color_replacements, extract_ansi_code, strip_ansi, AnsiCodeTracker};
    use crate::config::Replacement;

    #[test]
    fn csi_and_osc_sequences_are_extracted() {
        let csi = extract_ansi_code("\x1b[1;31mx", 0).expect("csi");
        assert_eq!(csi.code, "\x1b[1;31m");
        let osc = extract_ansi_code("\x1b]8;;https://a\x07", 0).expect("osc");
        assert_eq!(osc.len(), "\x1b]8;;https://a\x07".len());
        assert!(extract_ansi_code("plain", 0).is_none());
    }

    #[test]
    fn strip_removes_styles() {
        assert_eq!(strip_ansi("\x1b[1mbold\x1b[22m text"), "bold text");
    }

    #[test]
    fn tracker_replays_active_styles() {
        let mut tracker = AnsiCodeTracker::default();
        tracker.process("\x1b[1m");
        tracker.process("\x1b[38;5;208m");
        assert_eq!(tracker.active_codes(), "\x1b[1;38;5;208m");
        tracker.process("\x1b[0m");
        assert_eq!(tracker.active_codes(), "");
    }

    #[test]
    fn replacements_apply_in_order() {
        let replacements = vec![
            Replacement::new("\x1b[34m", "\x1b[36m"),
            Replacement::new("\x1b[36m", "\x1b[96m"),
            Replacement::new("", "ignored"),
        ];
        assert_eq!(
            apply_color_replacements("\x1b[34mblue", &replacements),
            "\x1b[96mblue"
        );
    }
}
