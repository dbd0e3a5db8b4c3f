//! Syntax highlighting for fenced code in terminal output.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

use crate::error::RenderError;

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

pub struct CodeHighlighter {
    theme: &'static Theme,
}

impl CodeHighlighter {
    /// Fails when `theme_name` is not one of the bundled syntect themes.
    pub fn new(theme_name: &str) -> Result<Self, RenderError> {
        let theme = THEMES
            .themes
            .get(theme_name)
            .ok_or_else(|| RenderError::UnknownTheme(theme_name.to_string()))?;
        Ok(Self { theme })
    }

    /// Highlights `code` into one escaped line per source line, each ending in a reset.
    pub fn highlight(&self, code: &str, language: Option<&str>) -> Result<Vec<String>, RenderError> {
        let syntax = syntax_for(language);
        let mut highlighter = HighlightLines::new(syntax, self.theme);
        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let ranges = highlighter
                .highlight_line(line, &SYNTAXES)
                .map_err(|err| RenderError::Highlight(err.to_string()))?;
            let escaped = as_24_bit_terminal_escaped(&ranges, false);
            lines.push(format!("{}\x1b[0m", escaped.trim_end_matches(['\n', '\r'])));
        }
        Ok(lines)
    }

    /// Like [`highlight`](Self::highlight), but falls back to the raw lines on failure.
    pub fn highlight_or_plain(&self, code: &str, language: Option<&str>) -> Vec<String> {
        match self.highlight(code, language) {
            Ok(lines) => lines,
            Err(err) => {
                log::warn!("{err}; rendering code block without highlighting");
                code.split('\n').map(str::to_string).collect()
            }
        }
    }
}

fn syntax_for(language: Option<&str>) -> &'static SyntaxReference {
    language
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .and_then(|lang| {
            SYNTAXES
                .find_syntax_by_token(lang)
                .or_else(|| SYNTAXES.find_syntax_by_token(&lang.to_ascii_lowercase()))
        })
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text())
}
