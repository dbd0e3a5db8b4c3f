//! Render configuration: TOML file plus environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_ANSI_THEME: &str = "base16-ocean.dark";

/// Placeholder in [`HtmlPage::header`] replaced by the escaped page title.
pub const TITLE_PLACEHOLDER: &str = "{title}";

const DEFAULT_HTML_HEADER: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
<title>{title}</title>
</head>
<body>
";
const DEFAULT_HTML_FOOTER: &str = "</body>
</html>
";

/// A literal `from -> to` substitution applied to rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Document shell written around the HTML body of a finished turn.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HtmlPage {
    /// Markup before the body; may contain `{title}`.
    pub header: String,
    pub footer: String,
    /// Longest title, in characters, before it is cut and ends in `...`.
    pub max_title_len: usize,
}

impl Default for HtmlPage {
    fn default() -> Self {
        Self {
            header: DEFAULT_HTML_HEADER.to_string(),
            footer: DEFAULT_HTML_FOOTER.to_string(),
            max_title_len: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub include_thoughts: bool,
    /// Answer text only: no prompt echo, thoughts, citations, grounding, or footer.
    pub pure_response: bool,
    /// When off, the ANSI file receives the Markdown text.
    pub ansi_rendering: bool,
    /// When off, the HTML file receives the Markdown text and no page shell.
    pub html_rendering: bool,
    /// Syntect theme used for code blocks in ANSI output.
    pub ansi_theme: String,
    /// Fixed ANSI wrap width; `None` detects the terminal width.
    pub terminal_width: Option<usize>,
    pub html_replacements: Vec<Replacement>,
    pub ansi_replacements: Vec<Replacement>,
    pub html_page: HtmlPage,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            include_thoughts: true,
            pure_response: false,
            ansi_rendering: true,
            html_rendering: true,
            ansi_theme: DEFAULT_ANSI_THEME.to_string(),
            terminal_width: None,
            html_replacements: Vec::new(),
            ansi_replacements: Vec::new(),
            html_page: HtmlPage::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl RenderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overrides fields from `ANSWER_RENDER_*` variables. Empty or unparsable values are ignored.
    pub fn apply_env(mut self) -> Self {
        if let Some(enabled) = env_flag("ANSWER_RENDER_THOUGHTS") {
            self.include_thoughts = enabled;
        }
        if let Some(enabled) = env_flag("ANSWER_RENDER_PURE") {
            self.pure_response = enabled;
        }
        if let Some(width) = env_string_opt("ANSWER_RENDER_WIDTH") {
            match width.trim().parse::<usize>() {
                Ok(columns) if columns > 0 => self.terminal_width = Some(columns),
                _ => log::warn!("ignoring ANSWER_RENDER_WIDTH={width:?}; expected a column count"),
            }
        }
        if let Some(theme) = env_string_opt("ANSWER_RENDER_THEME") {
            self.ansi_theme = theme;
        }
        self
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_flag(key: &str) -> Option<bool> {
    match env_string_opt(key)?.trim() {
        "1" => Some(true),
        "0" => Some(false),
        other => {
            log::warn!("ignoring {key}={other:?}; expected 0 or 1");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HtmlPage, RenderConfig, Replacement, DEFAULT_ANSI_THEME, TITLE_PLACEHOLDER};
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = RenderConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, RenderConfig::default());
        assert!(config.include_thoughts);
        assert_eq!(config.ansi_theme, DEFAULT_ANSI_THEME);
        assert!(config.terminal_width.is_none());
        assert!(!config.pure_response);
        assert!(config.ansi_rendering && config.html_rendering);
        assert!(config.html_page.header.contains(TITLE_PLACEHOLDER));
    }

    #[test]
    fn toggles_and_page_shell_parse() {
        let text = r#"
pure_response = true
ansi_rendering = false
html_rendering = false

[html_page]
header = "<html><title>{title}</title><body>"
max_title_len = 40
"#;
        let config = RenderConfig::from_toml_str(text).expect("config parses");
        assert!(config.pure_response);
        assert!(!config.ansi_rendering);
        assert!(!config.html_rendering);
        assert_eq!(
            config.html_page,
            HtmlPage {
                header: "<html><title>{title}</title><body>".to_string(),
                max_title_len: 40,
                ..HtmlPage::default()
            }
        );
    }

    #[test]
    fn toml_fields_and_replacement_tables_parse() {
        let text = r#"
include_thoughts = false
ansi_theme = "Solarized (dark)"
terminal_width = 100

[[html_replacements]]
from = "<table>"
to = "<table class=\"grid\">"

[[ansi_replacements]]
from = "\u001b[34m"
to = "\u001b[36m"
"#;
        let config = RenderConfig::from_toml_str(text).expect("config parses");
        assert!(!config.include_thoughts);
        assert_eq!(config.ansi_theme, "Solarized (dark)");
        assert_eq!(config.terminal_width, Some(100));
        assert_eq!(
            config.html_replacements,
            vec![Replacement::new("<table>", "<table class=\"grid\">")]
        );
        assert_eq!(
            config.ansi_replacements,
            vec![Replacement::new("\x1b[34m", "\x1b[36m")]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(RenderConfig::from_toml_str("colour = true").is_err());
    }

    #[test]
    fn load_reports_missing_file_path() {
        let err = RenderConfig::load(std::path::Path::new("/nonexistent/answer.toml"))
            .expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/answer.toml"));
    }

    #[test]
    fn env_overrides_apply() {
        let _lock = env_lock();
        let _g1 = set_env_guard("ANSWER_RENDER_THOUGHTS", Some("0"));
        let _g2 = set_env_guard("ANSWER_RENDER_WIDTH", Some("120"));
        let _g3 = set_env_guard("ANSWER_RENDER_THEME", Some("InspiredGitHub"));
        let _g4 = set_env_guard("ANSWER_RENDER_PURE", Some("1"));

        let config = RenderConfig::default().apply_env();
        assert!(!config.include_thoughts);
        assert!(config.pure_response);
        assert_eq!(config.terminal_width, Some(120));
        assert_eq!(config.ansi_theme, "InspiredGitHub");
    }

    #[test]
    fn empty_and_invalid_env_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("ANSWER_RENDER_THOUGHTS", Some(""));
        let _g2 = set_env_guard("ANSWER_RENDER_WIDTH", Some("wide"));
        let _g3 = set_env_guard("ANSWER_RENDER_THEME", None);
        let _g4 = set_env_guard("ANSWER_RENDER_PURE", Some("yes"));

        let config = RenderConfig::default().apply_env();
        assert_eq!(config, RenderConfig::default());
    }
}
