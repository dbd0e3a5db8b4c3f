//! Output renderers.
//!
//! Every format walks the same [`Answer`]. Markdown and ANSI share the normalized Markdown
//! text; HTML converts the un-normalized block sources so thoughts can become `<details>`.

pub mod ansi;
pub mod highlight;
pub mod html;
pub mod markdown;

pub use ansi::{render_ansi, AnsiOptions, AnsiRenderer, AnsiTheme};
pub use highlight::CodeHighlighter;
pub use html::{markdown_to_html, page_title, render_html, wrap_page};
pub use markdown::{render_markdown, THOUGHTS_HEADING};

use crate::answer::Answer;
use crate::config::RenderConfig;
use crate::platform::{resolve_width, terminal_columns};

/// One answer in all three output formats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedOutput {
    pub markdown: String,
    pub ansi: String,
    pub html: String,
}

/// Renders all formats. A format that fails carries its error message as content; a disabled
/// format carries the Markdown text.
pub fn render_answer(answer: &Answer, config: &RenderConfig) -> RenderedOutput {
    let markdown = render_markdown(answer);

    let options = AnsiOptions {
        width: resolve_width(config.terminal_width, terminal_columns()),
        theme_name: &config.ansi_theme,
        replacements: &config.ansi_replacements,
    };
    let ansi = if config.ansi_rendering {
        match render_ansi(&markdown, &options) {
            Ok(ansi) => ansi,
            Err(err) => {
                log::warn!("ANSI rendering failed: {err}");
                format!("{err}\n")
            }
        }
    } else {
        markdown.clone()
    };

    let html = if config.html_rendering {
        render_html(answer, &config.html_replacements)
    } else {
        markdown.clone()
    };
    log::debug!(
        "rendered {} blocks: {} markdown bytes, {} ansi bytes, {} html bytes",
        answer.blocks().len(),
        markdown.len(),
        ansi.len(),
        html.len()
    );

    RenderedOutput {
        markdown,
        ansi,
        html,
    }
}
