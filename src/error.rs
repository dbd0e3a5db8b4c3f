use thiserror::Error;

/// A format-local rendering failure. The pipeline shows its message in place of the output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("markdown parse error: {0}")]
    Markdown(String),

    #[error("unknown ANSI theme '{0}'")]
    UnknownTheme(String),

    #[error("syntax highlighting failed: {0}")]
    Highlight(String),
}
