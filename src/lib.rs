//! Post-processing for generative-AI answers.
//!
//! Invariant: content flows one way. A response is assembled into an [`Answer`] once, and each
//! renderer derives its output from that tree without feeding anything back.
//!
//! # Public API Overview
//! - Clean up model Markdown with the passes in [`cleanup`].
//! - Build an [`Answer`] from a [`genai_response::GenerateContentResponse`] with
//!   [`assemble_response`].
//! - Render it to Markdown, ANSI, and HTML with [`render_answer`].
//! - Load [`RenderConfig`] from TOML and `ANSWER_RENDER_*` variables.

#![allow(clippy::needless_range_loop, clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod logging;

pub mod answer;
pub mod cleanup;
pub mod core;
pub mod platform;
pub mod render;

/// Typed answer document and assembly.
pub use crate::answer::{
    assemble_candidate, assemble_error, assemble_response, Answer, AssembleOptions, Block,
    DirectorySink, GroundingLink, MediaSink, ResponseContext,
};

/// Text cleanup passes.
pub use crate::cleanup::{dedent_fence_markers, normalize_indentation, unwrap_outer_fence};

/// Configuration and errors.
pub use crate::config::{ConfigError, HtmlPage, RenderConfig, Replacement};
pub use crate::error::RenderError;

/// Renderers.
pub use crate::render::{render_answer, RenderedOutput};

/// ANSI-aware wrapping helper.
pub use crate::core::text::wrap::wrap_text_with_ansi;
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
