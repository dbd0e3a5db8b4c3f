//! Text cleanup passes applied to model output before rendering.
//!
//! Models drift: they indent whole paragraphs, wrap entire answers in a ```` ```markdown ````
//! fence, or indent fence markers so far that CommonMark reads them as indented code. Each pass
//! here fixes one of those quirks and is a pure `&str -> String` (or `&str -> &str`) function.

pub mod fence;
pub mod indent;
pub mod unwrap;

pub use fence::dedent_fence_markers;
pub use indent::{normalize_indentation, ScanState};
pub use unwrap::unwrap_outer_fence;
