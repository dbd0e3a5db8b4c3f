//! Text helpers (ANSI parsing, width calculations, wrapping).
//!
//! These helpers are pure (string in/string out) so renderers can depend on them without
//! touching the terminal.

pub mod ansi;
pub mod width;
pub mod wrap;
