//! Terminal queries.

pub mod terminal_size;

pub use terminal_size::{resolve_width, terminal_columns};
