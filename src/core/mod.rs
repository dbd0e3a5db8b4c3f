//! Shared low-level helpers.

pub mod text;
