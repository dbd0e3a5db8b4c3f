//! Typed model of a `generateContent` response.
//!
//! Every field is optional on the wire; missing data deserializes to empty collections or `None`
//! so downstream formatting can degrade by omission instead of failing the whole response.

pub mod error;
pub mod part;
pub mod types;

pub use error::ResponseError;
pub use part::{Blob, Outcome, Part};
pub use types::{
    ApiError, Candidate, ChunkSource, Citation, CitationMetadata, Content, FinishReason,
    GenerateContentResponse, GroundingChunk, GroundingMetadata,
};
