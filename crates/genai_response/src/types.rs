use std::fmt;
use std::io::Read;

use serde::Deserialize;

use crate::error::ResponseError;
use crate::part::Part;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub model_version: Option<String>,
    /// Set when the service answered with an error body instead of candidates.
    pub error: Option<ApiError>,
}

impl GenerateContentResponse {
    pub fn from_json(json: &str) -> Result<Self, ResponseError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ResponseError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// The `error` object of a failed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "Error {code}, ")?;
        }
        write!(f, "Message: {}", self.message)?;
        if let Some(status) = self.status.as_deref().filter(|status| !status.is_empty()) {
            write!(f, ", Status: {status}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub index: Option<u32>,
    pub content: Option<Content>,
    pub finish_reason: Option<FinishReason>,
    pub citation_metadata: Option<CitationMetadata>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

impl Candidate {
    /// Content parts in wire order; empty when the candidate carries no content.
    pub fn parts(&self) -> &[Part] {
        self.content
            .as_ref()
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
    }

    pub fn citations(&self) -> &[Citation] {
        self.citation_metadata
            .as_ref()
            .map(|metadata| metadata.citations.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Content {
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Why generation stopped for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Language,
    Blocklist,
    ProhibitedContent,
    Spii,
    MalformedFunctionCall,
    FinishReasonUnspecified,
    #[serde(other)]
    Other,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::MaxTokens => "MAX_TOKENS",
            Self::Safety => "SAFETY",
            Self::Recitation => "RECITATION",
            Self::Language => "LANGUAGE",
            Self::Blocklist => "BLOCKLIST",
            Self::ProhibitedContent => "PROHIBITED_CONTENT",
            Self::Spii => "SPII",
            Self::MalformedFunctionCall => "MALFORMED_FUNCTION_CALL",
            Self::FinishReasonUnspecified => "FINISH_REASON_UNSPECIFIED",
            Self::Other => "OTHER",
        }
    }

    pub fn is_normal_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CitationMetadata {
    #[serde(default, alias = "citationSources")]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub uri: Option<String>,
    pub license: Option<String>,
    pub title: Option<String>,
    pub start_index: Option<u32>,
    pub end_index: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
    #[serde(default)]
    pub web_search_queries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    pub web: Option<ChunkSource>,
    pub maps: Option<ChunkSource>,
    pub retrieved_context: Option<ChunkSource>,
}

impl GroundingChunk {
    /// The chunk's reference, preferring web over maps over retrieved context.
    pub fn source(&self) -> Option<&ChunkSource> {
        self.web
            .as_ref()
            .or(self.maps.as_ref())
            .or(self.retrieved_context.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChunkSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl ChunkSource {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            title: Some(title.into()),
        }
    }
}
