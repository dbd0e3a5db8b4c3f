use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::ResponseError;

/// One typed fragment of a candidate's content.
///
/// The wire format is a flat object with at most one payload field set; it is resolved into a
/// variant once at deserialization time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WirePart")]
pub enum Part {
    Text(String),
    /// Reasoning trace; a text part flagged with `"thought": true`.
    Thought(String),
    InlineData(Blob),
    ExecutableCode {
        language: String,
        code: String,
    },
    CodeExecutionResult {
        outcome: Outcome,
        output: String,
    },
    FileData {
        mime_type: String,
        file_uri: String,
    },
    /// Function calls and payload kinds this client does not render.
    Unsupported,
}

impl Part {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn thought(value: impl Into<String>) -> Self {
        Self::Thought(value.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    #[serde(default)]
    pub mime_type: String,
    /// Base64 payload, kept encoded until a sink asks for the bytes.
    #[serde(default)]
    pub data: String,
}

impl Blob {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, ResponseError> {
        STANDARD
            .decode(self.data.trim())
            .map_err(|source| ResponseError::InlineData {
                mime_type: self.mime_type.clone(),
                source,
            })
    }
}

/// Status reported alongside code-execution output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Outcome {
    #[serde(rename = "OUTCOME_OK")]
    Ok,
    #[serde(rename = "OUTCOME_FAILED")]
    Failed,
    #[serde(rename = "OUTCOME_DEADLINE_EXCEEDED")]
    DeadlineExceeded,
    #[default]
    #[serde(rename = "OUTCOME_UNSPECIFIED")]
    #[serde(other)]
    Unspecified,
}

impl Outcome {
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OUTCOME_OK",
            Self::Failed => "OUTCOME_FAILED",
            Self::DeadlineExceeded => "OUTCOME_DEADLINE_EXCEEDED",
            Self::Unspecified => "OUTCOME_UNSPECIFIED",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    inline_data: Option<Blob>,
    executable_code: Option<WireExecutableCode>,
    code_execution_result: Option<WireCodeExecutionResult>,
    file_data: Option<WireFileData>,
}

#[derive(Debug, Deserialize)]
struct WireExecutableCode {
    #[serde(default)]
    language: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct WireCodeExecutionResult {
    #[serde(default)]
    outcome: Outcome,
    #[serde(default)]
    output: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFileData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    file_uri: String,
}

impl From<WirePart> for Part {
    fn from(wire: WirePart) -> Self {
        if let Some(text) = wire.text {
            return if wire.thought {
                Part::Thought(text)
            } else {
                Part::Text(text)
            };
        }
        if let Some(blob) = wire.inline_data {
            return Part::InlineData(blob);
        }
        if let Some(code) = wire.executable_code {
            return Part::ExecutableCode {
                language: code.language,
                code: code.code,
            };
        }
        if let Some(result) = wire.code_execution_result {
            return Part::CodeExecutionResult {
                outcome: result.outcome,
                output: result.output,
            };
        }
        if let Some(file) = wire.file_data {
            return Part::FileData {
                mime_type: file.mime_type,
                file_uri: file.file_uri,
            };
        }
        Part::Unsupported
    }
}
