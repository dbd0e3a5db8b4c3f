use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to parse response JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inline data ({mime_type}) is not valid base64: {source}")]
    InlineData {
        mime_type: String,
        #[source]
        source: base64::DecodeError,
    },
}
