/// Errors raised while decoding API payloads.
///
/// Only a body that is not JSON at all (or not the expected top-level shape)
/// is an error. Missing or malformed fields inside a valid body decode to
/// defaults instead.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected payload shape: {0}")]
    Shape(String),
}
