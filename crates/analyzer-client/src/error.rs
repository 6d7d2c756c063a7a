use analyzer_protocol::ProtocolError;

/// Errors from report API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(#[from] ProtocolError),

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
