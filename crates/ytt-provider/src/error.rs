//! Provider error types.

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("Captions disabled for video {0}")]
    CaptionsDisabled(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ProviderError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Short, stable name for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::VideoUnavailable(_) => "video_unavailable",
            ProviderError::CaptionsDisabled(_) => "captions_disabled",
            ProviderError::RequestFailed(_) => "request_failed",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::Network(_) => "network",
        }
    }
}
