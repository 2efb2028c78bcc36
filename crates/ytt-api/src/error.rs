//! API error types.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::service::TranscriptError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Body returned for every internal failure. The real cause is only logged.
pub const INTERNAL_ERROR_DETAIL: &str =
    "An internal error occurred while fetching the transcript. Please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: {detail}")]
    RateLimited { detail: String, retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TranscriptError> for ApiError {
    fn from(err: TranscriptError) -> Self {
        match err {
            TranscriptError::InvalidInput => Self::bad_request("Invalid video ID or URL provided."),
            TranscriptError::RateLimited {
                retry_after_secs,
                in_window,
                max_requests,
                window_secs,
            } => Self::RateLimited {
                detail: format!(
                    "Rate limit exceeded: {} requests in the last {} minutes (limit: {}). Try again in {} seconds.",
                    in_window,
                    window_secs / 60,
                    max_requests,
                    retry_after_secs
                ),
                retry_after_secs,
            },
            TranscriptError::VideoUnavailable(id) => Self::not_found(format!(
                "Video {} is unavailable, private, or has been removed.",
                id
            )),
            TranscriptError::CaptionsDisabled(id) => {
                Self::not_found(format!("Transcripts are disabled for video {}.", id))
            }
            TranscriptError::NoSuitableTranscript(id) => {
                Self::not_found(format!("No suitable transcript was found for video {}.", id))
            }
            TranscriptError::Internal => Self::internal("transcript provider failure"),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (detail, retry_after) = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => (msg, None),
            ApiError::RateLimited {
                detail,
                retry_after_secs,
            } => (detail, Some(retry_after_secs)),
            // Never expose internal details
            ApiError::Internal(_) => (INTERNAL_ERROR_DETAIL.to_string(), None),
        };

        let mut response = (status, Json(ErrorResponse { detail })).into_response();

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use ytt_models::VideoId;

    use super::*;

    fn id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TranscriptError::InvalidInput, StatusCode::BAD_REQUEST),
            (TranscriptError::VideoUnavailable(id()), StatusCode::NOT_FOUND),
            (TranscriptError::CaptionsDisabled(id()), StatusCode::NOT_FOUND),
            (TranscriptError::NoSuitableTranscript(id()), StatusCode::NOT_FOUND),
            (TranscriptError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
            (
                TranscriptError::RateLimited {
                    retry_after_secs: 5,
                    in_window: 30,
                    max_requests: 30,
                    window_secs: 3600,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_not_found_causes_are_distinguishable() {
        let details: Vec<String> = [
            TranscriptError::VideoUnavailable(id()),
            TranscriptError::CaptionsDisabled(id()),
            TranscriptError::NoSuitableTranscript(id()),
        ]
        .into_iter()
        .map(|err| ApiError::from(err).to_string())
        .collect();

        assert_ne!(details[0], details[1]);
        assert_ne!(details[1], details[2]);
        assert_ne!(details[0], details[2]);
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::from(TranscriptError::RateLimited {
            retry_after_secs: 42,
            in_window: 30,
            max_requests: 30,
            window_secs: 3600,
        })
        .into_response();

        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "42");
    }

    #[test]
    fn test_internal_error_omits_cause() {
        let err = ApiError::internal("reqwest::Error: connection refused at 10.0.0.3");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}
