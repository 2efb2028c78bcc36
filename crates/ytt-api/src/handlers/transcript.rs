//! Transcript handler.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ytt_models::TranscriptResult;

use crate::error::ApiResult;
use crate::middleware::client_key;
use crate::state::AppState;

/// Request body for `POST /get_transcript`.
#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    /// YouTube URL or bare video ID
    pub video_id: String,
}

/// Successful transcript response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub transcript: String,
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
}

impl From<TranscriptResult> for TranscriptResponse {
    fn from(result: TranscriptResult) -> Self {
        Self {
            transcript: result.text,
            language: result.language,
            language_code: result.language_code,
            is_generated: result.is_generated,
        }
    }
}

/// Fetch the transcript of a video.
///
/// A body that is not a valid `VideoRequest` is handled as empty input, so
/// it still passes through admission before being rejected with 400.
pub async fn get_transcript(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<VideoRequest>, JsonRejection>,
) -> ApiResult<Json<TranscriptResponse>> {
    let key = client_key(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    let raw_input = match payload {
        Ok(Json(request)) => request.video_id,
        Err(rejection) => {
            debug!(client = %key, error = %rejection.body_text(), "Malformed transcript request body");
            String::new()
        }
    };

    let result = state
        .transcripts
        .get_transcript(&raw_input, &key, Instant::now())
        .await?;

    Ok(Json(result.into()))
}
