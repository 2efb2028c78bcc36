//! YouTube player/timed-text client.
//!
//! Track discovery goes through the innertube `player` endpoint, which lists
//! caption tracks with a `baseUrl` each. Track content is fetched from that
//! URL in the `json3` timed-text format.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use ytt_models::{TranscriptDescriptor, TranscriptSegment, VideoId};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::TranscriptProvider;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const DEFAULT_CLIENT_NAME: &str = "WEB";
const DEFAULT_CLIENT_VERSION: &str = "2.20250626.01.00";

/// Configuration for the innertube client.
#[derive(Debug, Clone)]
pub struct InnertubeConfig {
    /// Base URL of the player endpoint host
    pub base_url: String,
    /// Optional API key sent as the `key` query parameter
    pub api_key: Option<String>,
    /// Client name sent in the request context
    pub client_name: String,
    /// Client version sent in the request context
    pub client_version: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for InnertubeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl InnertubeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("INNERTUBE_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("INNERTUBE_API_KEY").ok().filter(|s| !s.is_empty()),
            client_name: std::env::var("INNERTUBE_CLIENT_NAME")
                .unwrap_or_else(|_| DEFAULT_CLIENT_NAME.to_string()),
            client_version: std::env::var("INNERTUBE_CLIENT_VERSION")
                .unwrap_or_else(|_| DEFAULT_CLIENT_VERSION.to_string()),
            timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            ),
        }
    }
}

/// Caption provider backed by YouTube's public web endpoints.
pub struct InnertubeClient {
    http: Client,
    config: InnertubeConfig,
}

impl InnertubeClient {
    /// Create a new client.
    pub fn new(config: InnertubeConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Self::new(InnertubeConfig::from_env())
    }

    async fn player(&self, video_id: &VideoId) -> ProviderResult<PlayerResponse> {
        let url = format!("{}/youtubei/v1/player", self.config.base_url);

        let mut request = self.http.post(&url).query(&[("prettyPrint", "false")]);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let body = json!({
            "context": {
                "client": {
                    "clientName": self.config.client_name,
                    "clientVersion": self.config.client_version,
                    "hl": "en",
                }
            },
            "videoId": video_id.as_str(),
        });

        debug!(video_id = %video_id, "Requesting player response");

        let response = request.json(&body).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::request_failed(format!(
                "player endpoint returned {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ProviderError::invalid_response(format!("player response: {}", e)))
    }
}

#[async_trait]
impl TranscriptProvider for InnertubeClient {
    async fn list_transcripts(&self, video_id: &VideoId) -> ProviderResult<Vec<TranscriptDescriptor>> {
        let player = self.player(video_id).await?;
        descriptors_from_player(video_id, player)
    }

    async fn fetch_segments(&self, descriptor: &TranscriptDescriptor) -> ProviderResult<Vec<TranscriptSegment>> {
        let url = json3_url(&descriptor.source)?;

        debug!(
            video_id = %descriptor.video_id,
            language_code = %descriptor.language_code,
            "Fetching timed text"
        );

        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::request_failed(format!(
                "timedtext endpoint returned {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            warn!(video_id = %descriptor.video_id, "Empty timed text response");
            return Err(ProviderError::invalid_response("empty timedtext response"));
        }

        let parsed: Json3Response = serde_json::from_str(&text)
            .map_err(|e| ProviderError::invalid_response(format!("timedtext response: {}", e)))?;

        Ok(segments_from_json3(parsed))
    }
}

// ============================================================================
// Player response
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    name: Option<TrackName>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl PlayabilityStatus {
    /// `LOGIN_REQUIRED` is also used for private videos; only the bot-check
    /// reason means the caller itself was blocked.
    fn is_bot_check(&self) -> bool {
        self.status == "LOGIN_REQUIRED"
            && self
                .reason
                .as_deref()
                .is_some_and(|reason| reason.to_lowercase().contains("not a bot"))
    }
}

impl CaptionTrack {
    fn display_name(&self) -> String {
        match &self.name {
            Some(TrackName { simple_text: Some(text), .. }) => text.clone(),
            Some(TrackName { runs, .. }) if !runs.is_empty() => {
                runs.iter().map(|run| run.text.as_str()).collect()
            }
            _ => self.language_code.clone(),
        }
    }

    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

fn descriptors_from_player(
    video_id: &VideoId,
    player: PlayerResponse,
) -> ProviderResult<Vec<TranscriptDescriptor>> {
    if let Some(status) = &player.playability_status {
        if status.status != "OK" {
            let reason = status.reason.clone().unwrap_or_else(|| status.status.clone());
            if status.is_bot_check() {
                warn!(video_id = %video_id, reason = %reason, "Player request blocked by bot check");
                return Err(ProviderError::request_failed(format!(
                    "player request blocked: {}",
                    reason
                )));
            }
            return Err(ProviderError::VideoUnavailable(reason));
        }
    }

    let tracks = player
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .map(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(ProviderError::CaptionsDisabled(video_id.to_string()));
    }

    Ok(tracks
        .into_iter()
        .map(|track| TranscriptDescriptor {
            video_id: video_id.clone(),
            language: track.display_name(),
            is_generated: track.is_generated(),
            language_code: track.language_code,
            source: track.base_url,
        })
        .collect())
}

// ============================================================================
// Timed text (json3)
// ============================================================================

#[derive(Debug, Deserialize)]
struct Json3Response {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Point a track locator at the json3 format, replacing any existing `fmt`.
fn json3_url(source: &str) -> ProviderResult<Url> {
    let mut url = Url::parse(source)
        .map_err(|e| ProviderError::invalid_response(format!("bad caption track url: {}", e)))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");

    Ok(url)
}

fn segments_from_json3(response: Json3Response) -> Vec<TranscriptSegment> {
    response
        .events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let text: String = segs.iter().map(|seg| seg.utf8.as_str()).collect();
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                text,
                event.t_start_ms as f64 / 1000.0,
                event.d_duration_ms as f64 / 1000.0,
            ))
        })
        .collect()
}
