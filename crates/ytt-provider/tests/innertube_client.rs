//! InnertubeClient against a fake player/timedtext server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytt_models::VideoId;
use ytt_provider::{InnertubeClient, InnertubeConfig, ProviderError, TranscriptProvider};

fn client_for(server: &MockServer) -> InnertubeClient {
    InnertubeClient::new(InnertubeConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        timeout: Duration::from_secs(5),
        ..InnertubeConfig::default()
    })
    .unwrap()
}

fn video_id() -> VideoId {
    VideoId::parse("dQw4w9WgXcQ").unwrap()
}

async fn mount_player(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/player"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({ "videoId": "dQw4w9WgXcQ" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_lists_and_fetches_tracks() {
    let server = MockServer::start().await;
    let track_url = format!("{}/api/timedtext?v=dQw4w9WgXcQ&lang=es", server.uri());

    mount_player(
        &server,
        json!({
            "playabilityStatus": { "status": "OK" },
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [
                        { "baseUrl": track_url, "name": { "simpleText": "Spanish" }, "languageCode": "es" }
                    ]
                }
            }
        }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("lang", "es"))
        .and(query_param("fmt", "json3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [
                { "tStartMs": 0, "dDurationMs": 1500, "segs": [{ "utf8": "Hola" }] },
                { "tStartMs": 1500, "dDurationMs": 1500, "segs": [{ "utf8": "a todos" }] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let descriptors = client.list_transcripts(&video_id()).await.unwrap();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].language_code, "es");
    assert!(!descriptors[0].is_generated);

    let segments = client.fetch_segments(&descriptors[0]).await.unwrap();
    let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Hola", "a todos"]);
    assert_eq!(segments[1].start, 1.5);
}

#[tokio::test]
async fn test_private_video_is_unavailable() {
    let server = MockServer::start().await;
    mount_player(
        &server,
        json!({ "playabilityStatus": { "status": "LOGIN_REQUIRED", "reason": "This video is private" } }),
    )
    .await;

    let err = client_for(&server).list_transcripts(&video_id()).await.unwrap_err();
    assert!(matches!(err, ProviderError::VideoUnavailable(_)));
}

#[tokio::test]
async fn test_bot_check_is_request_failure() {
    let server = MockServer::start().await;
    mount_player(
        &server,
        json!({
            "playabilityStatus": {
                "status": "LOGIN_REQUIRED",
                "reason": "Sign in to confirm you're not a bot"
            }
        }),
    )
    .await;

    let err = client_for(&server).list_transcripts(&video_id()).await.unwrap_err();
    assert!(matches!(err, ProviderError::RequestFailed(_)));
}

#[tokio::test]
async fn test_video_without_captions_is_disabled() {
    let server = MockServer::start().await;
    mount_player(&server, json!({ "playabilityStatus": { "status": "OK" } })).await;

    let err = client_for(&server).list_transcripts(&video_id()).await.unwrap_err();
    assert!(matches!(err, ProviderError::CaptionsDisabled(id) if id == "dQw4w9WgXcQ"));
}

#[tokio::test]
async fn test_upstream_error_status_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/player"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).list_transcripts(&video_id()).await.unwrap_err();
    assert!(matches!(err, ProviderError::RequestFailed(_)));
}

#[tokio::test]
async fn test_non_json_player_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/player"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>consent</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_transcripts(&video_id()).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_empty_timedtext_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let descriptor = ytt_models::TranscriptDescriptor {
        video_id: video_id(),
        language: "English".to_string(),
        language_code: "en".to_string(),
        is_generated: true,
        source: format!("{}/api/timedtext?v=dQw4w9WgXcQ&lang=en&kind=asr", server.uri()),
    };

    let err = client_for(&server).fetch_segments(&descriptor).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}
