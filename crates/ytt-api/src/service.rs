//! Transcript orchestration.
//!
//! admit -> resolve -> list tracks -> select -> fetch -> join. Admission and
//! resolution short-circuit before the provider is touched. Every provider
//! failure is classified here; nothing past this point sees a provider error.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{error, info, warn};
use ytt_models::{resolve_video_id, select_transcript, TranscriptResult, VideoId};
use ytt_provider::{ProviderError, TranscriptProvider};

use crate::metrics;
use crate::rate_limit::{Admission, RateLimiter};

/// Classified outcome of a failed transcript request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("Invalid video ID or URL")]
    InvalidInput,

    #[error("Rate limit exceeded: {in_window} requests in the last {window_secs}s (limit {max_requests})")]
    RateLimited {
        retry_after_secs: u64,
        in_window: usize,
        max_requests: u32,
        window_secs: u64,
    },

    #[error("Video {0} is unavailable")]
    VideoUnavailable(VideoId),

    #[error("Captions are disabled for video {0}")]
    CaptionsDisabled(VideoId),

    #[error("No suitable transcript for video {0}")]
    NoSuitableTranscript(VideoId),

    #[error("Internal error")]
    Internal,
}

impl TranscriptError {
    /// Metric label for the outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            TranscriptError::InvalidInput => "invalid_input",
            TranscriptError::RateLimited { .. } => "rate_limited",
            TranscriptError::VideoUnavailable(_) => "video_unavailable",
            TranscriptError::CaptionsDisabled(_) => "captions_disabled",
            TranscriptError::NoSuitableTranscript(_) => "no_suitable_transcript",
            TranscriptError::Internal => "internal_error",
        }
    }
}

/// Composes the limiter, the resolver, the selector and the provider.
pub struct TranscriptService {
    limiter: Arc<dyn RateLimiter>,
    provider: Arc<dyn TranscriptProvider>,
    preferred_languages: Vec<String>,
}

impl TranscriptService {
    pub fn new(
        limiter: Arc<dyn RateLimiter>,
        provider: Arc<dyn TranscriptProvider>,
        preferred_languages: Vec<String>,
    ) -> Self {
        Self {
            limiter,
            provider,
            preferred_languages,
        }
    }

    /// Produce the transcript for `raw_input` on behalf of `client_key`.
    pub async fn get_transcript(
        &self,
        raw_input: &str,
        client_key: &str,
        now: Instant,
    ) -> Result<TranscriptResult, TranscriptError> {
        let outcome = self.run(raw_input, client_key, now).await;
        metrics::record_transcript_outcome(match &outcome {
            Ok(_) => "served",
            Err(e) => e.kind(),
        });
        outcome
    }

    async fn run(&self, raw_input: &str, client_key: &str, now: Instant) -> Result<TranscriptResult, TranscriptError> {
        if let Admission::Rejected {
            retry_after_secs,
            in_window,
        } = self.limiter.admit(client_key, now).await
        {
            warn!(
                client = %client_key,
                in_window,
                retry_after_secs,
                "Rate limit exceeded"
            );
            metrics::record_rate_limit_hit("/get_transcript");
            return Err(TranscriptError::RateLimited {
                retry_after_secs,
                in_window,
                max_requests: self.limiter.max_requests(),
                window_secs: self.limiter.window().as_secs(),
            });
        }

        let Some(video_id) = resolve_video_id(raw_input) else {
            info!(client = %client_key, "Rejected unresolvable video reference");
            return Err(TranscriptError::InvalidInput);
        };

        // Timed on every exit so failed and slow upstream calls are measured too
        let started = Instant::now();
        let outcome = self.fetch_selected(video_id).await;
        metrics::record_provider_duration(started.elapsed());
        outcome
    }

    async fn fetch_selected(&self, video_id: VideoId) -> Result<TranscriptResult, TranscriptError> {
        let descriptors = match self.provider.list_transcripts(&video_id).await {
            Ok(descriptors) => descriptors,
            Err(e) => return Err(classify(&video_id, e)),
        };

        let Some(selection) = select_transcript(&descriptors, &self.preferred_languages) else {
            info!(
                video_id = %video_id,
                available = descriptors.len(),
                "No suitable transcript"
            );
            return Err(TranscriptError::NoSuitableTranscript(video_id));
        };

        info!(
            video_id = %video_id,
            language_code = %selection.descriptor.language_code,
            is_generated = selection.descriptor.is_generated,
            tier = %selection.tier,
            "Selected transcript"
        );
        metrics::record_selection_tier(selection.tier.as_str());

        let segments = match self.provider.fetch_segments(selection.descriptor).await {
            Ok(segments) => segments,
            Err(e) => return Err(classify(&video_id, e)),
        };

        Ok(TranscriptResult::from_segments(selection.descriptor, &segments))
    }
}

/// Map a provider failure onto the outcome taxonomy, logging the real cause.
fn classify(video_id: &VideoId, err: ProviderError) -> TranscriptError {
    match err {
        ProviderError::VideoUnavailable(reason) => {
            info!(video_id = %video_id, reason = %reason, "Video unavailable");
            TranscriptError::VideoUnavailable(video_id.clone())
        }
        ProviderError::CaptionsDisabled(_) => {
            info!(video_id = %video_id, "Captions disabled");
            TranscriptError::CaptionsDisabled(video_id.clone())
        }
        other => {
            error!(
                video_id = %video_id,
                kind = other.kind(),
                error = %other,
                "Unexpected provider failure"
            );
            TranscriptError::Internal
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use mockall::mock;
    use ytt_models::{TranscriptDescriptor, TranscriptSegment};
    use ytt_provider::ProviderResult;

    use super::*;
    use crate::config::RateLimitConfig;
    use crate::rate_limit::SlidingWindowLimiter;

    mock! {
        pub Provider {}

        #[async_trait]
        impl TranscriptProvider for Provider {
            async fn list_transcripts(&self, video_id: &VideoId) -> ProviderResult<Vec<TranscriptDescriptor>>;
            async fn fetch_segments(&self, descriptor: &TranscriptDescriptor) -> ProviderResult<Vec<TranscriptSegment>>;
        }
    }

    const ID: &str = "dQw4w9WgXcQ";

    fn track(code: &str, generated: bool) -> TranscriptDescriptor {
        TranscriptDescriptor {
            video_id: VideoId::parse(ID).unwrap(),
            language: format!("lang-{code}"),
            language_code: code.to_string(),
            is_generated: generated,
            source: format!("track://{code}"),
        }
    }

    fn service(provider: MockProvider, max_requests: u32) -> TranscriptService {
        let limiter = SlidingWindowLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        });
        TranscriptService::new(
            Arc::new(limiter),
            Arc::new(provider),
            vec!["es".to_string(), "en".to_string()],
        )
    }

    #[tokio::test]
    async fn test_serves_selected_track() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_transcripts()
            .times(1)
            .returning(|_| Ok(vec![track("en", true), track("es", false)]));
        provider
            .expect_fetch_segments()
            .withf(|d| d.language_code == "es" && !d.is_generated)
            .times(1)
            .returning(|_| {
                Ok(vec![
                    TranscriptSegment::new("Hola", 0.0, 1.0),
                    TranscriptSegment::new("mundo", 1.0, 1.0),
                ])
            });

        let result = service(provider, 5)
            .get_transcript(&format!("https://youtu.be/{ID}"), "client", Instant::now())
            .await
            .unwrap();

        assert_eq!(result.text, "Hola mundo");
        assert_eq!(result.language_code, "es");
        assert!(!result.is_generated);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_provider() {
        let mut provider = MockProvider::new();
        provider.expect_list_transcripts().never();
        provider.expect_fetch_segments().never();

        let err = service(provider, 5)
            .get_transcript("!!!", "client", Instant::now())
            .await
            .unwrap_err();

        assert_eq!(err, TranscriptError::InvalidInput);
    }

    #[tokio::test]
    async fn test_rate_limit_short_circuits_before_resolution() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_transcripts()
            .times(1)
            .returning(|_| Ok(vec![track("es", false)]));
        provider
            .expect_fetch_segments()
            .times(1)
            .returning(|_| Ok(vec![TranscriptSegment::new("hola", 0.0, 1.0)]));

        let service = service(provider, 1);
        let now = Instant::now();

        service.get_transcript(ID, "client", now).await.unwrap();

        // Second call is rejected even with invalid input: admission comes first.
        let err = service.get_transcript("!!!", "client", now).await.unwrap_err();
        assert!(matches!(
            err,
            TranscriptError::RateLimited {
                retry_after_secs: 61,
                in_window: 1,
                max_requests: 1,
                window_secs: 60
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_consumes_a_slot() {
        let mut provider = MockProvider::new();
        provider.expect_list_transcripts().never();

        let service = service(provider, 1);
        let now = Instant::now();

        assert_eq!(
            service.get_transcript("nope", "client", now).await.unwrap_err(),
            TranscriptError::InvalidInput
        );
        assert!(matches!(
            service.get_transcript("nope", "client", now).await.unwrap_err(),
            TranscriptError::RateLimited { .. }
        ));
    }

    #[tokio::test]
    async fn test_classifies_provider_not_found_causes() {
        let cases: Vec<(ProviderError, TranscriptError)> = vec![
            (
                ProviderError::VideoUnavailable("This video is private".to_string()),
                TranscriptError::VideoUnavailable(VideoId::parse(ID).unwrap()),
            ),
            (
                ProviderError::CaptionsDisabled(ID.to_string()),
                TranscriptError::CaptionsDisabled(VideoId::parse(ID).unwrap()),
            ),
        ];

        for (provider_error, expected) in cases {
            let mut provider = MockProvider::new();
            let mut provider_error = Some(provider_error);
            provider
                .expect_list_transcripts()
                .times(1)
                .returning(move |_| Err(provider_error.take().unwrap()));
            provider.expect_fetch_segments().never();

            let err = service(provider, 5)
                .get_transcript(ID, "client", Instant::now())
                .await
                .unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[tokio::test]
    async fn test_empty_track_list_is_no_suitable_transcript() {
        let mut provider = MockProvider::new();
        provider.expect_list_transcripts().returning(|_| Ok(Vec::new()));
        provider.expect_fetch_segments().never();

        let err = service(provider, 5)
            .get_transcript(ID, "client", Instant::now())
            .await
            .unwrap_err();

        assert_eq!(err, TranscriptError::NoSuitableTranscript(VideoId::parse(ID).unwrap()));
    }

    #[tokio::test]
    async fn test_unexpected_failures_are_internal() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|_| Ok(vec![track("es", false)]));
        provider
            .expect_fetch_segments()
            .returning(|_| Err(ProviderError::request_failed("timedtext endpoint returned 500")));

        let err = service(provider, 5)
            .get_transcript(ID, "client", Instant::now())
            .await
            .unwrap_err();

        assert_eq!(err, TranscriptError::Internal);
        assert!(!err.to_string().contains("timedtext"));
    }

    #[test]
    fn test_provider_duration_recorded_on_failure() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let mut provider = MockProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|_| Err(ProviderError::request_failed("player endpoint returned 503")));
        let service = service(provider, 5);

        let err = ::metrics::with_local_recorder(&recorder, || {
            runtime.block_on(service.get_transcript(ID, "client", Instant::now()))
        })
        .unwrap_err();

        assert_eq!(err, TranscriptError::Internal);
        assert!(handle
            .render()
            .contains("ytt_provider_duration_seconds_count 1"));
    }
}
