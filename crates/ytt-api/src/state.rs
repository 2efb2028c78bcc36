//! Application state.

use std::sync::Arc;

use ytt_provider::{InnertubeClient, ProviderResult, TranscriptProvider};

use crate::config::ApiConfig;
use crate::rate_limit::SlidingWindowLimiter;
use crate::service::TranscriptService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    /// Concrete limiter handle, kept for the idle-client sweeper
    pub limiter: Arc<SlidingWindowLimiter>,
    pub transcripts: Arc<TranscriptService>,
}

impl AppState {
    /// Create application state backed by the YouTube provider.
    pub fn new(config: ApiConfig) -> ProviderResult<Self> {
        let provider = InnertubeClient::from_env()?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Create application state around any provider.
    pub fn with_provider(config: ApiConfig, provider: Arc<dyn TranscriptProvider>) -> Self {
        let limiter = Arc::new(SlidingWindowLimiter::new(config.rate_limit));
        let transcripts = TranscriptService::new(
            limiter.clone(),
            provider,
            config.preferred_languages.clone(),
        );

        Self {
            config,
            limiter,
            transcripts: Arc::new(transcripts),
        }
    }
}
