//! Per-client sliding-window rate limiting.
//!
//! Every client key owns an oldest-first queue of admission timestamps. On
//! each request the queue is pruned of entries that fell out of the trailing
//! window, then the request is admitted only if fewer than `max_requests`
//! remain. Prune, check and append happen under one lock, so concurrent
//! requests for the same key can never be over-admitted.
//!
//! State is process-local. Client keys come from `X-Forwarded-For` when
//! present (see [`crate::middleware::client_key`]), so the service must sit
//! behind a proxy that overwrites that header; otherwise any caller can pick
//! its own key and the limit is trivially bypassed.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::RateLimitConfig;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected {
        /// Seconds until the oldest in-window request expires, plus one
        retry_after_secs: u64,
        /// Requests counted in the current window
        in_window: usize,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Admission control seam. Call sites hold an `Arc<dyn RateLimiter>`.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Decide whether `client_key` may make a request at `now`. An admitted
    /// request consumes a slot that is never given back.
    async fn admit(&self, client_key: &str, now: Instant) -> Admission;

    /// Window length, for messages shown to clients.
    fn window(&self) -> Duration;

    /// Maximum requests per window.
    fn max_requests(&self) -> u32;
}

/// In-memory exact sliding-window limiter.
pub struct SlidingWindowLimiter {
    config: RateLimitConfig,
    clients: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Prune every client and drop the ones left with no timestamps.
    ///
    /// A client with an empty queue and an unknown client are treated the
    /// same by `admit`, so this never changes an admission decision. Returns
    /// the number of clients removed.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut clients = self.clients.lock().await;
        let before = clients.len();

        clients.retain(|_, timestamps| {
            prune(timestamps, now, self.config.window);
            !timestamps.is_empty()
        });

        before - clients.len()
    }

    /// Number of tracked client keys.
    pub async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn admit(&self, client_key: &str, now: Instant) -> Admission {
        let mut clients = self.clients.lock().await;
        let timestamps = clients.entry(client_key.to_string()).or_default();

        prune(timestamps, now, self.config.window);

        if timestamps.len() >= self.config.max_requests as usize {
            // Non-empty here: max_requests is at least 1.
            let window = self.config.window;
            let retry_after_secs = timestamps
                .front()
                .map(|oldest| match oldest.checked_add(window) {
                    Some(expiry) => expiry.saturating_duration_since(now).as_secs(),
                    // Expiry past what Instant can represent
                    None => window.as_secs(),
                })
                .unwrap_or(0)
                .saturating_add(1);

            return Admission::Rejected {
                retry_after_secs,
                in_window: timestamps.len(),
            };
        }

        timestamps.push_back(now);
        Admission::Admitted
    }

    fn window(&self) -> Duration {
        self.config.window
    }

    fn max_requests(&self) -> u32 {
        self.config.max_requests
    }
}

/// Drop timestamps at or before `now - window`.
fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = timestamps.front() {
        if now.saturating_duration_since(*oldest) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}
