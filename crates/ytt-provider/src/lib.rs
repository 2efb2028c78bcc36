//! Caption provider for the transcript service.
//!
//! The service only needs two capabilities from upstream: list the caption
//! tracks a video offers, and fetch the timed segments of one track. Those
//! live behind [`TranscriptProvider`]; [`InnertubeClient`] implements them
//! against YouTube's player and timed-text endpoints.

pub mod error;
pub mod innertube;
pub mod provider;

pub use error::{ProviderError, ProviderResult};
pub use innertube::{InnertubeClient, InnertubeConfig};
pub use provider::TranscriptProvider;
