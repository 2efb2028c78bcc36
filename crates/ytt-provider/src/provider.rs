//! The provider seam.

use async_trait::async_trait;
use ytt_models::{TranscriptDescriptor, TranscriptSegment, VideoId};

use crate::error::ProviderResult;

/// Upstream source of caption tracks.
///
/// `list_transcripts` reports a missing/private video as
/// [`ProviderError::VideoUnavailable`](crate::ProviderError::VideoUnavailable)
/// and a video without any captions as
/// [`ProviderError::CaptionsDisabled`](crate::ProviderError::CaptionsDisabled).
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// List every caption track the video offers, in provider order.
    async fn list_transcripts(&self, video_id: &VideoId) -> ProviderResult<Vec<TranscriptDescriptor>>;

    /// Fetch the ordered segments of one track.
    async fn fetch_segments(&self, descriptor: &TranscriptDescriptor) -> ProviderResult<Vec<TranscriptSegment>>;
}
