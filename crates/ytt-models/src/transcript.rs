//! Transcript models.

use serde::{Deserialize, Serialize};

use crate::video_id::VideoId;

/// One caption track available for a video, without its text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptDescriptor {
    /// Video the track belongs to
    pub video_id: VideoId,
    /// Human-readable language name (e.g. "Spanish (auto-generated)")
    pub language: String,
    /// Short language code (e.g. "es")
    pub language_code: String,
    /// Machine-generated (ASR) rather than human-authored
    pub is_generated: bool,
    /// Provider-specific locator used to fetch this track's segments
    pub source: String,
}

/// A timed piece of caption text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Start offset in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// The selected track's metadata plus its full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub text: String,
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
}

impl TranscriptResult {
    /// Join segment texts, in order, with single spaces.
    pub fn from_segments(descriptor: &TranscriptDescriptor, segments: &[TranscriptSegment]) -> Self {
        let text = segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            text,
            language: descriptor.language.clone(),
            language_code: descriptor.language_code.clone(),
            is_generated: descriptor.is_generated,
        }
    }
}
