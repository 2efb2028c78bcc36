//! Shared data models for the transcript service.
//!
//! This crate provides:
//! - Video identifier validation and URL resolution
//! - Transcript descriptors, segments and results
//! - The deterministic transcript selection policy

pub mod selection;
pub mod transcript;
pub mod video_id;

// Re-export common types
pub use selection::{select_transcript, Selection, SelectionTier, DEFAULT_PREFERRED_LANGUAGES};
pub use transcript::{TranscriptDescriptor, TranscriptResult, TranscriptSegment};
pub use video_id::{resolve_video_id, VideoId, VideoIdError, VIDEO_ID_LEN};
