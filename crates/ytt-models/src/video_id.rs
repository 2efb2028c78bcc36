//! YouTube video identifier validation and resolution.
//!
//! Accepts either a bare 11-character identifier or one of the supported URL
//! shapes and yields the canonical identifier. Resolution is a pure function
//! of its input: no network access, no side effects.
//!
//! Supported URL shapes:
//! - https://www.youtube.com/watch?v=VIDEO_ID
//! - https://www.youtube.com/watch/VIDEO_ID
//! - https://www.youtube.com/embed/VIDEO_ID
//! - https://www.youtube.com/shorts/VIDEO_ID
//! - https://www.youtube.com/VIDEO_ID
//! - https://youtu.be/VIDEO_ID

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Length of every YouTube video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// Path segments that may precede an identifier on youtube.com.
const ID_PATH_PREFIXES: [&str; 3] = ["watch", "embed", "shorts"];

/// Errors produced when validating a raw identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoIdError {
    #[error("video id must be exactly 11 characters, got {0}")]
    InvalidLength(usize),

    #[error("video id contains characters outside [A-Za-z0-9_-]")]
    InvalidCharacters,
}

/// A validated 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Validate a raw identifier.
    pub fn parse(raw: &str) -> Result<Self, VideoIdError> {
        // Char count, so multi-byte input reports a sensible length.
        let len = raw.chars().count();
        if len != VIDEO_ID_LEN {
            return Err(VideoIdError::InvalidLength(len));
        }
        if !raw.chars().all(is_id_char) {
            return Err(VideoIdError::InvalidCharacters);
        }
        Ok(Self(raw.to_string()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VideoId {
    type Error = VideoIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_id(candidate: &str) -> Option<VideoId> {
    VideoId::parse(candidate).ok()
}

/// Resolve free-form user input into a video identifier.
///
/// Returns `None` for unsupported hosts, malformed identifiers and anything
/// that does not parse as an absolute URL.
pub fn resolve_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();

    if let Some(id) = parse_id(input) {
        return Some(id);
    }

    let url = Url::parse(input).ok()?;
    let host = url.host_str()?;

    if host.contains("youtube.com") {
        from_youtube_url(&url)
    } else if host.contains("youtu.be") {
        from_short_url(&url)
    } else {
        None
    }
}

/// youtube.com: `v` query parameter first, then the path.
fn from_youtube_url(url: &Url) -> Option<VideoId> {
    // Blank `v` values are skipped, a later non-blank one still counts.
    let query_id = url
        .query_pairs()
        .find(|(key, value)| key == "v" && !value.is_empty())
        .map(|(_, value)| value.into_owned());

    if let Some(id) = query_id.as_deref().and_then(parse_id) {
        return Some(id);
    }

    let parts: Vec<&str> = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    match parts.as_slice() {
        [single] => parse_id(single),
        [.., prefix, last] if ID_PATH_PREFIXES.contains(prefix) => parse_id(last),
        _ => None,
    }
}

/// youtu.be: the whole path is the identifier.
fn from_short_url(url: &Url) -> Option<VideoId> {
    parse_id(url.path().trim_start_matches('/'))
}
