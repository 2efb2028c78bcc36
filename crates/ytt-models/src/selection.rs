//! Transcript selection policy.
//!
//! Picks exactly one track out of the set a video offers. The tiers are tried
//! in order and the first one that yields a track wins:
//!
//! 1. human-authored track in a preferred language (first preference first)
//! 2. machine-generated track in a preferred language
//! 3. any human-authored track, `en` first
//! 4. any machine-generated track, `en` first
//!
//! Within a tier, the first-encountered track for a language code wins, so
//! the result is stable for a given descriptor order.

use crate::transcript::TranscriptDescriptor;

/// Preference order used when none is configured. Spanish first.
pub const DEFAULT_PREFERRED_LANGUAGES: [&str; 2] = ["es", "en"];

/// Language favoured by the fallback tiers.
const FALLBACK_LANGUAGE: &str = "en";

/// The rule that produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionTier {
    ManualPreferred,
    GeneratedPreferred,
    ManualFallback,
    GeneratedFallback,
}

impl SelectionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionTier::ManualPreferred => "manual_preferred",
            SelectionTier::GeneratedPreferred => "generated_preferred",
            SelectionTier::ManualFallback => "manual_fallback",
            SelectionTier::GeneratedFallback => "generated_fallback",
        }
    }
}

impl std::fmt::Display for SelectionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected descriptor and the tier that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub descriptor: &'a TranscriptDescriptor,
    pub tier: SelectionTier,
}

/// Select the best transcript for the given preference list.
///
/// Returns `None` when the set is empty or no tier matches.
pub fn select_transcript<'a, S: AsRef<str>>(
    descriptors: &'a [TranscriptDescriptor],
    preferred_languages: &[S],
) -> Option<Selection<'a>> {
    manual_preferred(descriptors, preferred_languages)
        .map(|d| (d, SelectionTier::ManualPreferred))
        .or_else(|| {
            generated_preferred(descriptors, preferred_languages)
                .map(|d| (d, SelectionTier::GeneratedPreferred))
        })
        .or_else(|| manual_fallback(descriptors).map(|d| (d, SelectionTier::ManualFallback)))
        .or_else(|| generated_fallback(descriptors).map(|d| (d, SelectionTier::GeneratedFallback)))
        .map(|(descriptor, tier)| Selection { descriptor, tier })
}

/// Tier 1: human-authored track matching the preference list.
pub fn manual_preferred<'a, S: AsRef<str>>(
    descriptors: &'a [TranscriptDescriptor],
    preferred_languages: &[S],
) -> Option<&'a TranscriptDescriptor> {
    find_preferred(descriptors, preferred_languages, false)
}

/// Tier 2: machine-generated track matching the preference list.
pub fn generated_preferred<'a, S: AsRef<str>>(
    descriptors: &'a [TranscriptDescriptor],
    preferred_languages: &[S],
) -> Option<&'a TranscriptDescriptor> {
    find_preferred(descriptors, preferred_languages, true)
}

/// Tier 3: any human-authored track.
pub fn manual_fallback(descriptors: &[TranscriptDescriptor]) -> Option<&TranscriptDescriptor> {
    find_fallback(descriptors, false)
}

/// Tier 4: any machine-generated track.
pub fn generated_fallback(descriptors: &[TranscriptDescriptor]) -> Option<&TranscriptDescriptor> {
    find_fallback(descriptors, true)
}

fn find_preferred<'a, S: AsRef<str>>(
    descriptors: &'a [TranscriptDescriptor],
    preferred_languages: &[S],
    generated: bool,
) -> Option<&'a TranscriptDescriptor> {
    preferred_languages.iter().find_map(|code| {
        descriptors
            .iter()
            .find(|d| d.is_generated == generated && d.language_code == code.as_ref())
    })
}

fn find_fallback(descriptors: &[TranscriptDescriptor], generated: bool) -> Option<&TranscriptDescriptor> {
    let mut candidates = descriptors.iter().filter(|d| d.is_generated == generated);

    candidates
        .clone()
        .find(|d| d.language_code == FALLBACK_LANGUAGE)
        .or_else(|| candidates.next())
}
