use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::SentenceId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SentenceError {
    #[error("reference text cannot be empty")]
    EmptyReference,
}

/// Opaque handle to a reference-audio asset.
///
/// The core never interprets the value; the playback engine resolves it to an
/// actual asset (file path, bundle key, URL, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioRef(String);

impl AudioRef {
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable practice unit of a course.
///
/// `reference_text` is the target-language string a spoken attempt is graded
/// against; `display_text` is the source-language gloss and is never graded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    id: SentenceId,
    reference_text: String,
    display_text: String,
    audio_ref: AudioRef,
}

impl Sentence {
    /// Creates a sentence after validating the reference text.
    ///
    /// # Errors
    ///
    /// Returns `SentenceError::EmptyReference` if the reference text is empty
    /// or whitespace-only.
    pub fn new(
        id: SentenceId,
        reference_text: impl Into<String>,
        display_text: impl Into<String>,
        audio_ref: AudioRef,
    ) -> Result<Self, SentenceError> {
        let reference_text = reference_text.into();
        if reference_text.trim().is_empty() {
            return Err(SentenceError::EmptyReference);
        }

        Ok(Self {
            id,
            reference_text,
            display_text: display_text.into(),
            audio_ref,
        })
    }

    #[must_use]
    pub fn id(&self) -> SentenceId {
        self.id
    }

    #[must_use]
    pub fn reference_text(&self) -> &str {
        &self.reference_text
    }

    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    #[must_use]
    pub fn audio_ref(&self) -> &AudioRef {
        &self.audio_ref
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_exposes_fields() {
        let sentence = Sentence::new(
            SentenceId::new(1),
            "Bonjour, comment ça va ?",
            "Hello, how are you?",
            AudioRef::new("audio/1.m4a"),
        )
        .unwrap();

        assert_eq!(sentence.id(), SentenceId::new(1));
        assert_eq!(sentence.reference_text(), "Bonjour, comment ça va ?");
        assert_eq!(sentence.display_text(), "Hello, how are you?");
        assert_eq!(sentence.audio_ref().as_str(), "audio/1.m4a");
    }

    #[test]
    fn empty_reference_is_rejected() {
        let err = Sentence::new(
            SentenceId::new(1),
            "   ",
            "gloss",
            AudioRef::new("audio/1.m4a"),
        )
        .unwrap_err();
        assert_eq!(err, SentenceError::EmptyReference);
    }

    #[test]
    fn empty_gloss_is_allowed() {
        let sentence = Sentence::new(SentenceId::new(2), "Merci", "", AudioRef::new("a"));
        assert!(sentence.is_ok());
    }
}
