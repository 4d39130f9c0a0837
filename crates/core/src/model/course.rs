use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::{CourseId, SentenceId};
use crate::model::sentence::{AudioRef, Sentence, SentenceError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course locale cannot be empty")]
    EmptyLocale,

    #[error("course must contain at least one sentence")]
    NoSentences,

    #[error("duplicate sentence id {0} in course")]
    DuplicateSentenceId(SentenceId),

    #[error(transparent)]
    InvalidSentence(#[from] SentenceError),
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Ordered sequence of sentences for one practice scenario.
///
/// Order is meaningful: it defines the navigation sequence. A course is
/// immutable once constructed; the session layer only borrows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    locale: String,
    sentences: Vec<Sentence>,
    created_at: DateTime<Utc>,
}

impl Course {
    /// Creates a course after validating title, locale, and sentence IDs.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the title or locale is blank, the sentence
    /// list is empty, or two sentences share an ID.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        locale: impl Into<String>,
        sentences: Vec<Sentence>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        let locale = locale.into();
        if locale.trim().is_empty() {
            return Err(CourseError::EmptyLocale);
        }
        if sentences.is_empty() {
            return Err(CourseError::NoSentences);
        }

        let mut seen = HashSet::with_capacity(sentences.len());
        for sentence in &sentences {
            if !seen.insert(sentence.id()) {
                return Err(CourseError::DuplicateSentenceId(sentence.id()));
            }
        }

        Ok(Self {
            id,
            title,
            locale,
            sentences,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Locale tag handed to the speech engine (e.g. `fr-FR`).
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[must_use]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Number of sentences in the course; always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    #[must_use]
    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Wire shape of a generated sentence before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct SentenceDraft {
    pub reference_text: String,
    pub display_text: String,
    pub audio_ref: String,
}

/// Wire shape of a generated course before validation.
///
/// Produced by the external generation pipeline; `into_course` is the only
/// way drafts enter the domain.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseDraft {
    pub title: String,
    pub locale: String,
    pub sentences: Vec<SentenceDraft>,
}

impl CourseDraft {
    /// Validates the draft into a domain `Course`, assigning sentence IDs
    /// sequentially from 1 in draft order.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` for blank title/locale, an empty sentence list,
    /// or a sentence with empty reference text.
    pub fn into_course(
        self,
        id: CourseId,
        created_at: DateTime<Utc>,
    ) -> Result<Course, CourseError> {
        let mut sentences = Vec::with_capacity(self.sentences.len());
        for (position, draft) in self.sentences.into_iter().enumerate() {
            sentences.push(Sentence::new(
                SentenceId::new(position as u64 + 1),
                draft.reference_text,
                draft.display_text,
                AudioRef::new(draft.audio_ref),
            )?);
        }

        Course::new(id, self.title, self.locale, sentences, created_at)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
