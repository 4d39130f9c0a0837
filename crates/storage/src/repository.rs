use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use ditto_core::model::{
    AudioRef, Course, CourseError, CourseId, LearnerProfile, ProfileError, Sentence, SentenceError,
    SentenceId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<CourseError> for StorageError {
    fn from(err: CourseError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<SentenceError> for StorageError {
    fn from(err: SentenceError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<ProfileError> for StorageError {
    fn from(err: ProfileError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Persisted shape of a sentence row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub id: SentenceId,
    pub position: u32,
    pub reference_text: String,
    pub display_text: String,
    pub audio_ref: String,
}

/// Persisted shape of a course with its ordered sentences.
///
/// This mirrors the domain `Course` so repositories can serialize and
/// deserialize without leaking storage concerns into the domain layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: CourseId,
    pub title: String,
    pub locale: String,
    pub created_at: DateTime<Utc>,
    pub sentences: Vec<SentenceRecord>,
}

impl CourseRecord {
    #[must_use]
    pub fn from_course(course: &Course) -> Self {
        let sentences = course
            .sentences()
            .iter()
            .enumerate()
            .map(|(position, sentence)| SentenceRecord {
                id: sentence.id(),
                position: position as u32,
                reference_text: sentence.reference_text().to_owned(),
                display_text: sentence.display_text().to_owned(),
                audio_ref: sentence.audio_ref().as_str().to_owned(),
            })
            .collect();

        Self {
            id: course.id(),
            title: course.title().to_owned(),
            locale: course.locale().to_owned(),
            created_at: course.created_at(),
            sentences,
        }
    }

    /// Convert the record back into a domain `Course`.
    ///
    /// Sentences are reordered by their persisted position first, so callers
    /// do not depend on row order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if domain validation fails.
    pub fn into_course(mut self) -> Result<Course, StorageError> {
        self.sentences.sort_by_key(|record| record.position);

        let mut sentences = Vec::with_capacity(self.sentences.len());
        for record in self.sentences {
            sentences.push(Sentence::new(
                record.id,
                record.reference_text,
                record.display_text,
                AudioRef::new(record.audio_ref),
            )?);
        }

        Ok(Course::new(
            self.id,
            self.title,
            self.locale,
            sentences,
            self.created_at,
        )?)
    }
}

/// Insert shape for a course whose ID the backend allocates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRecord {
    pub title: String,
    pub locale: String,
    pub created_at: DateTime<Utc>,
    pub sentences: Vec<SentenceRecord>,
}

impl NewCourseRecord {
    #[must_use]
    pub fn from_course(course: &Course) -> Self {
        let record = CourseRecord::from_course(course);
        Self {
            title: record.title,
            locale: record.locale,
            created_at: record.created_at,
            sentences: record.sentences,
        }
    }
}

/// Persisted shape of the single learner profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub language: String,
    pub proficiency: String,
    pub context: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    #[must_use]
    pub fn from_profile(profile: &LearnerProfile, updated_at: DateTime<Utc>) -> Self {
        Self {
            language: profile.language().to_owned(),
            proficiency: profile.proficiency().as_str().to_owned(),
            context: profile.context().map(ToOwned::to_owned),
            updated_at,
        }
    }

    /// Convert the record back into a domain `LearnerProfile`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for an unknown proficiency value
    /// or an empty language.
    pub fn into_profile(self) -> Result<LearnerProfile, StorageError> {
        let proficiency = self
            .proficiency
            .parse()
            .map_err(|e: ditto_core::model::ParseProficiencyError| {
                StorageError::Serialization(e.to_string())
            })?;
        Ok(LearnerProfile::new(self.language, proficiency, self.context)?)
    }
}

//
// ─── REPOSITORY TRAITS ─────────────────────────────────────────────────────────
//

/// Repository contract for the single learner profile.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Persist or replace the learner profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn save_profile(&self, record: &ProfileRecord) -> Result<(), StorageError>;

    /// Fetch the learner profile, if one has been saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_profile(&self) -> Result<Option<ProfileRecord>, StorageError>;
}

/// Repository contract for generated courses.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist a new course, allocating its ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn insert_course(&self, course: NewCourseRecord) -> Result<CourseId, StorageError>;

    /// Fetch a course by ID with its sentences in navigation order.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures or validation failures.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// List courses ordered by ID, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    profile: Arc<Mutex<Option<ProfileRecord>>>,
    courses: Arc<Mutex<BTreeMap<u64, CourseRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn save_profile(&self, record: &ProfileRecord) -> Result<(), StorageError> {
        let mut guard = self
            .profile
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }

    async fn get_profile(&self) -> Result<Option<ProfileRecord>, StorageError> {
        let guard = self
            .profile
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn insert_course(&self, course: NewCourseRecord) -> Result<CourseId, StorageError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let next = guard.keys().next_back().map_or(1, |id| id + 1);
        guard.insert(
            next,
            CourseRecord {
                id: CourseId::new(next),
                title: course.title,
                locale: course.locale,
                created_at: course.created_at,
                sentences: course.sentences,
            },
        );
        Ok(CourseId::new(next))
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.get(&id.value()) {
            Some(record) => record.clone().into_course().map(Some),
            None => Ok(None),
        }
    }

    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .values()
            .take(limit as usize)
            .map(|record| record.clone().into_course())
            .collect()
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub profiles: Arc<dyn ProfileRepository>,
    pub courses: Arc<dyn CourseRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let courses: Arc<dyn CourseRepository> = Arc::new(repo);
        Self { profiles, courses }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use ditto_core::model::ProficiencyLevel;
    use ditto_core::time::fixed_now;

    fn build_course(id: u64) -> Course {
        let sentences = vec![
            Sentence::new(
                SentenceId::new(1),
                "Bonjour",
                "Hello",
                AudioRef::new("audio/1.m4a"),
            )
            .unwrap(),
            Sentence::new(
                SentenceId::new(2),
                "Merci",
                "Thanks",
                AudioRef::new("audio/2.m4a"),
            )
            .unwrap(),
        ];
        Course::new(CourseId::new(id), "Greetings", "fr-FR", sentences, fixed_now()).unwrap()
    }

    #[tokio::test]
    async fn round_trips_course_with_sentence_order() {
        let repo = InMemoryRepository::new();
        let course = build_course(1);

        let id = repo
            .insert_course(NewCourseRecord::from_course(&course))
            .await
            .unwrap();
        let fetched = repo.get_course(id).await.unwrap().unwrap();

        assert_eq!(fetched.title(), "Greetings");
        assert_eq!(fetched.locale(), "fr-FR");
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched.sentence(0).unwrap().reference_text(), "Bonjour");
        assert_eq!(fetched.sentence(1).unwrap().reference_text(), "Merci");
    }

    #[tokio::test]
    async fn insert_allocates_increasing_ids() {
        let repo = InMemoryRepository::new();
        let a = repo
            .insert_course(NewCourseRecord::from_course(&build_course(1)))
            .await
            .unwrap();
        let b = repo
            .insert_course(NewCourseRecord::from_course(&build_course(1)))
            .await
            .unwrap();
        assert!(b > a);
        assert_eq!(repo.list_courses(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_course_returns_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_course(CourseId::new(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_save_then_get() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_profile().await.unwrap().is_none());

        let profile =
            LearnerProfile::new("French", ProficiencyLevel::Beginner, Some("travel".into()))
                .unwrap();
        repo.save_profile(&ProfileRecord::from_profile(&profile, fixed_now()))
            .await
            .unwrap();

        let fetched = repo.get_profile().await.unwrap().unwrap();
        assert_eq!(fetched.language, "French");
        assert_eq!(fetched.into_profile().unwrap(), profile);
    }

    #[test]
    fn record_with_unknown_proficiency_fails_validation() {
        let record = ProfileRecord {
            language: "French".into(),
            proficiency: "native".into(),
            context: None,
            updated_at: fixed_now(),
        };
        assert!(matches!(
            record.into_profile(),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn record_restores_position_order() {
        let course = build_course(3);
        let mut record = CourseRecord::from_course(&course);
        record.sentences.reverse();

        let restored = record.into_course().unwrap();
        assert_eq!(restored.sentence(0).unwrap().reference_text(), "Bonjour");
    }
}
