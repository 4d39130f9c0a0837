use std::sync::Arc;

use ditto_core::Clock;
use ditto_core::model::CourseId;
use storage::repository::Storage;

use crate::course_service::CourseService;
use crate::engines::{ReferenceAudio, SpeechRecognizer};
use crate::error::AppServicesError;
use crate::profile_service::ProfileService;
use crate::session::SessionCoordinator;

/// Assembles app-facing services over a storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    profile_service: Arc<ProfileService>,
    course_service: Arc<CourseService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Sqlite` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock))
    }

    /// Build services over in-memory storage, for tests and prototyping.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::with_storage(Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn with_storage(storage: Storage, clock: Clock) -> Self {
        let profile_service = Arc::new(ProfileService::new(clock, Arc::clone(&storage.profiles)));
        let course_service = Arc::new(CourseService::new(clock, Arc::clone(&storage.courses)));
        Self {
            clock,
            profile_service,
            course_service,
        }
    }

    #[must_use]
    pub fn profile_service(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile_service)
    }

    #[must_use]
    pub fn course_service(&self) -> Arc<CourseService> {
        Arc::clone(&self.course_service)
    }

    /// Load a stored course and build a coordinator over the given engines.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::CourseNotFound` for an unknown course ID.
    /// Returns `AppServicesError::Course` if loading fails.
    pub async fn start_practice(
        &self,
        course_id: CourseId,
        audio: Arc<dyn ReferenceAudio>,
        speech: Arc<dyn SpeechRecognizer>,
    ) -> Result<SessionCoordinator, AppServicesError> {
        let course = self
            .course_service
            .get_course(course_id)
            .await?
            .ok_or(AppServicesError::CourseNotFound(course_id))?;

        Ok(SessionCoordinator::new(
            Arc::new(course),
            audio,
            speech,
            self.clock.now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ditto_core::model::CourseDraft;
    use ditto_core::time::fixed_clock;

    use crate::engines::{InMemoryAudioEngine, InMemorySpeechEngine};

    fn build_draft() -> CourseDraft {
        serde_json::from_str(
            r#"{
                "title": "Greetings",
                "locale": "fr-FR",
                "sentences": [
                    {
                        "reference_text": "Bonjour",
                        "display_text": "Hello",
                        "audio_ref": "audio/1.m4a"
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn practice_session_starts_from_stored_course() {
        let services = AppServices::in_memory(fixed_clock());
        let course = services
            .course_service()
            .store_generated(build_draft())
            .await
            .unwrap();

        let mut coordinator = services
            .start_practice(
                course.id(),
                Arc::new(InMemoryAudioEngine::new()),
                Arc::new(InMemorySpeechEngine::new()),
            )
            .await
            .unwrap();

        assert_eq!(coordinator.course().title(), "Greetings");
        coordinator.toggle_playback().await.unwrap();
        assert!(coordinator.snapshot().is_playing);
    }

    #[tokio::test]
    async fn unknown_course_is_reported() {
        let services = AppServices::in_memory(fixed_clock());
        let err = services
            .start_practice(
                CourseId::new(404),
                Arc::new(InMemoryAudioEngine::new()),
                Arc::new(InMemorySpeechEngine::new()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppServicesError::CourseNotFound(_)));
    }
}
