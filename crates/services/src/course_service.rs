use std::sync::Arc;

use ditto_core::Clock;
use ditto_core::model::{Course, CourseDraft, CourseId};
use storage::repository::{CourseRepository, NewCourseRecord};

use crate::error::CourseServiceError;

/// Orchestrates course validation and persistence.
#[derive(Clone)]
pub struct CourseService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
}

impl CourseService {
    #[must_use]
    pub fn new(clock: Clock, courses: Arc<dyn CourseRepository>) -> Self {
        Self { clock, courses }
    }

    /// Validate a generated draft and persist it, returning the stored course
    /// under its storage-allocated ID.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Course` for validation failures.
    /// Returns `CourseServiceError::Storage` if persistence fails.
    pub async fn store_generated(&self, draft: CourseDraft) -> Result<Course, CourseServiceError> {
        let now = self.clock.now();
        let course = draft.into_course(CourseId::new(1), now)?;
        let id = self
            .courses
            .insert_course(NewCourseRecord::from_course(&course))
            .await?;
        self.courses
            .get_course(id)
            .await?
            .ok_or(CourseServiceError::NotFound(id))
    }

    /// Fetch a course by ID.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn get_course(&self, id: CourseId) -> Result<Option<Course>, CourseServiceError> {
        let course = self.courses.get_course(id).await?;
        Ok(course)
    }

    /// List courses ordered by ID, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, CourseServiceError> {
        let courses = self.courses.list_courses(limit).await?;
        Ok(courses)
    }
}
