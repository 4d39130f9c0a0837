//! Shared error types for the services crate.

use thiserror::Error;

use ditto_core::model::{CourseError, CourseId, ProfileError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::engines::EngineError;

/// Errors emitted by the session coordinator.
///
/// None of these are fatal to the session: `InvalidNavigation` and `Engine`
/// leave the coordinator in its previous (respectively `Idle`) state, and
/// `Closed` simply reports that the session already ended.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("navigation target {index} is outside course of {len} sentences")]
    InvalidNavigation { index: usize, len: usize },

    #[error("session is closed")]
    Closed,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CourseService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("course {0} not found")]
    NotFound(CourseId),
}

/// Errors emitted while folding generation progress updates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("generation already finished")]
    AlreadyFinished,
    #[error("generation failed: {0}")]
    Failed(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Course(#[from] CourseServiceError),
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
}
