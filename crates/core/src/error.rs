use thiserror::Error;

use crate::model::{CourseError, ProfileError, SentenceError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Sentence(#[from] SentenceError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}
