mod course;
mod ids;
mod profile;
mod sentence;

pub use course::{Course, CourseDraft, CourseError, SentenceDraft};
pub use ids::{CourseId, ParseIdError, SentenceId};
pub use profile::{LearnerProfile, ParseProficiencyError, ProficiencyLevel, ProfileError};
pub use sentence::{AudioRef, Sentence, SentenceError};
