//! Consumption of the external course-generation pipeline's staged progress.
//!
//! The pipeline itself (prompting, networking, audio synthesis) lives outside
//! this crate; it reports progress as a stream of [`GenerationUpdate`]s, and
//! [`GenerationTracker`] folds those into a queryable status plus the final
//! course draft.

use rand::Rng;
use serde::{Deserialize, Serialize};

use ditto_core::model::{CourseDraft, LearnerProfile, ProficiencyLevel};

use crate::error::GenerationError;

/// Input handed to the external pipeline when generation starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub language: String,
    pub proficiency: ProficiencyLevel,
    /// Scenario seed; picked from the learner's interests when present.
    pub topic: Option<String>,
}

impl GenerationRequest {
    /// Builds a request from the learner profile, seeding the topic with a
    /// randomly chosen interest.
    #[must_use]
    pub fn from_profile(profile: &LearnerProfile, interests: &[String]) -> Self {
        Self {
            language: profile.language().to_owned(),
            proficiency: profile.proficiency(),
            topic: pick_topic(interests).map(ToOwned::to_owned),
        }
    }
}

/// Picks a random interest to seed the course scenario, or `None` when the
/// learner selected nothing.
#[must_use]
pub fn pick_topic(interests: &[String]) -> Option<&str> {
    if interests.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..interests.len());
    Some(interests[index].as_str())
}

/// Progress milestone reported by the pipeline, e.g. step 2 of 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStage {
    pub step: u32,
    pub count: u32,
}

/// One message from the pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationUpdate {
    Stage { step: u32, count: u32 },
    Completed { course: CourseDraft },
    Failed { message: String },
}

/// Queryable snapshot of an in-flight generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationStatus {
    pub is_loading: bool,
    pub stage: Option<GenerationStage>,
}

/// Folds pipeline updates into a status and, eventually, a course draft.
///
/// A tracker covers exactly one generation run: once it has seen `Completed`
/// or `Failed`, further updates are rejected.
#[derive(Debug, Default)]
pub struct GenerationTracker {
    stage: Option<GenerationStage>,
    finished: bool,
}

impl GenerationTracker {
    /// Creates a tracker for a generation that has just been kicked off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> GenerationStatus {
        GenerationStatus {
            is_loading: !self.finished,
            stage: self.stage,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Applies one pipeline update.
    ///
    /// Returns `Ok(Some(draft))` when the pipeline completed, `Ok(None)` for
    /// progress milestones.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Failed` when the pipeline reports failure
    /// and `GenerationError::AlreadyFinished` for updates after the end.
    pub fn apply(
        &mut self,
        update: GenerationUpdate,
    ) -> Result<Option<CourseDraft>, GenerationError> {
        if self.finished {
            return Err(GenerationError::AlreadyFinished);
        }

        match update {
            GenerationUpdate::Stage { step, count } => {
                self.stage = Some(GenerationStage { step, count });
                Ok(None)
            }
            GenerationUpdate::Completed { course } => {
                self.finished = true;
                Ok(Some(course))
            }
            GenerationUpdate::Failed { message } => {
                self.finished = true;
                Err(GenerationError::Failed(message))
            }
        }
    }
}
