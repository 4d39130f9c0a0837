use std::sync::Arc;

use ditto_core::Clock;
use ditto_core::model::{LearnerProfile, ProficiencyLevel};
use storage::repository::{ProfileRecord, ProfileRepository};

use crate::error::ProfileServiceError;

/// Orchestrates learner-profile validation and persistence.
#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(clock: Clock, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { clock, profiles }
    }

    /// Persist the learner profile, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if persistence fails.
    pub async fn save_profile(&self, profile: &LearnerProfile) -> Result<(), ProfileServiceError> {
        let record = ProfileRecord::from_profile(profile, self.clock.now());
        self.profiles.save_profile(&record).await?;
        Ok(())
    }

    /// Validate onboarding answers into a profile and persist it.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` for validation failures.
    /// Returns `ProfileServiceError::Storage` if persistence fails.
    pub async fn complete_onboarding(
        &self,
        language: String,
        proficiency: ProficiencyLevel,
        context: Option<String>,
    ) -> Result<LearnerProfile, ProfileServiceError> {
        let profile = LearnerProfile::new(language, proficiency, context)?;
        self.save_profile(&profile).await?;
        Ok(profile)
    }

    /// Fetch the learner profile.
    ///
    /// Returns `Ok(None)` when onboarding has not been completed yet.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if repository access fails.
    pub async fn get_profile(&self) -> Result<Option<LearnerProfile>, ProfileServiceError> {
        match self.profiles.get_profile().await? {
            Some(record) => Ok(Some(record.into_profile()?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ditto_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn profile_round_trips_through_service() {
        let repo = InMemoryRepository::new();
        let service = ProfileService::new(fixed_clock(), Arc::new(repo));

        assert!(service.get_profile().await.unwrap().is_none());

        let saved = service
            .complete_onboarding(
                "French".to_string(),
                ProficiencyLevel::Intermediate,
                Some("markets, cycling".to_string()),
            )
            .await
            .unwrap();

        let fetched = service.get_profile().await.unwrap().unwrap();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn blank_language_fails_validation() {
        let repo = InMemoryRepository::new();
        let service = ProfileService::new(fixed_clock(), Arc::new(repo));

        let err = service
            .complete_onboarding(" ".to_string(), ProficiencyLevel::Beginner, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileServiceError::Profile(_)));
    }
}
