use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("profile language cannot be empty")]
    EmptyLanguage,
}

/// Error type for parsing a proficiency level from string
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown proficiency level: {raw}")]
pub struct ParseProficiencyError {
    raw: String,
}

/// Self-assessed speaking level captured during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProficiencyLevel {
    type Err = ParseProficiencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(ParseProficiencyError {
                raw: other.to_string(),
            }),
        }
    }
}

/// Learner identity for course generation and the dashboard.
///
/// One profile per install; storage enforces the single-row semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerProfile {
    language: String,
    proficiency: ProficiencyLevel,
    context: Option<String>,
}

impl LearnerProfile {
    /// Creates a profile after validating the target language.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::EmptyLanguage` if the language is blank.
    pub fn new(
        language: impl Into<String>,
        proficiency: ProficiencyLevel,
        context: Option<String>,
    ) -> Result<Self, ProfileError> {
        let language = language.into();
        if language.trim().is_empty() {
            return Err(ProfileError::EmptyLanguage);
        }

        Ok(Self {
            language,
            proficiency,
            context,
        })
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn proficiency(&self) -> ProficiencyLevel {
        self.proficiency
    }

    /// Free-text interests/background the learner wrote during onboarding.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_requires_language() {
        let err =
            LearnerProfile::new("", ProficiencyLevel::Beginner, None).unwrap_err();
        assert_eq!(err, ProfileError::EmptyLanguage);
    }

    #[test]
    fn proficiency_round_trips_through_str() {
        for level in [
            ProficiencyLevel::Beginner,
            ProficiencyLevel::Intermediate,
            ProficiencyLevel::Advanced,
        ] {
            let parsed: ProficiencyLevel = level.as_str().parse().unwrap();
            assert_eq!(parsed, level);
        }
    }

    #[test]
    fn unknown_proficiency_fails_to_parse() {
        assert!("fluent".parse::<ProficiencyLevel>().is_err());
    }

    #[test]
    fn profile_exposes_context() {
        let profile = LearnerProfile::new(
            "French",
            ProficiencyLevel::Intermediate,
            Some("I am fascinated by fishing".to_string()),
        )
        .unwrap();
        assert_eq!(profile.context(), Some("I am fascinated by fishing"));
    }
}
