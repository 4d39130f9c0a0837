use ditto_core::model::{CourseId, SentenceId};

use crate::repository::StorageError;

pub(crate) fn course_id_from_i64(raw: i64) -> Result<CourseId, StorageError> {
    u64::try_from(raw)
        .map(CourseId::new)
        .map_err(|_| StorageError::Serialization("course id sign overflow".into()))
}

pub(crate) fn sentence_id_from_i64(raw: i64) -> Result<SentenceId, StorageError> {
    u64::try_from(raw)
        .map(SentenceId::new)
        .map_err(|_| StorageError::Serialization("sentence id sign overflow".into()))
}

pub(crate) fn id_to_i64(value: u64) -> Result<i64, StorageError> {
    i64::try_from(value).map_err(|_| StorageError::Serialization("id overflow".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_are_rejected() {
        assert!(course_id_from_i64(-1).is_err());
        assert!(sentence_id_from_i64(-1).is_err());
    }

    #[test]
    fn ids_round_trip() {
        let id = course_id_from_i64(42).unwrap();
        assert_eq!(id_to_i64(id.value()).unwrap(), 42);
    }
}
