use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{ProfileRecord, ProfileRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn save_profile(&self, record: &ProfileRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_profile (id, language, proficiency, context, updated_at)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                language = excluded.language,
                proficiency = excluded.proficiency,
                context = excluded.context,
                updated_at = excluded.updated_at
            ",
        )
        .bind(&record.language)
        .bind(&record.proficiency)
        .bind(&record.context)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_profile(&self) -> Result<Option<ProfileRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT language, proficiency, context, updated_at
            FROM user_profile WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(ProfileRecord {
                language: row.try_get("language").map_err(ser)?,
                proficiency: row.try_get("proficiency").map_err(ser)?,
                context: row.try_get("context").map_err(ser)?,
                updated_at: row.try_get("updated_at").map_err(ser)?,
            })),
            None => Ok(None),
        }
    }
}
