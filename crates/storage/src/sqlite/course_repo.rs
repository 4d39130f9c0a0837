use ditto_core::model::{Course, CourseId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{course_id_from_i64, id_to_i64, sentence_id_from_i64};
use crate::repository::{
    CourseRecord, CourseRepository, NewCourseRecord, SentenceRecord, StorageError,
};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn insert_course(&self, course: NewCourseRecord) -> Result<CourseId, StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let res = sqlx::query(
            r"
            INSERT INTO courses (title, locale, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(course.title)
        .bind(course.locale)
        .bind(course.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let course_id = res.last_insert_rowid();

        for sentence in course.sentences {
            sqlx::query(
                r"
                INSERT INTO sentences (id, course_id, position, reference_text, display_text, audio_ref)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(id_to_i64(sentence.id.value())?)
            .bind(course_id)
            .bind(i64::from(sentence.position))
            .bind(sentence.reference_text)
            .bind(sentence.display_text)
            .bind(sentence.audio_ref)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        course_id_from_i64(course_id)
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, locale, created_at
            FROM courses WHERE id = ?1
            ",
        )
        .bind(id_to_i64(id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let record = self.course_record_from_row(&row).await?;
        record.into_course().map(Some)
    }

    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, locale, created_at
            FROM courses
            ORDER BY id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let record = self.course_record_from_row(&row).await?;
            courses.push(record.into_course()?);
        }
        Ok(courses)
    }
}

impl SqliteRepository {
    async fn course_record_from_row(&self, row: &SqliteRow) -> Result<CourseRecord, StorageError> {
        let raw_id: i64 = row.try_get("id").map_err(ser)?;
        let id = course_id_from_i64(raw_id)?;

        let sentence_rows = sqlx::query(
            r"
            SELECT id, position, reference_text, display_text, audio_ref
            FROM sentences
            WHERE course_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(raw_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut sentences = Vec::with_capacity(sentence_rows.len());
        for sentence_row in &sentence_rows {
            sentences.push(sentence_record_from_row(sentence_row)?);
        }

        Ok(CourseRecord {
            id,
            title: row.try_get("title").map_err(ser)?,
            locale: row.try_get("locale").map_err(ser)?,
            created_at: row.try_get("created_at").map_err(ser)?,
            sentences,
        })
    }
}

fn sentence_record_from_row(row: &SqliteRow) -> Result<SentenceRecord, StorageError> {
    let position = u32::try_from(row.try_get::<i64, _>("position").map_err(ser)?)
        .map_err(|_| StorageError::Serialization("position overflow".into()))?;

    Ok(SentenceRecord {
        id: sentence_id_from_i64(row.try_get("id").map_err(ser)?)?,
        position,
        reference_text: row.try_get("reference_text").map_err(ser)?,
        display_text: row.try_get("display_text").map_err(ser)?,
        audio_ref: row.try_get("audio_ref").map_err(ser)?,
    })
}
