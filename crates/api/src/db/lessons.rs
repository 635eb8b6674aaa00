//! Course content repository: units, lessons, per-user progress.

use sqlx::PgPool;

use chirp_core::UserId;

use super::RepositoryError;
use crate::models::lesson::{Lesson, LessonProgress, Unit};

/// Repository for course content.
pub struct LessonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LessonRepository<'a> {
    /// Create a new lesson repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All units in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_units(&self) -> Result<Vec<Unit>, RepositoryError> {
        let units = sqlx::query_as::<_, Unit>(
            "SELECT id, title, description, position FROM units ORDER BY position ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(units)
    }

    /// All lessons across units, in unit/lesson display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lessons(&self) -> Result<Vec<Lesson>, RepositoryError> {
        let lessons = sqlx::query_as::<_, Lesson>(
            "SELECT id, unit_id, title, position, xp_reward FROM lessons
             ORDER BY unit_id ASC, position ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(lessons)
    }

    /// The caller's progress rows across all lessons.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<LessonProgress>, RepositoryError> {
        let progress = sqlx::query_as::<_, LessonProgress>(
            "SELECT lesson_id, completed, score FROM lesson_progress WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(progress)
    }
}
