//! Report repository: submission, dedup lookup, listing and stats.

use serde::Serialize;
use sqlx::PgPool;

use chirp_core::{LessonId, ReportId, UserId};

use super::RepositoryError;
use crate::models::report::{Report, ReportPriority, ReportStatus, ReportType};

const REPORT_COLUMNS: &str = "id, user_id, lesson_id, exercise_id, reasons, report_type, \
     priority, status, title, description, created_at, updated_at";

/// Everything needed to file one report.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: UserId,
    pub lesson_id: Option<LessonId>,
    pub exercise_id: Option<String>,
    pub reasons: Vec<String>,
    pub report_type: ReportType,
    pub priority: ReportPriority,
    pub title: String,
    pub description: String,
}

/// Listing filters; all optional.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub user_id: Option<UserId>,
    pub status: Option<ReportStatus>,
    pub report_type: Option<ReportType>,
    pub limit: i64,
    pub offset: i64,
}

/// Aggregate counts for the triage dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ReportStats {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub by_type: Vec<TypeCount>,
    pub by_priority: Vec<PriorityCount>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: ReportStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TypeCount {
    pub report_type: ReportType,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PriorityCount {
    pub priority: ReportPriority,
    pub count: i64,
}

/// Repository for content reports.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find an open report already filed by this user for this exercise.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_open_duplicate(
        &self,
        user_id: UserId,
        exercise_id: &str,
    ) -> Result<Option<ReportId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, ReportId>(
            "SELECT id FROM reports
             WHERE user_id = $1 AND exercise_id = $2 AND status = 'open'",
        )
        .bind(user_id)
        .bind(exercise_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(id)
    }

    /// File a new report.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the dedup index refuses a
    /// second open report for the same user and exercise.
    pub async fn create(&self, new: &NewReport) -> Result<Report, RepositoryError> {
        let report = sqlx::query_as::<_, Report>(&format!(
            "INSERT INTO reports
                 (user_id, lesson_id, exercise_id, reasons, report_type, priority,
                  title, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {REPORT_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.lesson_id)
        .bind(&new.exercise_id)
        .bind(&new.reasons)
        .bind(new.report_type)
        .bind(new.priority)
        .bind(&new.title)
        .bind(&new.description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "an open report already exists for this exercise".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        Ok(report)
    }

    /// List reports matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>, RepositoryError> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports
             WHERE ($1::int IS NULL OR user_id = $1)
               AND ($2::report_status IS NULL OR status = $2)
               AND ($3::report_type IS NULL OR report_type = $3)
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.user_id)
        .bind(filter.status)
        .bind(filter.report_type)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool)
        .await?;

        Ok(reports)
    }

    /// Get a report by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ReportId) -> Result<Option<Report>, RepositoryError> {
        let report = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(report)
    }

    /// Set a report's status. Transitions are admin-driven; no ordering is
    /// enforced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the report doesn't exist.
    pub async fn update_status(
        &self,
        id: ReportId,
        status: ReportStatus,
    ) -> Result<Report, RepositoryError> {
        let report = sqlx::query_as::<_, Report>(&format!(
            "UPDATE reports SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {REPORT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        report.ok_or(RepositoryError::NotFound)
    }

    /// Aggregate counts by status, type and priority.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn stats(&self) -> Result<ReportStats, RepositoryError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports")
            .fetch_one(self.pool)
            .await?;

        let by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM reports GROUP BY status ORDER BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let by_type = sqlx::query_as::<_, TypeCount>(
            "SELECT report_type, COUNT(*) AS count FROM reports
             GROUP BY report_type ORDER BY report_type",
        )
        .fetch_all(self.pool)
        .await?;

        let by_priority = sqlx::query_as::<_, PriorityCount>(
            "SELECT priority, COUNT(*) AS count FROM reports
             GROUP BY priority ORDER BY priority",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(ReportStats {
            total,
            by_status,
            by_type,
            by_priority,
        })
    }
}
