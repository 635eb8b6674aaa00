//! Report submission, listing, triage stats and status updates.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use tracing::instrument;

use chirp_core::{LessonId, ReportId, UserRole};

use crate::db::reports::{NewReport, ReportFilter, ReportStats};
use crate::db::ReportRepository;
use crate::error::ApiError;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::report::{
    Report, ReportStatus, ReportType, determine_report_priority, determine_report_type,
};
use crate::routes::Envelope;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Build the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reports", get(list_reports).post(create_report))
        .route("/api/reports/stats", get(report_stats))
        .route("/api/reports/{report_id}", patch(update_report_status))
}

// =============================================================================
// Submission
// =============================================================================

/// Request to file a report.
#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub lesson_id: Option<LessonId>,
    pub exercise_id: Option<String>,
    pub reasons: Vec<String>,
    pub title: String,
    pub description: String,
}

/// File a new report.
///
/// The report type and priority are derived from the reasons; a second open
/// report for the same user and exercise is refused with a pointer at the
/// first one. Mail must be configured or the submission fails, matching the
/// request-time credential check this endpoint has always done.
#[instrument(skip(state, body), fields(user_id = %current.id))]
async fn create_report(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<Envelope<Report>>), ApiError> {
    let Some(email) = state.email() else {
        return Err(ApiError::Internal(
            "mail service is not configured".to_owned(),
        ));
    };

    if body.reasons.is_empty() || body.reasons.iter().all(String::is_empty) {
        return Err(ApiError::BadRequest(
            "at least one reason is required".to_owned(),
        ));
    }
    if body.title.is_empty() {
        return Err(ApiError::BadRequest("title is required".to_owned()));
    }

    let reports = ReportRepository::new(state.pool());

    if let Some(exercise_id) = body.exercise_id.as_deref()
        && let Some(existing) = reports.find_open_duplicate(current.id, exercise_id).await?
    {
        return Err(ApiError::Conflict(format!(
            "a report for this exercise already exists (report #{existing})"
        )));
    }

    let report_type = determine_report_type(&body.reasons);
    let priority = determine_report_priority(report_type);

    let report = reports
        .create(&NewReport {
            user_id: current.id,
            lesson_id: body.lesson_id,
            exercise_id: body.exercise_id,
            reasons: body.reasons,
            report_type,
            priority,
            title: body.title,
            description: body.description,
        })
        .await?;

    // Notification delivery is best-effort once the report is on disk.
    if let Err(e) = email.send_report_notification(&report).await {
        tracing::warn!(report_id = %report.id, error = %e, "report notification failed");
    }

    Ok((StatusCode::CREATED, Json(Envelope::ok(report))))
}

// =============================================================================
// Listing & stats
// =============================================================================

/// Listing filters.
#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    pub status: Option<ReportStatus>,
    #[serde(rename = "type")]
    pub report_type: Option<ReportType>,
    pub user_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List reports. Admins see everyone's; users see their own.
async fn list_reports(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<Envelope<Vec<Report>>>, ApiError> {
    let user_id = if current.role == UserRole::Admin {
        query.user_id.map(Into::into)
    } else {
        Some(current.id)
    };

    let filter = ReportFilter {
        user_id,
        status: query.status,
        report_type: query.report_type,
        limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        offset: query.offset.unwrap_or(0).max(0),
    };

    let reports = ReportRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(Envelope::ok(reports)))
}

/// Aggregate counts for the triage dashboard.
async fn report_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Envelope<ReportStats>>, ApiError> {
    let stats = ReportRepository::new(state.pool()).stats().await?;
    Ok(Json(Envelope::ok(stats)))
}

// =============================================================================
// Status updates
// =============================================================================

/// Request to move a report through the review pipeline.
#[derive(Debug, Deserialize)]
pub struct UpdateReportRequest {
    pub status: ReportStatus,
}

/// Set a report's status (admin-driven; no transition ordering enforced).
#[instrument(skip(state))]
async fn update_report_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(report_id): Path<ReportId>,
    Json(body): Json<UpdateReportRequest>,
) -> Result<Json<Envelope<Report>>, ApiError> {
    let report = ReportRepository::new(state.pool())
        .update_status(report_id, body.status)
        .await?;

    Ok(Json(Envelope::ok(report)))
}
