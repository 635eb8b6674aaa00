//! Lesson content handlers: catalog plus per-user progress aggregation.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::db::LessonRepository;
use crate::error::ApiError;
use crate::middleware::OptionalAuth;
use crate::models::lesson::UnitView;
use crate::routes::Envelope;
use crate::state::{AppState, Catalog};

/// Build the lessons router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/public/lessons", get(learn))
}

#[derive(Debug, Deserialize)]
pub struct LessonsQuery {
    pub action: Option<String>,
}

/// The learn screen: ordered units with lessons, plus the caller's progress
/// when authenticated.
///
/// The catalog half is cached in-process; progress is always read fresh.
async fn learn(
    OptionalAuth(current): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<LessonsQuery>,
) -> Result<Json<Envelope<Vec<UnitView>>>, ApiError> {
    if query.action.as_deref() != Some("learn") {
        return Err(ApiError::BadRequest(
            "unsupported action, expected 'learn'".to_owned(),
        ));
    }

    let catalog = load_catalog(&state).await?;

    let progress = match current {
        Some(user) => {
            LessonRepository::new(state.pool())
                .progress_for_user(user.id)
                .await?
        }
        None => Vec::new(),
    };

    let units = catalog
        .units
        .iter()
        .map(|unit| {
            let lessons = catalog
                .lessons
                .iter()
                .filter(|lesson| lesson.unit_id == unit.id)
                .cloned()
                .collect();
            UnitView::assemble(unit.clone(), lessons, &progress)
        })
        .collect();

    Ok(Json(Envelope::ok(units)))
}

/// Serve the catalog from cache, loading it on miss.
async fn load_catalog(state: &AppState) -> Result<Arc<Catalog>, ApiError> {
    let pool = state.pool().clone();
    state
        .catalog_cache()
        .try_get_with((), async move {
            let repo = LessonRepository::new(&pool);
            let units = repo.list_units().await?;
            let lessons = repo.list_lessons().await?;
            Ok::<_, crate::db::RepositoryError>(Arc::new(Catalog { units, lessons }))
        })
        .await
        .map_err(|e| ApiError::Internal(format!("failed to load lesson catalog: {e}")))
}
