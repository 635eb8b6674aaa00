//! Admin payment settings handlers.
//!
//! One document governs payment and currency configuration. GET auto-creates
//! defaults on first access; PUT merges a full document; PATCH merges named
//! sections; POST creates from a single validated tab. Every write is a
//! compare-and-swap on the document version.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::db::settings::SectionValues;
use crate::db::SettingsRepository;
use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::models::settings::{
    PaymentSettings, SettingsSection, merge_one_level, shallow_merge,
};
use crate::routes::Envelope;
use crate::state::AppState;

/// Build the payment settings router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/admin/payments/settings",
        get(get_settings)
            .put(put_settings)
            .patch(patch_settings)
            .post(post_settings),
    )
}

/// Query parameters shared by the settings endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsQuery {
    /// Return provider keys and signing secrets unmasked.
    pub include_secrets: Option<bool>,
    /// Expected document version for compare-and-swap writes.
    pub version: Option<i32>,
    /// Active flag for newly created documents.
    pub is_active: Option<bool>,
}

fn present(settings: PaymentSettings, query: &SettingsQuery) -> PaymentSettings {
    if query.include_secrets.unwrap_or(false) {
        settings
    } else {
        settings.masked()
    }
}

/// Split a request body into `(section, payload)` pairs, rejecting unknown keys.
fn parse_sections(body: &Value) -> Result<Vec<(SettingsSection, &Value)>, ApiError> {
    let map = body
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("body must be a JSON object".to_owned()))?;

    let mut sections = Vec::with_capacity(map.len());
    for (key, payload) in map {
        let section = key
            .parse::<SettingsSection>()
            .map_err(ApiError::BadRequest)?;
        sections.push((section, payload));
    }
    Ok(sections)
}

fn validate_all(sections: &SectionValues) -> Result<(), ApiError> {
    for section in SettingsSection::ALL {
        section
            .validate(sections.section(section))
            .map_err(ApiError::BadRequest)?;
    }
    Ok(())
}

/// Fetch the active settings document, creating defaults exactly once.
async fn get_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
) -> Result<Json<Envelope<PaymentSettings>>, ApiError> {
    let settings = SettingsRepository::new(state.pool())
        .get_or_create_active()
        .await?;

    Ok(Json(Envelope::ok(present(settings, &query))))
}

/// Full-document write: create with defaults when absent, otherwise merge
/// each provided section one level deep and save.
#[instrument(skip(state, body))]
async fn put_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Envelope<PaymentSettings>>, ApiError> {
    let provided = parse_sections(&body)?;
    let repo = SettingsRepository::new(state.pool());

    let saved = match repo.get_active().await? {
        None => {
            let mut sections = SectionValues::defaults();
            for (section, payload) in provided {
                merge_one_level(sections.section_mut(section), payload);
            }
            validate_all(&sections)?;
            repo.create(&sections, true).await?
        }
        Some(existing) => {
            let mut sections = SectionValues::from_settings(&existing);
            for (section, payload) in provided {
                merge_one_level(sections.section_mut(section), payload);
            }
            validate_all(&sections)?;
            let expected = query.version.unwrap_or(existing.version);
            repo.save(existing.id, expected, &sections).await?
        }
    };

    Ok(Json(Envelope::ok(present(saved, &query))))
}

/// Section-scoped merge into an existing document. 404 when none exists.
///
/// Sections merge shallowly except `currencies`, whose `gems` and `hearts`
/// objects merge one level deeper so a single field (say `max_hearts`) can
/// be patched without resending the rest.
#[instrument(skip(state, body))]
async fn patch_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Envelope<PaymentSettings>>, ApiError> {
    let provided = parse_sections(&body)?;
    let repo = SettingsRepository::new(state.pool());

    let existing = repo
        .get_active()
        .await?
        .ok_or_else(|| ApiError::NotFound("no payment settings document exists".to_owned()))?;

    let mut sections = SectionValues::from_settings(&existing);
    for (section, payload) in provided {
        let target = sections.section_mut(section);
        if section == SettingsSection::Currencies {
            merge_one_level(target, payload);
        } else {
            shallow_merge(target, payload);
        }
        section
            .validate(target)
            .map_err(ApiError::BadRequest)?;
    }

    let expected = query.version.unwrap_or(existing.version);
    let saved = repo.save(existing.id, expected, &sections).await?;

    Ok(Json(Envelope::ok(present(saved, &query))))
}

/// Request to create a settings document from one validated tab.
#[derive(Debug, Deserialize)]
pub struct CreateSettingsRequest {
    pub tab: String,
    pub data: Value,
}

/// Create a settings document. 409 when an active one already exists.
#[instrument(skip(state, body), fields(tab = %body.tab))]
async fn post_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
    Json(body): Json<CreateSettingsRequest>,
) -> Result<(StatusCode, Json<Envelope<PaymentSettings>>), ApiError> {
    let repo = SettingsRepository::new(state.pool());

    if repo.get_active().await?.is_some() {
        return Err(ApiError::Conflict(
            "an active payment settings document already exists".to_owned(),
        ));
    }

    let section = body
        .tab
        .parse::<SettingsSection>()
        .map_err(ApiError::BadRequest)?;
    section.validate(&body.data).map_err(ApiError::BadRequest)?;

    let mut sections = SectionValues::defaults();
    merge_one_level(sections.section_mut(section), &body.data);

    let created = repo
        .create(&sections, query.is_active.unwrap_or(true))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(present(created, &query))),
    ))
}
