//! Subscription plan handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::PlanRepository;
use crate::error::ApiError;
use crate::models::plan::SubscriptionPlan;
use crate::routes::Envelope;
use crate::state::AppState;

/// Build the plans router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/subscriptions/plans", get(list_plans))
        .route("/api/subscriptions/plans/{plan_id}", get(get_plan))
}

/// A plan with its promotional price resolved against the current time.
#[derive(Debug, Serialize)]
pub struct PlanView {
    #[serde(flatten)]
    pub plan: SubscriptionPlan,
    pub effective_price: Decimal,
    pub promo_active: bool,
}

impl From<SubscriptionPlan> for PlanView {
    fn from(plan: SubscriptionPlan) -> Self {
        let now = Utc::now();
        Self {
            effective_price: plan.effective_price(now),
            promo_active: plan.promo_active(now),
            plan,
        }
    }
}

/// All active plans with effective prices.
async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<PlanView>>>, ApiError> {
    let plans = PlanRepository::new(state.pool()).list_active().await?;
    Ok(Json(Envelope::ok(plans.into_iter().map(Into::into).collect())))
}

/// Look up a single plan by slug.
async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<Envelope<PlanView>>, ApiError> {
    let plan = PlanRepository::new(state.pool())
        .get_by_id(&plan_id)
        .await?
        .filter(|plan| plan.active)
        .ok_or_else(|| ApiError::NotFound(format!("no such plan: {plan_id}")))?;

    Ok(Json(Envelope::ok(plan.into())))
}
