use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::context::handlers::UserIdQuery;
use crate::errors::AppError;
use crate::generation::bets::{generate_strategic_bets, StrategicBet};
use crate::generation::input::GenerationContext;
use crate::generation::plan::generate_plan;
use crate::models::plan::{Plan, PlanStatus};
use crate::state::AppState;

/// Body shared by `/bets` and `/plan/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerationRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub chosen_option: String,
}

#[derive(Serialize)]
pub struct BetsResponse {
    pub plan_id: Uuid,
    pub status: PlanStatus,
    pub bets: Vec<StrategicBet>,
}

#[derive(Serialize)]
pub struct PlanResponse {
    pub plan_id: Uuid,
    pub status: PlanStatus,
    pub plan: Value,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        Self {
            plan_id: plan.id,
            status: plan.status,
            plan: plan.plan_json,
        }
    }
}

/// Returns the context object and the trimmed chosen option.
fn validate_request(req: &GenerationRequest) -> Result<(&Map<String, Value>, &str), AppError> {
    let context = req
        .context
        .as_object()
        .filter(|map| !map.is_empty())
        .ok_or_else(|| AppError::Validation("`context` doit être renseigné.".to_string()))?;

    let chosen_option = req.chosen_option.trim();
    if chosen_option.is_empty() {
        return Err(AppError::Validation(
            "`chosen_option` doit être renseigné.".to_string(),
        ));
    }

    Ok((context, chosen_option))
}

/// POST /api/v1/bets
pub async fn handle_generate_bets(
    State(state): State<AppState>,
    Json(req): Json<GenerationRequest>,
) -> Result<Json<BetsResponse>, AppError> {
    let (context, chosen_option) = validate_request(&req)?;
    let bets = generate_strategic_bets(&GenerationContext::from_json(context), chosen_option);

    let payload = json!({
        "context": context,
        "chosen_option": chosen_option,
        "bets": bets,
    });
    let plan = state.store.upsert_draft_plan(req.user_id, payload).await?;

    info!(
        "Generated {} strategic bets into draft plan {} for user {}",
        bets.len(),
        plan.id,
        req.user_id
    );

    Ok(Json(BetsResponse {
        plan_id: plan.id,
        status: plan.status,
        bets,
    }))
}

/// POST /api/v1/plan/generate
pub async fn handle_generate_plan(
    State(state): State<AppState>,
    Json(req): Json<GenerationRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let (context, chosen_option) = validate_request(&req)?;

    // A policy violation here means a template regressed, not bad input.
    let document = generate_plan(&GenerationContext::from_json(context), chosen_option)
        .map_err(anyhow::Error::from)?;
    let plan_json = serde_json::to_value(&document).map_err(anyhow::Error::from)?;

    let plan = state.store.create_plan(req.user_id, plan_json).await?;
    info!("Generated 90-day plan {} for user {}", plan.id, req.user_id);

    Ok(Json(plan.into()))
}

/// GET /api/v1/plan/:id
pub async fn handle_get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<PlanResponse>, AppError> {
    state
        .store
        .get_plan(params.user_id, plan_id)
        .await?
        .map(|plan| Json(plan.into()))
        .ok_or_else(|| AppError::NotFound("Plan introuvable.".to_string()))
}
