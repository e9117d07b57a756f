use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::checklist::evaluator::evaluate;
use crate::context::handlers::UserIdQuery;
use crate::errors::AppError;
use crate::models::plan::{PlanStatus, Verdict};
use crate::state::AppState;

#[derive(Serialize)]
pub struct PlanEvaluateResponse {
    pub plan_id: Uuid,
    pub status: PlanStatus,
    pub checklist_result_id: Uuid,
    pub verdict: Verdict,
    pub feedback: String,
}

/// POST /api/v1/plan/:id/evaluate
///
/// Re-evaluation is allowed; each call appends a result and the plan status
/// follows the latest verdict.
pub async fn handle_evaluate_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<PlanEvaluateResponse>, AppError> {
    let plan = state
        .store
        .get_plan(params.user_id, plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Plan introuvable.".to_string()))?;

    let evaluation = evaluate(&plan.plan_json);

    let (plan, result) = state
        .store
        .record_evaluation(params.user_id, plan_id, &evaluation)
        .await?
        .ok_or_else(|| AppError::NotFound("Plan introuvable.".to_string()))?;

    info!("Plan {plan_id} evaluated: {}", result.verdict);

    Ok(Json(PlanEvaluateResponse {
        plan_id: plan.id,
        status: plan.status,
        checklist_result_id: result.id,
        verdict: result.verdict,
        feedback: result.feedback,
    }))
}
