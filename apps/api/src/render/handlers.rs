use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use crate::context::handlers::UserIdQuery;
use crate::errors::AppError;
use crate::models::plan::PlanStatus;
use crate::state::AppState;

/// GET /api/v1/plan/:id/export
///
/// Only approved plans can be exported. The document embeds the plan's most
/// recent checklist result.
pub async fn handle_export_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let plan = state
        .store
        .get_plan(params.user_id, plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Plan introuvable.".to_string()))?;

    if plan.status != PlanStatus::Approved {
        return Err(AppError::Forbidden(
            "Le plan doit être approuvé avant export.".to_string(),
        ));
    }

    let checklist = state.store.latest_checklist(plan.id).await?;
    let document = state.renderer.render(&plan.plan_json, checklist.as_ref())?;

    info!("Exported plan {} ({} bytes)", plan.id, document.len());

    let disposition = format!(
        "attachment; filename=\"plan-90-jours-{}.{}\"",
        plan.id,
        state.renderer.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, state.renderer.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    ))
}
