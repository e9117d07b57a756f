use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::context::validation::{validate_context, ContextRequest};
use crate::errors::AppError;
use crate::models::context::CareerContext;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// POST /api/v1/context
pub async fn handle_upsert_context(
    State(state): State<AppState>,
    Json(req): Json<ContextRequest>,
) -> Result<Json<CareerContext>, AppError> {
    let upsert = validate_context(&req).map_err(AppError::InvalidPayload)?;
    let context = state.store.upsert_context(req.user_id, upsert).await?;
    info!("Career context saved for user {}", req.user_id);
    Ok(Json(context))
}

/// GET /api/v1/context
pub async fn handle_get_context(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CareerContext>, AppError> {
    state
        .store
        .get_context(params.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("CareerContext introuvable.".to_string()))
}
