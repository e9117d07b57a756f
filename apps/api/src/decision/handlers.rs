use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::context::handlers::UserIdQuery;
use crate::decision::engine::{
    check_constraints, force_tradeoff, generate_options, ConstraintCheck, DecisionOption,
    MAX_OPTIONS,
};
use crate::errors::AppError;
use crate::models::decision::NewDecision;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DecisionOptionsResponse {
    pub constraint_check: ConstraintCheck,
    pub options: Vec<DecisionOption>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionChooseRequest {
    pub user_id: Uuid,
    pub options: Vec<String>,
    pub chosen_option: String,
    pub abandoned_options: Vec<String>,
    #[serde(default)]
    pub justification: String,
}

#[derive(Serialize)]
pub struct DecisionChooseResponse {
    pub decision_id: Uuid,
    pub validated: bool,
    pub chosen_option: String,
    pub abandoned_options: Vec<String>,
    pub justification: String,
}

/// Request-level checks that run before the tradeoff rules.
fn validate_choice(req: &DecisionChooseRequest) -> Result<(), AppError> {
    if req.options.len() > MAX_OPTIONS {
        return Err(AppError::Validation(
            "Le nombre d'options ne peut pas dépasser 3.".to_string(),
        ));
    }
    if req.justification.trim().is_empty() {
        return Err(AppError::Validation(
            "Impossible de choisir sans justification.".to_string(),
        ));
    }
    if !req.options.contains(&req.chosen_option) {
        return Err(AppError::Validation(
            "`chosen_option` doit appartenir à `options`.".to_string(),
        ));
    }
    if req
        .abandoned_options
        .iter()
        .any(|option| !req.options.contains(option))
    {
        return Err(AppError::Validation(
            "`abandoned_options` doit être un sous-ensemble de `options`.".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/v1/decision/options
pub async fn handle_decision_options(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DecisionOptionsResponse>, AppError> {
    let context = state
        .store
        .get_context(params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("CareerContext introuvable.".to_string()))?;

    let constraint_check = check_constraints(&context);
    if !constraint_check.ok {
        return Err(AppError::ConstraintViolation(constraint_check));
    }

    Ok(Json(DecisionOptionsResponse {
        constraint_check,
        options: generate_options(&context),
    }))
}

/// POST /api/v1/decision/choose
pub async fn handle_decision_choose(
    State(state): State<AppState>,
    Json(req): Json<DecisionChooseRequest>,
) -> Result<Json<DecisionChooseResponse>, AppError> {
    validate_choice(&req)?;

    let tradeoff = force_tradeoff(&req.chosen_option, &req.justification, &req.abandoned_options)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let decision = state
        .store
        .create_decision(
            req.user_id,
            NewDecision {
                options: req.options,
                chosen_option: req.chosen_option,
                abandoned_options: req.abandoned_options,
                justification: tradeoff.justification.clone(),
            },
        )
        .await?;

    info!(
        "Decision {} recorded for user {}: '{}'",
        decision.id, decision.user_id, tradeoff.chosen_option
    );

    Ok(Json(DecisionChooseResponse {
        decision_id: decision.id,
        validated: tradeoff.validated,
        chosen_option: tradeoff.chosen_option,
        abandoned_options: tradeoff.abandoned_options,
        justification: tradeoff.justification,
    }))
}
