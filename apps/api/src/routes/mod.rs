pub mod health;

#[cfg(test)]
mod tests;

use axum::{
    routing::{get, post},
    Router,
};

use crate::checklist::handlers as checklist;
use crate::context::handlers as context;
use crate::decision::handlers as decision;
use crate::generation::handlers as generation;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Career context
        .route(
            "/api/v1/context",
            get(context::handle_get_context).post(context::handle_upsert_context),
        )
        // Decision engine
        .route(
            "/api/v1/decision/options",
            post(decision::handle_decision_options),
        )
        .route(
            "/api/v1/decision/choose",
            post(decision::handle_decision_choose),
        )
        // Generation
        .route("/api/v1/bets", post(generation::handle_generate_bets))
        .route("/api/v1/plan/generate", post(generation::handle_generate_plan))
        .route("/api/v1/plan/:id", get(generation::handle_get_plan))
        // Checklist and export
        .route(
            "/api/v1/plan/:id/evaluate",
            post(checklist::handle_evaluate_plan),
        )
        .route("/api/v1/plan/:id/export", get(render::handle_export_plan))
        .with_state(state)
}
