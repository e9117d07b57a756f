use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::decision::engine::ConstraintCheck;
use crate::render::RenderError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Several field-level failures reported together.
    #[error("Validation error: {}", .0.join("; "))]
    InvalidPayload(Vec<String>),

    #[error("Constraint violation: {}", .0.issue)]
    ConstraintViolation(ConstraintCheck),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): (StatusCode, &str, String, Option<Value>) =
            match &self {
                AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
                AppError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
                }
                AppError::InvalidPayload(errors) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    errors.join(" "),
                    Some(json!(errors)),
                ),
                AppError::ConstraintViolation(check) => (
                    StatusCode::BAD_REQUEST,
                    "CONSTRAINT_VIOLATION",
                    check.issue.clone(),
                    serde_json::to_value(check).ok(),
                ),
                AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
                AppError::Store(e) => {
                    tracing::error!("Store error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DATABASE_ERROR",
                        "A database error occurred".to_string(),
                        None,
                    )
                }
                AppError::Render(e) => {
                    tracing::error!("Render error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "RENDER_ERROR",
                        "The document could not be rendered".to_string(),
                        None,
                    )
                }
                AppError::Internal(e) => {
                    tracing::error!("Internal error: {e:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                        None,
                    )
                }
            };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Plan introuvable.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Plan introuvable.");
    }

    #[tokio::test]
    async fn test_invalid_payload_lists_every_error() {
        let response = AppError::InvalidPayload(vec!["a".to_string(), "b".to_string()])
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["details"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_constraint_violation_carries_check() {
        let check = ConstraintCheck::failed("issue", "adjust");
        let response = AppError::ConstraintViolation(check).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "CONSTRAINT_VIOLATION");
        assert_eq!(body["error"]["details"]["ok"], false);
        assert_eq!(body["error"]["details"]["suggested_adjustment"], "adjust");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(!body.to_string().contains("secret detail"));
    }
}
