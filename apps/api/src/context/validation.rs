use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::decision::engine::{has_constraints, MAX_HORIZON_DAYS};
use crate::models::context::ContextUpsert;

/// Body of `POST /api/v1/context`. Text fields default to empty so that
/// every missing field is reported, not just the first.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub primary_goal: String,
    #[serde(default)]
    pub success_definition: String,
    #[serde(default)]
    pub constraints: Value,
    #[serde(default)]
    pub horizon_days: Option<i32>,
}

/// Validates a context payload and returns the trimmed values to store.
///
/// All failures are collected, in the order goal, horizon, success
/// definition, constraints.
pub fn validate_context(req: &ContextRequest) -> Result<ContextUpsert, Vec<String>> {
    let primary_goal = req.primary_goal.trim();
    let success_definition = req.success_definition.trim();
    let mut errors = Vec::new();

    if primary_goal.is_empty() {
        errors.push("`primary_goal` doit être renseigné.".to_string());
    }
    if req.horizon_days.is_some_and(|days| days > MAX_HORIZON_DAYS) {
        errors.push("`horizon_days` doit être inférieur ou égal à 90.".to_string());
    }
    if success_definition.is_empty() {
        errors.push("`success_definition` doit être renseigné.".to_string());
    }
    if !has_constraints(&req.constraints) {
        errors.push("`constraints` doit contenir au moins une contrainte.".to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ContextUpsert {
        primary_goal: primary_goal.to_string(),
        success_definition: success_definition.to_string(),
        constraints: req.constraints.clone(),
        horizon_days: req.horizon_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(goal: &str, success: &str, constraints: Value, horizon: Option<i32>) -> ContextRequest {
        ContextRequest {
            user_id: Uuid::new_v4(),
            primary_goal: goal.to_string(),
            success_definition: success.to_string(),
            constraints,
            horizon_days: horizon,
        }
    }

    #[test]
    fn test_valid_context_is_trimmed() {
        let req = request(
            "  Lancer une activité freelance ",
            " Signer 2 clients",
            json!({"temps": "8h/semaine"}),
            Some(90),
        );
        let upsert = validate_context(&req).unwrap();
        assert_eq!(upsert.primary_goal, "Lancer une activité freelance");
        assert_eq!(upsert.success_definition, "Signer 2 clients");
        assert_eq!(upsert.horizon_days, Some(90));
    }

    #[test]
    fn test_all_errors_reported_in_order() {
        let errors = validate_context(&request("  ", "", json!({}), Some(120))).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "`primary_goal` doit être renseigné.",
                "`horizon_days` doit être inférieur ou égal à 90.",
                "`success_definition` doit être renseigné.",
                "`constraints` doit contenir au moins une contrainte.",
            ]
        );
    }

    #[test]
    fn test_constraints_must_be_non_empty_object() {
        for constraints in [json!(null), json!([]), json!("temps"), json!({})] {
            let errors =
                validate_context(&request("But", "Succès", constraints, None)).unwrap_err();
            assert_eq!(errors.len(), 1);
        }
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let req: ContextRequest =
            serde_json::from_value(json!({"user_id": Uuid::new_v4()})).unwrap();
        assert_eq!(validate_context(&req).unwrap_err().len(), 3);
    }
}
