use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// The career context of one user. At most one row per user; every upsert
/// overwrites it in place and it is never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareerContext {
    pub user_id: Uuid,
    pub primary_goal: String,
    pub success_definition: String,
    /// JSON object of named constraints (time, budget, energy...).
    pub constraints: Value,
    pub horizon_days: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

/// Already-validated, trimmed values for an upsert.
#[derive(Debug, Clone)]
pub struct ContextUpsert {
    pub primary_goal: String,
    pub success_definition: String,
    pub constraints: Value,
    pub horizon_days: Option<i32>,
}
