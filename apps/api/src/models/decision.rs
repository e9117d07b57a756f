use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only record of a forced tradeoff.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Decision {
    pub id: Uuid,
    pub user_id: Uuid,
    pub options: Vec<String>,
    pub chosen_option: String,
    pub abandoned_options: Vec<String>,
    pub justification: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDecision {
    pub options: Vec<String>,
    pub chosen_option: String,
    pub abandoned_options: Vec<String>,
    pub justification: String,
}
