//! Persistence boundary.
//!
//! Handlers depend on the [`Store`] trait, never on a concrete backend.
//! Every read-modify-write (context upsert, draft replacement, evaluation)
//! is a single trait call so each backend can make it atomic.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::checklist::evaluator::ChecklistEvaluation;
use crate::models::context::{CareerContext, ContextUpsert};
use crate::models::decision::{Decision, NewDecision};
use crate::models::plan::{ChecklistResult, Plan};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Storage for the workflow entities, always scoped by user.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_context(&self, user_id: Uuid) -> Result<Option<CareerContext>, StoreError>;

    /// Inserts the user's context or overwrites it in place.
    async fn upsert_context(
        &self,
        user_id: Uuid,
        input: ContextUpsert,
    ) -> Result<CareerContext, StoreError>;

    /// Appends a decision. Decisions are never updated.
    async fn create_decision(
        &self,
        user_id: Uuid,
        input: NewDecision,
    ) -> Result<Decision, StoreError>;

    /// Creates a new plan in `draft` status.
    async fn create_plan(&self, user_id: Uuid, plan_json: Value) -> Result<Plan, StoreError>;

    /// Returns the plan only if it belongs to `user_id`.
    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<Plan>, StoreError>;

    /// Replaces the payload of the user's newest draft, creating one if none exists.
    async fn upsert_draft_plan(&self, user_id: Uuid, plan_json: Value)
        -> Result<Plan, StoreError>;

    /// Appends a checklist result and sets the plan status from its verdict.
    /// Returns `None` when the plan does not exist for this user.
    async fn record_evaluation(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        evaluation: &ChecklistEvaluation,
    ) -> Result<Option<(Plan, ChecklistResult)>, StoreError>;

    /// Most recent checklist result for a plan.
    async fn latest_checklist(&self, plan_id: Uuid) -> Result<Option<ChecklistResult>, StoreError>;
}
