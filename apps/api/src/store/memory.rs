//! In-memory [`Store`] used for local runs without `DATABASE_URL` and in tests.
//!
//! One `RwLock` guards every table, so each trait call is atomic with
//! respect to the others.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::checklist::evaluator::ChecklistEvaluation;
use crate::models::context::{CareerContext, ContextUpsert};
use crate::models::decision::{Decision, NewDecision};
use crate::models::plan::{ChecklistResult, Plan, PlanStatus};
use crate::store::{Store, StoreError};

#[derive(Default)]
struct Tables {
    contexts: HashMap<Uuid, CareerContext>,
    decisions: Vec<Decision>,
    /// Insertion order doubles as creation order.
    plans: Vec<Plan>,
    checklists: Vec<ChecklistResult>,
}

/// Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decisions recorded for a user, oldest first.
    #[cfg(test)]
    pub async fn decisions_for(&self, user_id: Uuid) -> Vec<Decision> {
        self.tables
            .read()
            .await
            .decisions
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect()
    }

    /// All checklist results of a plan, oldest first.
    #[cfg(test)]
    pub async fn checklists_for(&self, plan_id: Uuid) -> Vec<ChecklistResult> {
        self.tables
            .read()
            .await
            .checklists
            .iter()
            .filter(|c| c.plan_id == plan_id)
            .cloned()
            .collect()
    }
}

fn new_plan(user_id: Uuid, plan_json: Value) -> Plan {
    Plan {
        id: Uuid::new_v4(),
        user_id,
        plan_json,
        status: PlanStatus::Draft,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_context(&self, user_id: Uuid) -> Result<Option<CareerContext>, StoreError> {
        Ok(self.tables.read().await.contexts.get(&user_id).cloned())
    }

    async fn upsert_context(
        &self,
        user_id: Uuid,
        input: ContextUpsert,
    ) -> Result<CareerContext, StoreError> {
        let context = CareerContext {
            user_id,
            primary_goal: input.primary_goal,
            success_definition: input.success_definition,
            constraints: input.constraints,
            horizon_days: input.horizon_days,
            updated_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .contexts
            .insert(user_id, context.clone());
        Ok(context)
    }

    async fn create_decision(
        &self,
        user_id: Uuid,
        input: NewDecision,
    ) -> Result<Decision, StoreError> {
        let decision = Decision {
            id: Uuid::new_v4(),
            user_id,
            options: input.options,
            chosen_option: input.chosen_option,
            abandoned_options: input.abandoned_options,
            justification: input.justification,
            created_at: Utc::now(),
        };
        self.tables.write().await.decisions.push(decision.clone());
        Ok(decision)
    }

    async fn create_plan(&self, user_id: Uuid, plan_json: Value) -> Result<Plan, StoreError> {
        let plan = new_plan(user_id, plan_json);
        self.tables.write().await.plans.push(plan.clone());
        Ok(plan)
    }

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<Plan>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .plans
            .iter()
            .find(|p| p.id == plan_id && p.user_id == user_id)
            .cloned())
    }

    async fn upsert_draft_plan(
        &self,
        user_id: Uuid,
        plan_json: Value,
    ) -> Result<Plan, StoreError> {
        let mut tables = self.tables.write().await;
        let newest_draft = tables
            .plans
            .iter_mut()
            .rev()
            .find(|p| p.user_id == user_id && p.status == PlanStatus::Draft);

        match newest_draft {
            Some(plan) => {
                plan.plan_json = plan_json;
                Ok(plan.clone())
            }
            None => {
                let plan = new_plan(user_id, plan_json);
                tables.plans.push(plan.clone());
                Ok(plan)
            }
        }
    }

    async fn record_evaluation(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        evaluation: &ChecklistEvaluation,
    ) -> Result<Option<(Plan, ChecklistResult)>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(plan) = tables
            .plans
            .iter_mut()
            .find(|p| p.id == plan_id && p.user_id == user_id)
        else {
            return Ok(None);
        };

        plan.status = evaluation.verdict.into();
        let plan = plan.clone();

        let result = ChecklistResult {
            id: Uuid::new_v4(),
            plan_id,
            clarity: evaluation.clarity,
            focus: evaluation.focus,
            actionability: evaluation.actionability,
            feasibility: evaluation.feasibility,
            risk_awareness: evaluation.risk_awareness,
            coherence: evaluation.coherence,
            verdict: evaluation.verdict,
            feedback: evaluation.feedback.clone(),
            created_at: Utc::now(),
        };
        tables.checklists.push(result.clone());

        Ok(Some((plan, result)))
    }

    async fn latest_checklist(&self, plan_id: Uuid) -> Result<Option<ChecklistResult>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .checklists
            .iter()
            .rev()
            .find(|c| c.plan_id == plan_id)
            .cloned())
    }
}
