//! PostgreSQL [`Store`] backed by sqlx.
//!
//! Statuses and verdicts are stored as TEXT and parsed on read; a value
//! outside the known set surfaces as [`StoreError::Corrupt`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::checklist::evaluator::ChecklistEvaluation;
use crate::models::context::{CareerContext, ContextUpsert};
use crate::models::decision::{Decision, NewDecision};
use crate::models::plan::{ChecklistResult, Plan, PlanStatus, Verdict};
use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PlanRecord {
    id: Uuid,
    user_id: Uuid,
    plan_json: Value,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PlanRecord> for Plan {
    type Error = StoreError;

    fn try_from(row: PlanRecord) -> Result<Self, Self::Error> {
        Ok(Plan {
            id: row.id,
            user_id: row.user_id,
            plan_json: row.plan_json,
            status: row.status.parse::<PlanStatus>().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ChecklistRecord {
    id: Uuid,
    plan_id: Uuid,
    clarity: bool,
    focus: bool,
    actionability: bool,
    feasibility: bool,
    risk_awareness: bool,
    coherence: bool,
    verdict: String,
    feedback: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChecklistRecord> for ChecklistResult {
    type Error = StoreError;

    fn try_from(row: ChecklistRecord) -> Result<Self, Self::Error> {
        Ok(ChecklistResult {
            id: row.id,
            plan_id: row.plan_id,
            clarity: row.clarity,
            focus: row.focus,
            actionability: row.actionability,
            feasibility: row.feasibility,
            risk_awareness: row.risk_awareness,
            coherence: row.coherence,
            verdict: row.verdict.parse::<Verdict>().map_err(StoreError::Corrupt)?,
            feedback: row.feedback,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_context(&self, user_id: Uuid) -> Result<Option<CareerContext>, StoreError> {
        Ok(sqlx::query_as::<_, CareerContext>(
            "SELECT * FROM career_contexts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn upsert_context(
        &self,
        user_id: Uuid,
        input: ContextUpsert,
    ) -> Result<CareerContext, StoreError> {
        let context = sqlx::query_as::<_, CareerContext>(
            r#"
            INSERT INTO career_contexts
                (user_id, primary_goal, success_definition, constraints, horizon_days, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                primary_goal = EXCLUDED.primary_goal,
                success_definition = EXCLUDED.success_definition,
                constraints = EXCLUDED.constraints,
                horizon_days = EXCLUDED.horizon_days,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&input.primary_goal)
        .bind(&input.success_definition)
        .bind(&input.constraints)
        .bind(input.horizon_days)
        .fetch_one(&self.pool)
        .await?;

        info!("Upserted career context for user {user_id}");
        Ok(context)
    }

    async fn create_decision(
        &self,
        user_id: Uuid,
        input: NewDecision,
    ) -> Result<Decision, StoreError> {
        let decision = sqlx::query_as::<_, Decision>(
            r#"
            INSERT INTO decisions
                (id, user_id, options, chosen_option, abandoned_options, justification)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.options)
        .bind(&input.chosen_option)
        .bind(&input.abandoned_options)
        .bind(&input.justification)
        .fetch_one(&self.pool)
        .await?;

        info!("Recorded decision {} for user {user_id}", decision.id);
        Ok(decision)
    }

    async fn create_plan(&self, user_id: Uuid, plan_json: Value) -> Result<Plan, StoreError> {
        let row = sqlx::query_as::<_, PlanRecord>(
            "INSERT INTO plans (id, user_id, plan_json, status) VALUES ($1, $2, $3, 'draft') RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&plan_json)
        .fetch_one(&self.pool)
        .await?;

        info!("Created plan {} for user {user_id}", row.id);
        row.try_into()
    }

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<Plan>, StoreError> {
        sqlx::query_as::<_, PlanRecord>("SELECT * FROM plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Plan::try_from)
            .transpose()
    }

    async fn upsert_draft_plan(
        &self,
        user_id: Uuid,
        plan_json: Value,
    ) -> Result<Plan, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serialises concurrent draft upserts of the same user so at most one
        // draft gets inserted.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM plans
            WHERE user_id = $1 AND status = 'draft'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match existing {
            Some(plan_id) => {
                sqlx::query_as::<_, PlanRecord>(
                    "UPDATE plans SET plan_json = $2 WHERE id = $1 RETURNING *",
                )
                .bind(plan_id)
                .bind(&plan_json)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, PlanRecord>(
                    "INSERT INTO plans (id, user_id, plan_json, status) VALUES ($1, $2, $3, 'draft') RETURNING *",
                )
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(&plan_json)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        info!("Stored draft plan {} for user {user_id}", row.id);
        row.try_into()
    }

    async fn record_evaluation(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        evaluation: &ChecklistEvaluation,
    ) -> Result<Option<(Plan, ChecklistResult)>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let status = PlanStatus::from(evaluation.verdict);
        let plan = sqlx::query_as::<_, PlanRecord>(
            "UPDATE plans SET status = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(plan_id)
        .bind(user_id)
        .bind(status.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(plan) = plan else {
            tx.rollback().await?;
            return Ok(None);
        };

        let result = sqlx::query_as::<_, ChecklistRecord>(
            r#"
            INSERT INTO checklist_results
                (id, plan_id, clarity, focus, actionability, feasibility,
                 risk_awareness, coherence, verdict, feedback)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(plan_id)
        .bind(evaluation.clarity)
        .bind(evaluation.focus)
        .bind(evaluation.actionability)
        .bind(evaluation.feasibility)
        .bind(evaluation.risk_awareness)
        .bind(evaluation.coherence)
        .bind(evaluation.verdict.as_str())
        .bind(&evaluation.feedback)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            "Evaluated plan {plan_id} for user {user_id}: {}",
            evaluation.verdict
        );
        Ok(Some((plan.try_into()?, result.try_into()?)))
    }

    async fn latest_checklist(&self, plan_id: Uuid) -> Result<Option<ChecklistResult>, StoreError> {
        sqlx::query_as::<_, ChecklistRecord>(
            r#"
            SELECT * FROM checklist_results
            WHERE plan_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?
        .map(ChecklistResult::try_from)
        .transpose()
    }
}
