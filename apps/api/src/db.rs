use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

/// Idempotent schema. Applied on every startup.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS career_contexts (
    user_id            UUID PRIMARY KEY,
    primary_goal       TEXT NOT NULL,
    success_definition TEXT NOT NULL,
    constraints        JSONB NOT NULL DEFAULT '{}'::jsonb,
    horizon_days       INTEGER CHECK (horizon_days IS NULL OR horizon_days <= 90),
    updated_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS decisions (
    id                UUID PRIMARY KEY,
    user_id           UUID NOT NULL,
    options           TEXT[] NOT NULL,
    chosen_option     TEXT NOT NULL,
    abandoned_options TEXT[] NOT NULL,
    justification     TEXT NOT NULL,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS plans (
    id         UUID PRIMARY KEY,
    user_id    UUID NOT NULL,
    plan_json  JSONB NOT NULL,
    status     TEXT NOT NULL DEFAULT 'draft'
               CHECK (status IN ('draft', 'approved', 'rejected')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS checklist_results (
    id             UUID PRIMARY KEY,
    plan_id        UUID NOT NULL REFERENCES plans(id),
    clarity        BOOLEAN NOT NULL,
    focus          BOOLEAN NOT NULL,
    actionability  BOOLEAN NOT NULL,
    feasibility    BOOLEAN NOT NULL,
    risk_awareness BOOLEAN NOT NULL,
    coherence      BOOLEAN NOT NULL,
    verdict        TEXT NOT NULL CHECK (verdict IN ('approved', 'rejected')),
    feedback       TEXT NOT NULL,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_decisions_user ON decisions (user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_plans_user_status ON plans (user_id, status, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_checklist_results_plan ON checklist_results (plan_id, created_at DESC);
"#;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the tables and indexes if they do not exist yet.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    // A plain &str runs over the simple query protocol, which accepts
    // several statements in one round trip.
    pool.execute(SCHEMA).await?;
    info!("Database schema is up to date");
    Ok(())
}
