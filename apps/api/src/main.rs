use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use copilot::config::Config;
use copilot::db::{create_pool, run_migrations};
use copilot::generation::policy::verify_templates;
use copilot::llm_client::LlmClient;
use copilot::render::PdfRenderer;
use copilot::routes::build_router;
use copilot::state::AppState;
use copilot::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast on malformed env vars
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Copilot API v{}", env!("CARGO_PKG_VERSION"));

    // Refuse to serve if a fixed deliverable template breaks the content policy
    verify_templates()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let llm = LlmClient::new(config.llm.clone())?;
    info!(
        "Completion client initialized (mode: {}, model: {})",
        llm.mode(),
        llm.model()
    );

    let state = AppState {
        store,
        renderer: Arc::new(PdfRenderer::default()),
        llm,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
