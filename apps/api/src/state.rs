use std::sync::Arc;

use crate::llm_client::LlmClient;
use crate::render::PlanRenderer;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Export backend. Default: PdfRenderer.
    pub renderer: Arc<dyn PlanRenderer>,
    pub llm: LlmClient,
}
