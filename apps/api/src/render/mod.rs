//! Plan export. Handlers only see the [`PlanRenderer`] trait; the PDF writer
//! is the default implementation.

pub mod document;
pub mod handlers;
pub mod pdf;

use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

use crate::models::plan::ChecklistResult;

pub use pdf::PdfRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("page layout leaves no room for text")]
    Layout,
}

pub trait PlanRenderer: Send + Sync {
    /// MIME type of the rendered document.
    fn content_type(&self) -> &'static str;

    /// File extension used in the download name.
    fn extension(&self) -> &'static str;

    fn render(
        &self,
        plan_json: &Value,
        checklist: Option<&ChecklistResult>,
    ) -> Result<Bytes, RenderError>;
}
