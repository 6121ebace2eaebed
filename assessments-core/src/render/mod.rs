//! Rendering seam: produce the question paper for an assessment

mod latex;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{AssessmentId, AssessmentPayload, AssessmentType};

pub use latex::LatexRenderer;

/// Errors from the rendering collaborator
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Renderer failed: {0}")]
    Failed(String),
}

/// Renders an assessment and stores the result, returning its storage reference
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render_assessment(
        &self,
        assessment_type: &AssessmentType,
        assessment_id: &AssessmentId,
        assessment: &AssessmentPayload,
    ) -> Result<String, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_renderer_is_object_safe() {
        fn _takes_boxed(_: Box<dyn DocumentRenderer>) {}
    }
}
