//! Error types for assessments-core

use thiserror::Error;

use crate::course::CourseError;
use crate::render::RenderError;
use crate::storage::StorageError;
use crate::store::StoreError;

/// Top-level error type for assessment operations
#[derive(Error, Debug)]
pub enum AssessmentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A stub references a question missing from the course library
    #[error("Question {question_id} not found in library {library}")]
    QuestionNotFound { question_id: String, library: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Course error: {0}")]
    Course(#[from] CourseError),
}

impl AssessmentError {
    /// True for errors caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// True for errors that mean a referenced record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::QuestionNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AssessmentError::QuestionNotFound {
            question_id: "q9".into(),
            library: "math_questions".into(),
        };
        assert_eq!(err.to_string(), "Question q9 not found in library math_questions");
        assert!(err.is_not_found());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_store_error_conversion() {
        let err: AssessmentError = StoreError::Backend("connection reset".into()).into();
        assert!(err.to_string().contains("connection reset"));
        assert!(!err.is_not_found());
    }
}
