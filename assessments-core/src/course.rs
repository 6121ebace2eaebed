//! Course lookups: question-library collection and roster

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::RosterEntry;
use crate::store::{DocumentStore, Filter, ID_FIELD, StoreError};

/// Collection holding one document per course
pub const COURSES_COLLECTION: &str = "courses";
/// Collection holding one document per (course, student) enrollment
pub const ENROLLMENTS_COLLECTION: &str = "enrollments";

/// Errors from course lookups
#[derive(Error, Debug)]
pub enum CourseError {
    #[error("Course not found: {0}")]
    NotFound(String),

    #[error("Course {course_id} is missing field {field}")]
    MissingField { course_id: String, field: &'static str },

    #[error("Invalid roster entry for course {course_id}: {source}")]
    InvalidRoster {
        course_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Course data needed by the assessment service
#[async_trait]
pub trait CourseDirectory: Send + Sync {
    /// Name of the collection holding the course's question library
    async fn question_library_collection(&self, course_id: &str) -> Result<String, CourseError>;

    /// Every student enrolled in the course, in enrollment order
    async fn course_students(&self, course_id: &str) -> Result<Vec<RosterEntry>, CourseError>;
}

/// [`CourseDirectory`] reading the `courses` and `enrollments` collections
pub struct StoreCourseDirectory {
    store: Arc<dyn DocumentStore>,
}

impl StoreCourseDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CourseDirectory for StoreCourseDirectory {
    async fn question_library_collection(&self, course_id: &str) -> Result<String, CourseError> {
        let course = self
            .store
            .find_one(COURSES_COLLECTION, &Filter::by_id(course_id))
            .await?
            .ok_or_else(|| CourseError::NotFound(course_id.to_string()))?;

        course
            .get("question_library")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| CourseError::MissingField {
                course_id: course_id.to_string(),
                field: "question_library",
            })
    }

    async fn course_students(&self, course_id: &str) -> Result<Vec<RosterEntry>, CourseError> {
        let enrollments = self
            .store
            .find(
                ENROLLMENTS_COLLECTION,
                &Filter::new().eq("course_id", course_id),
            )
            .await?;

        enrollments
            .into_iter()
            .map(|mut doc| {
                doc.remove(ID_FIELD);
                doc.remove("course_id");
                serde_json::from_value(serde_json::Value::Object(doc)).map_err(|source| {
                    CourseError::InvalidRoster {
                        course_id: course_id.to_string(),
                        source,
                    }
                })
            })
            .collect()
    }
}
