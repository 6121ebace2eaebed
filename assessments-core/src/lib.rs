//! assessments-core: Core library for the assessment service
//!
//! This crate provides the domain and orchestration layer:
//!
//! - **Service** - [`AssessmentService`] for create, list, details, edit, grading and delete
//! - **Document store** - [`DocumentStore`] trait with [`MemoryDocumentStore`] and, behind the
//!   `mongo` feature, a MongoDB backend
//! - **Collaborators** - [`DocumentRenderer`], [`ObjectStorage`] and [`CourseDirectory`] seams
//! - **Auth** - [`JwtValidator`] and [`AuthContext`] for bearer-token callers
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use assessments_core::{
//!     AssessmentService, AssessmentType, LatexRenderer, MemoryDocumentStore, SignedUrlIssuer,
//!     StorageConfig, StoreCourseDirectory,
//! };
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryDocumentStore::new());
//!     let storage = SignedUrlIssuer::new(&StorageConfig {
//!         signing_secret: "change-me".into(),
//!         ..StorageConfig::default()
//!     })?;
//!     let service = AssessmentService::new(
//!         store.clone(),
//!         Arc::new(LatexRenderer::new("papers")),
//!         Arc::new(storage),
//!         Arc::new(StoreCourseDirectory::new(store)),
//!     );
//!
//!     let quiz = AssessmentType::parse("quiz")?;
//!     let rows = service.list(&quiz, &Default::default()).await?;
//!     println!("{} quizzes", rows.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               AssessmentService              │
//! │  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │ query_builder│  │  DocumentRenderer    │  │
//! │  └──────┬───────┘  └──────────────────────┘  │
//! │  ┌──────▼───────┐  ┌──────────┐ ┌─────────┐  │
//! │  │DocumentStore │  │ Storage  │ │ Courses │  │
//! │  └──────────────┘  └──────────┘ └─────────┘  │
//! └──────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod course;
pub mod error;
pub mod model;
pub mod query_builder;
pub mod render;
pub mod service;
pub mod storage;
pub mod store;

// Re-export key types for convenience
pub use auth::{AuthConfig, AuthContext, AuthError, CallerIdentity, JwtValidator};
pub use course::{CourseDirectory, CourseError, StoreCourseDirectory};
pub use error::AssessmentError;
pub use model::{
    AssessmentCourse, AssessmentDetails, AssessmentId, AssessmentIdRequest, AssessmentPayload,
    AssessmentSummary, AssessmentType, EditAssessment, GradeRecord, GradeSubmission,
    ListAssessmentsRequest, ListFilter,
};
pub use render::{DocumentRenderer, LatexRenderer, RenderError};
pub use service::{AssessmentService, DeleteOutcome};
pub use storage::{ObjectStorage, SignedUrlIssuer, StorageConfig, StorageError};
#[cfg(feature = "mongo")]
pub use store::MongoDocumentStore;
pub use store::{BulkWriteResult, DocumentStore, MemoryDocumentStore, StoreError};
