//! Assessment orchestration over the store, renderer, storage and course seams

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::course::CourseDirectory;
use crate::error::AssessmentError;
use crate::model::{
    AssessmentCourse, AssessmentDetails, AssessmentId, AssessmentPayload, AssessmentRecord,
    AssessmentSummary, AssessmentType, EditAssessment, GradeRecord, GradeSubmission, ListFilter,
    QuestionRef, SectionDetails,
};
use crate::query_builder::{assessment_list_pipeline, grading_operations};
use crate::render::DocumentRenderer;
use crate::storage::ObjectStorage;
use crate::store::{
    BulkWriteResult, Document, DocumentStore, Filter, ID_FIELD, expose_id, from_document,
    to_document,
};

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Grade records removed alongside the assessment (0 if cleanup failed)
    pub grades_deleted: u64,
}

impl DeleteOutcome {
    pub fn message(&self) -> String {
        format!(
            "Assessment and associated {} student grade documents deleted successfully",
            self.grades_deleted
        )
    }
}

/// Creates, reads, edits, grades and deletes assessments
pub struct AssessmentService {
    store: Arc<dyn DocumentStore>,
    renderer: Arc<dyn DocumentRenderer>,
    storage: Arc<dyn ObjectStorage>,
    courses: Arc<dyn CourseDirectory>,
}

impl AssessmentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        renderer: Arc<dyn DocumentRenderer>,
        storage: Arc<dyn ObjectStorage>,
        courses: Arc<dyn CourseDirectory>,
    ) -> Self {
        Self {
            store,
            renderer,
            storage,
            courses,
        }
    }

    /// Validate, render and persist a new assessment
    pub async fn create(
        &self,
        assessment_type: &AssessmentType,
        payload: AssessmentPayload,
    ) -> Result<AssessmentId, AssessmentError> {
        payload.validate()?;

        let id = AssessmentId::generate();
        let question_paper = self
            .renderer
            .render_assessment(assessment_type, &id, &payload)
            .await?;

        let record = AssessmentRecord::new(id, payload, question_paper, Utc::now());
        self.store
            .insert_one(&assessment_type.collection(), to_document(&record)?)
            .await?;

        info!(assessment_type = %assessment_type, assessment_id = %id, "Assessment created");
        Ok(id)
    }

    /// Summaries matching the filter, newest first
    pub async fn list(
        &self,
        assessment_type: &AssessmentType,
        filter: &ListFilter,
    ) -> Result<Vec<AssessmentSummary>, AssessmentError> {
        let pipeline = assessment_list_pipeline(filter)?;
        let pipeline_json = Value::Array(pipeline.to_json());
        debug!(
            assessment_type = %assessment_type,
            pipeline = %pipeline_json,
            "Listing assessments"
        );

        let docs = self
            .store
            .aggregate(&assessment_type.collection(), &pipeline)
            .await?;

        docs.into_iter()
            .map(|doc| from_document(expose_id(doc)).map_err(AssessmentError::from))
            .collect()
    }

    /// Full assessment with questions resolved and a signed paper URL
    pub async fn details(
        &self,
        assessment_type: &AssessmentType,
        assessment_id: &str,
    ) -> Result<AssessmentDetails, AssessmentError> {
        let id: AssessmentId = assessment_id.parse()?;
        let doc = self
            .store
            .find_one(&assessment_type.collection(), &Filter::by_id(id.to_string()))
            .await?
            .ok_or_else(|| {
                AssessmentError::NotFound("No Data found for given assessment".into())
            })?;
        let record: AssessmentRecord = from_document(doc)?;

        let library = self
            .courses
            .question_library_collection(&record.course)
            .await?;
        let question_ids = record.question_ids();
        debug!(library = %library, count = question_ids.len(), "Resolving questions");

        let lookup: HashMap<String, Document> = self
            .store
            .find(&library, &Filter::new().one_of(ID_FIELD, question_ids))
            .await?
            .into_iter()
            .map(expose_id)
            .filter_map(|doc| {
                let id = doc.get("id")?.as_str()?.to_string();
                Some((id, doc))
            })
            .collect();

        let questions = record
            .questions
            .into_iter()
            .map(|section| {
                let questions = section
                    .questions
                    .into_iter()
                    .map(|stub| merge_question(stub, &lookup, &library))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SectionDetails {
                    section_name: section.section_name,
                    description: section.description,
                    questions,
                })
            })
            .collect::<Result<Vec<_>, AssessmentError>>()?;

        let question_paper = self.storage.signed_url(&record.question_paper).await?;

        Ok(AssessmentDetails {
            id: record.id,
            name: record.name,
            course: record.course,
            start_date: record.start_date,
            end_date: record.end_date,
            total_time: record.total_time,
            total_marks: record.total_marks,
            lessons: record.lessons,
            questions,
            question_paper,
            last_updated: record.last_updated,
        })
    }

    /// Re-render and replace an assessment wholesale
    pub async fn edit(
        &self,
        assessment_type: &AssessmentType,
        request: EditAssessment,
    ) -> Result<AssessmentId, AssessmentError> {
        let id: AssessmentId = request.assessment_id.parse()?;
        request.assessment.validate()?;

        let question_paper = self
            .renderer
            .render_assessment(assessment_type, &id, &request.assessment)
            .await?;

        let record = AssessmentRecord::new(id, request.assessment, question_paper, Utc::now());
        let result = self
            .store
            .replace_one(
                &assessment_type.collection(),
                &Filter::by_id(id.to_string()),
                to_document(&record)?,
            )
            .await?;

        if result.matched_count == 0 {
            warn!(
                assessment_id = %id,
                question_paper = %record.question_paper,
                "Edit matched no assessment, rendered paper is orphaned"
            );
            return Err(AssessmentError::NotFound("Assessment not found".into()));
        }

        info!(assessment_type = %assessment_type, assessment_id = %id, "Assessment updated");
        Ok(id)
    }

    /// Upsert one grade record per student
    pub async fn grade(
        &self,
        assessment_type: &AssessmentType,
        submission: GradeSubmission,
    ) -> Result<BulkWriteResult, AssessmentError> {
        let id: AssessmentId = submission.assessment_id.parse()?;
        if submission.marks.is_empty() {
            return Err(AssessmentError::InvalidInput(
                "At least one student grade is required".into(),
            ));
        }

        let library = self
            .courses
            .question_library_collection(&submission.course)
            .await?;
        let assessment_id = id.to_string();
        let grades: Vec<GradeRecord> = submission
            .marks
            .into_iter()
            .map(|mark| GradeRecord::graded(&assessment_id, &submission.course, mark))
            .collect();

        let result = self
            .store
            .bulk_write(
                &assessment_type.grades_collection(&library),
                grading_operations(&grades)?,
            )
            .await?;

        info!(
            assessment_id = %id,
            matched = result.matched_count,
            upserted = result.upserted_count,
            "Grades recorded"
        );
        Ok(result)
    }

    /// Stored grades followed by a placeholder for every ungraded student
    pub async fn student_grades(
        &self,
        assessment_type: &AssessmentType,
        request: AssessmentCourse,
    ) -> Result<Vec<GradeRecord>, AssessmentError> {
        let id: AssessmentId = request.assessment_id.parse()?;
        let assessment_id = id.to_string();

        let library = self
            .courses
            .question_library_collection(&request.course)
            .await?;
        let roster = self.courses.course_students(&request.course).await?;

        let stored = self
            .store
            .find(
                &assessment_type.grades_collection(&library),
                &grades_filter(&assessment_id, &request.course),
            )
            .await?;

        let mut grades = stored
            .into_iter()
            .map(|mut doc| {
                doc.remove(ID_FIELD);
                from_document::<GradeRecord>(doc)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let graded: HashSet<String> = grades.iter().map(|g| g.student_id.clone()).collect();
        grades.extend(
            roster
                .iter()
                .filter(|student| !graded.contains(&student.student_id))
                .map(|student| GradeRecord::placeholder(&assessment_id, &request.course, student)),
        );

        Ok(grades)
    }

    /// Delete an assessment, then its grade records on a best-effort basis
    pub async fn delete(
        &self,
        assessment_type: &AssessmentType,
        request: AssessmentCourse,
    ) -> Result<DeleteOutcome, AssessmentError> {
        let id: AssessmentId = request.assessment_id.parse()?;

        let deleted = self
            .store
            .delete_one(&assessment_type.collection(), &Filter::by_id(id.to_string()))
            .await?;
        if deleted.deleted_count == 0 {
            return Err(AssessmentError::NotFound("Assessment not found".into()));
        }

        let grades_deleted = match self
            .delete_grades(assessment_type, &id, &request.course)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!(assessment_id = %id, error = %e, "Failed to delete grade records");
                0
            }
        };

        info!(assessment_id = %id, grades_deleted, "Assessment deleted");
        Ok(DeleteOutcome { grades_deleted })
    }

    async fn delete_grades(
        &self,
        assessment_type: &AssessmentType,
        id: &AssessmentId,
        course: &str,
    ) -> Result<u64, AssessmentError> {
        let library = self.courses.question_library_collection(course).await?;
        let result = self
            .store
            .delete_many(
                &assessment_type.grades_collection(&library),
                &grades_filter(&id.to_string(), course),
            )
            .await?;
        Ok(result.deleted_count)
    }
}

fn grades_filter(assessment_id: &str, course_id: &str) -> Filter {
    Filter::new()
        .eq("assessment_id", assessment_id)
        .eq("course_id", course_id)
}

/// Overlay the library question on its stub; `marks` stays the stub's
fn merge_question(
    stub: QuestionRef,
    lookup: &HashMap<String, Document>,
    library: &str,
) -> Result<Document, AssessmentError> {
    let resolved =
        lookup
            .get(&stub.question_id)
            .ok_or_else(|| AssessmentError::QuestionNotFound {
                question_id: stub.question_id.clone(),
                library: library.to_string(),
            })?;

    let mut merged = to_document(&stub)?;
    for (key, value) in resolved {
        if key != "marks" {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(merged)
}
