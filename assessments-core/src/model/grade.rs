//! Grade records and roster entries

use serde::{Deserialize, Serialize};

use crate::store::Document;

/// One student's grade as submitted for bulk grading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentMark {
    pub student_id: String,
    pub marks: f64,
    pub status: String,
}

/// Bulk grading request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSubmission {
    pub assessment_id: String,
    pub course: String,
    pub marks: Vec<StudentMark>,
}

/// Assessment identifier scoped to a course (delete, student grades)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentCourse {
    pub assessment_id: String,
    pub course: String,
}

/// Per-student outcome for one assessment in one course.
///
/// `marks`/`status` are `None` for students who have not been graded yet.
/// Fields beyond the fixed set (roster profile data, custom grading fields)
/// are carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub assessment_id: String,
    pub course_id: String,
    pub student_id: String,
    pub marks: Option<f64>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

impl GradeRecord {
    pub fn graded(assessment_id: &str, course_id: &str, mark: StudentMark) -> Self {
        Self {
            assessment_id: assessment_id.to_string(),
            course_id: course_id.to_string(),
            student_id: mark.student_id,
            marks: Some(mark.marks),
            status: Some(mark.status),
            extra: Document::new(),
        }
    }

    /// Placeholder for a roster student without a stored grade
    pub fn placeholder(assessment_id: &str, course_id: &str, student: &RosterEntry) -> Self {
        Self {
            assessment_id: assessment_id.to_string(),
            course_id: course_id.to_string(),
            student_id: student.student_id.clone(),
            marks: None,
            status: None,
            extra: student.profile.clone(),
        }
    }

    pub fn is_graded(&self) -> bool {
        self.marks.is_some() || self.status.is_some()
    }
}

/// Student enrolled in a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub student_id: String,
    #[serde(flatten)]
    pub profile: Document,
}
