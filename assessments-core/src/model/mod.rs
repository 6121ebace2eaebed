//! Domain types for assessments, filters and grades

mod assessment;
mod filter;
mod grade;
pub(crate) mod timestamp;

pub use assessment::{
    AssessmentDetails, AssessmentId, AssessmentIdRequest, AssessmentPayload, AssessmentRecord,
    AssessmentSummary, AssessmentType, EditAssessment, QuestionRef, Section, SectionDetails,
};
pub use filter::{ListAssessmentsRequest, ListFilter};
pub use grade::{AssessmentCourse, GradeRecord, GradeSubmission, RosterEntry, StudentMark};
