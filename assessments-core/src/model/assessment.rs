//! Assessment documents and the request payloads that produce them

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;
use crate::error::AssessmentError;
use crate::store::Document;

/// Longest accepted assessment type discriminator
const MAX_TYPE_LEN: usize = 64;

/// Assessment kind taken from the route (`quiz`, `exam`, ...).
///
/// Used to derive collection names, so only ASCII alphanumerics, `_` and `-`
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssessmentType(String);

impl AssessmentType {
    pub fn parse(raw: &str) -> Result<Self, AssessmentError> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_TYPE_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(AssessmentError::InvalidInput(format!(
                "Invalid assessment type: {raw}"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Collection holding assessments of this type
    pub fn collection(&self) -> String {
        format!("{}_db", self.0)
    }

    /// Collection holding grades of this type for a course's question library
    pub fn grades_collection(&self, library: &str) -> String {
        format!("{}_{}_db", library, self.0)
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque assessment identifier (time-ordered UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(Uuid);

impl AssessmentId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssessmentId {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AssessmentError::InvalidInput(format!("Invalid assessment id: {s}")))
    }
}

/// Question stub embedded in a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRef {
    pub question_id: String,
    pub question_latex: String,
    pub marks: f64,
}

/// Named group of questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub section_name: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<QuestionRef>,
}

/// Assessment content as submitted by create, edit and generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPayload {
    pub name: String,
    pub course: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Minutes allowed
    pub total_time: u32,
    pub total_marks: f64,
    #[serde(default)]
    pub lessons: Vec<String>,
    /// Sections, in paper order
    pub questions: Vec<Section>,
}

impl AssessmentPayload {
    /// Reject payloads without questions or with unstorable dates
    pub fn validate(&self) -> Result<(), AssessmentError> {
        if !timestamp::in_range(&self.start_date) || !timestamp::in_range(&self.end_date) {
            return Err(AssessmentError::InvalidInput(format!(
                "Dates must fall between years {} and {}",
                timestamp::MIN_YEAR,
                timestamp::MAX_YEAR
            )));
        }
        if self.questions.is_empty() {
            return Err(AssessmentError::InvalidInput(
                "Assessment must contain at least one question".into(),
            ));
        }
        if let Some(section) = self.questions.iter().find(|s| s.questions.is_empty()) {
            return Err(AssessmentError::InvalidInput(format!(
                "Section '{}' must contain at least one question",
                section.section_name
            )));
        }
        Ok(())
    }
}

/// Edit request: identifier plus a full replacement payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditAssessment {
    pub assessment_id: String,
    #[serde(flatten)]
    pub assessment: AssessmentPayload,
}

/// Body carrying only an assessment identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentIdRequest {
    pub assessment_id: String,
}

/// Assessment as persisted in `{type}_db`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub course: String,
    #[serde(serialize_with = "timestamp::serialize")]
    pub start_date: DateTime<Utc>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub end_date: DateTime<Utc>,
    pub total_time: u32,
    pub total_marks: f64,
    pub lessons: Vec<String>,
    pub questions: Vec<Section>,
    /// Storage reference of the rendered paper
    pub question_paper: String,
    #[serde(serialize_with = "timestamp::serialize")]
    pub last_updated: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn new(
        id: AssessmentId,
        payload: AssessmentPayload,
        question_paper: String,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: payload.name,
            course: payload.course,
            start_date: payload.start_date,
            end_date: payload.end_date,
            total_time: payload.total_time,
            total_marks: payload.total_marks,
            lessons: payload.lessons,
            questions: payload.questions,
            question_paper,
            last_updated,
        }
    }

    /// Every embedded question id, in paper order
    pub fn question_ids(&self) -> Vec<String> {
        self.questions
            .iter()
            .flat_map(|s| s.questions.iter().map(|q| q.question_id.clone()))
            .collect()
    }
}

/// Row returned by the list operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub course: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_time: u32,
    pub total_marks: f64,
    #[serde(default)]
    pub lessons: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Section with questions resolved against the course library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDetails {
    pub section_name: String,
    pub description: String,
    pub questions: Vec<Document>,
}

/// Full assessment as returned by the details operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentDetails {
    pub id: String,
    pub name: String,
    pub course: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_time: u32,
    pub total_marks: f64,
    pub lessons: Vec<String>,
    pub questions: Vec<SectionDetails>,
    /// Signed, time-limited URL of the rendered paper
    pub question_paper: String,
    pub last_updated: DateTime<Utc>,
}
