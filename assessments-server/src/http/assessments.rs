//! Assessment endpoints, all scoped by the `{assessment_type}` path segment

use std::sync::Arc;

use assessments_core::{
    AssessmentCourse, AssessmentDetails, AssessmentIdRequest, AssessmentPayload,
    AssessmentSummary, AssessmentType, AuthContext, BulkWriteResult, EditAssessment, GradeRecord,
    GradeSubmission, ListAssessmentsRequest,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use super::extract::ApiJson;
use crate::AppState;
use crate::error::ApiError;

const SUCCESS: &str = "success";

/// Response carrying the affected assessment id
#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub status: String,
    pub assessment_id: String,
}

/// Response carrying a data payload
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub status: String,
    pub data: T,
}

/// Response carrying a human-readable message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

fn data<T>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse {
        status: SUCCESS.to_string(),
        data,
    })
}

fn assessment_type(raw: &str) -> Result<AssessmentType, ApiError> {
    Ok(AssessmentType::parse(raw)?)
}

/// Create an assessment and render its paper
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    ApiJson(payload): ApiJson<AssessmentPayload>,
) -> Result<Json<IdResponse>, ApiError> {
    let kind = assessment_type(&kind)?;
    let id = state.service.create(&kind, payload).await?;

    Ok(Json(IdResponse {
        status: SUCCESS.to_string(),
        assessment_id: id.to_string(),
    }))
}

/// List assessment summaries matching the filters
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    ApiJson(request): ApiJson<ListAssessmentsRequest>,
) -> Result<Json<DataResponse<Vec<AssessmentSummary>>>, ApiError> {
    let kind = assessment_type(&kind)?;
    let rows = state.service.list(&kind, &request.filters).await?;
    if rows.is_empty() {
        tracing::info!(assessment_type = %kind, "No assessments found for the given filters");
    }
    Ok(data(rows))
}

/// Fetch one assessment with resolved questions
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    ApiJson(request): ApiJson<AssessmentIdRequest>,
) -> Result<Json<DataResponse<AssessmentDetails>>, ApiError> {
    let kind = assessment_type(&kind)?;
    let details = state.service.details(&kind, &request.assessment_id).await?;
    Ok(data(details))
}

/// Validates the payload and echoes the caller
pub async fn generate(
    Path(kind): Path<String>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(_payload): ApiJson<AssessmentPayload>,
) -> Result<Json<AuthContext>, ApiError> {
    assessment_type(&kind)?;
    Ok(Json(auth))
}

/// Replace an assessment wholesale
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    ApiJson(request): ApiJson<EditAssessment>,
) -> Result<Json<IdResponse>, ApiError> {
    let kind = assessment_type(&kind)?;
    let id = state.service.edit(&kind, request).await?;

    Ok(Json(IdResponse {
        status: SUCCESS.to_string(),
        assessment_id: id.to_string(),
    }))
}

/// Delete an assessment and its grade records
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    ApiJson(request): ApiJson<AssessmentCourse>,
) -> Result<Json<MessageResponse>, ApiError> {
    let kind = assessment_type(&kind)?;
    let outcome = state.service.delete(&kind, request).await?;

    Ok(Json(MessageResponse {
        status: SUCCESS.to_string(),
        message: outcome.message(),
    }))
}

/// Upsert student grades
pub async fn grade(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    ApiJson(submission): ApiJson<GradeSubmission>,
) -> Result<Json<DataResponse<BulkWriteResult>>, ApiError> {
    let kind = assessment_type(&kind)?;
    let result = state.service.grade(&kind, submission).await?;
    Ok(data(result))
}

/// Every roster student's grade, placeholders included
pub async fn grades(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    ApiJson(request): ApiJson<AssessmentCourse>,
) -> Result<Json<DataResponse<Vec<GradeRecord>>>, ApiError> {
    let kind = assessment_type(&kind)?;
    let grades = state.service.student_grades(&kind, request).await?;
    Ok(data(grades))
}
