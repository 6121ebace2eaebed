//! Store queries issued by the assessment service

use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::error::AssessmentError;
use crate::model::timestamp::{self, MAX_YEAR, MIN_YEAR};
use crate::model::{GradeRecord, ListFilter};
use crate::store::{Filter, Pipeline, SortOrder, Stage, StoreError, WriteOperation, to_document};

/// Fields kept by the list projection (`_id` is always kept)
pub const SUMMARY_FIELDS: [&str; 8] = [
    "name",
    "course",
    "start_date",
    "end_date",
    "total_time",
    "total_marks",
    "lessons",
    "last_updated",
];

/// Build the list pipeline: optional course and schedule matches, newest
/// first, summary projection.
pub fn assessment_list_pipeline(filter: &ListFilter) -> Result<Pipeline, AssessmentError> {
    let mut pipeline = Pipeline::new();

    if let Some(course_id) = &filter.course_id {
        pipeline = pipeline.stage(Stage::Match(Filter::new().eq("course", course_id.as_str())));
    }

    match (filter.year, filter.month) {
        (Some(year), month) => {
            let (start, end) = schedule_window(year, month)?;
            pipeline = pipeline.stage(Stage::Match(Filter::new().within("start_date", start, end)));
        }
        (None, Some(_)) => {
            return Err(AssessmentError::InvalidInput(
                "month filter requires year".into(),
            ));
        }
        (None, None) => {}
    }

    Ok(pipeline
        .stage(Stage::Sort {
            field: "start_date".into(),
            order: SortOrder::Desc,
        })
        .stage(Stage::Project(
            SUMMARY_FIELDS.iter().map(|f| f.to_string()).collect(),
        )))
}

/// `[start, end)` bounds for a year, or a month within it
fn schedule_window(year: i32, month: Option<u32>) -> Result<(Value, Value), AssessmentError> {
    check_year(year)?;
    let (start, end) = match month {
        None => ((year, 1), (year + 1, 1)),
        Some(m @ 1..=11) => ((year, m), (year, m + 1)),
        Some(12) => ((year, 12), (year + 1, 1)),
        Some(m) => {
            return Err(AssessmentError::InvalidInput(format!(
                "month must be between 1 and 12, got {m}"
            )));
        }
    };

    Ok((month_start(start.0, start.1)?, month_start(end.0, end.1)?))
}

fn check_year(year: i32) -> Result<(), AssessmentError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(AssessmentError::InvalidInput(format!(
            "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
        )))
    }
}

fn month_start(year: i32, month: u32) -> Result<Value, AssessmentError> {
    check_year(year)?;
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .map(|dt| Value::String(timestamp::format(&dt)))
        .ok_or_else(|| AssessmentError::InvalidInput(format!("year out of range: {year}")))
}

/// One upsert per grade, keyed by assessment, course and student
pub fn grading_operations(grades: &[GradeRecord]) -> Result<Vec<WriteOperation>, StoreError> {
    grades
        .iter()
        .map(|grade| {
            Ok(WriteOperation::UpdateOne {
                filter: Filter::new()
                    .eq("assessment_id", grade.assessment_id.as_str())
                    .eq("course_id", grade.course_id.as_str())
                    .eq("student_id", grade.student_id.as_str()),
                set: to_document(grade)?,
                upsert: true,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssessmentId, AssessmentPayload, AssessmentRecord, StudentMark};
    use serde_json::json;

    fn filter(value: serde_json::Value) -> ListFilter {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_filter_sorts_and_projects() {
        let pipeline = assessment_list_pipeline(&ListFilter::default()).unwrap();
        let json = pipeline.to_json();
        assert_eq!(json.len(), 2);
        assert_eq!(json[0], json!({ "$sort": { "start_date": -1 } }));
        assert_eq!(json[1]["$project"]["last_updated"], 1);
        assert!(json[1]["$project"].get("questions").is_none());
    }

    #[test]
    fn test_course_and_month_filter() {
        let pipeline =
            assessment_list_pipeline(&filter(json!({ "course_id": "math", "year": 2024, "month": 5 })))
                .unwrap();
        let json = pipeline.to_json();
        assert_eq!(json[0], json!({ "$match": { "course": "math" } }));
        assert_eq!(
            json[1],
            json!({ "$match": { "start_date": {
                "$gte": "2024-05-01T00:00:00Z",
                "$lt": "2024-06-01T00:00:00Z"
            } } })
        );
    }

    #[test]
    fn test_year_only_spans_whole_year() {
        let pipeline = assessment_list_pipeline(&filter(json!({ "year": 2023 }))).unwrap();
        let json = pipeline.to_json();
        assert_eq!(json[0]["$match"]["start_date"]["$gte"], "2023-01-01T00:00:00Z");
        assert_eq!(json[0]["$match"]["start_date"]["$lt"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let pipeline =
            assessment_list_pipeline(&filter(json!({ "year": 2024, "month": 12 }))).unwrap();
        let json = pipeline.to_json();
        assert_eq!(json[0]["$match"]["start_date"]["$lt"], "2025-01-01T00:00:00Z");
    }

    #[test]
    fn test_invalid_month_combinations() {
        let err = assessment_list_pipeline(&filter(json!({ "month": 3 }))).unwrap_err();
        assert!(err.is_client_error());

        let err =
            assessment_list_pipeline(&filter(json!({ "year": 2024, "month": 13 }))).unwrap_err();
        assert!(err.is_client_error());

        let err =
            assessment_list_pipeline(&filter(json!({ "year": 2024, "month": 0 }))).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_out_of_range_years_are_rejected() {
        for year in [i32::MAX, i32::MIN, 0, -1, 10_000] {
            let err = assessment_list_pipeline(&filter(json!({ "year": year }))).unwrap_err();
            assert!(err.is_client_error(), "year {year}");
        }

        // The next-year bound for 9999 has no four-digit rendering
        let err = assessment_list_pipeline(&filter(json!({ "year": 9999 }))).unwrap_err();
        assert!(err.is_client_error());
        assert!(assessment_list_pipeline(&filter(json!({ "year": 9999, "month": 11 }))).is_ok());
    }

    #[test]
    fn test_stored_dates_compare_lexically_against_bounds() {
        // String comparison, as a Mongo `$gte`/`$lt` on string fields does
        let bounds = |month: u32| {
            let json = assessment_list_pipeline(&filter(json!({ "year": 2024, "month": month })))
                .unwrap()
                .to_json();
            let range = &json[0]["$match"]["start_date"];
            (
                range["$gte"].as_str().unwrap().to_string(),
                range["$lt"].as_str().unwrap().to_string(),
            )
        };

        let payload: AssessmentPayload = serde_json::from_value(json!({
            "name": "Boundary",
            "course": "math",
            "start_date": "2024-06-01T00:00:00.500Z",
            "end_date": "2024-06-01T01:00:00Z",
            "total_time": 60,
            "total_marks": 10,
            "questions": [{
                "section_name": "A",
                "questions": [{ "question_id": "q1", "question_latex": "x", "marks": 10 }]
            }]
        }))
        .unwrap();
        let record = AssessmentRecord::new(AssessmentId::generate(), payload, "p".into(), Utc::now());
        let stored = serde_json::to_value(&record).unwrap()["start_date"]
            .as_str()
            .unwrap()
            .to_string();

        let (june_gte, june_lt) = bounds(6);
        assert!(stored.as_str() >= june_gte.as_str() && stored.as_str() < june_lt.as_str());

        let (may_gte, may_lt) = bounds(5);
        assert!(!(stored.as_str() >= may_gte.as_str() && stored.as_str() < may_lt.as_str()));
    }

    #[test]
    fn test_grading_operations_upsert_by_student() {
        let grades = vec![GradeRecord::graded(
            "a1",
            "math",
            StudentMark {
                student_id: "s1".into(),
                marks: 42.0,
                status: "pass".into(),
            },
        )];

        let ops = grading_operations(&grades).unwrap();
        assert_eq!(ops.len(), 1);
        let WriteOperation::UpdateOne {
            filter,
            set,
            upsert,
        } = &ops[0]
        else {
            panic!("expected update");
        };
        assert!(*upsert);
        assert_eq!(
            filter.to_json(),
            json!({ "assessment_id": "a1", "course_id": "math", "student_id": "s1" })
        );
        assert_eq!(set["marks"], 42.0);
        assert_eq!(set["status"], "pass");
    }
}
