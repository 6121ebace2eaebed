//! End-to-end tests of the assessment routes over an in-memory store

mod common;

use assessments_core::AuthConfig;
use assessments_core::auth::{TokenRequest, issue_token};
use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use serde_json::{Value, json};

async fn create(app: &common::TestApp, start: &str) -> String {
    let response = app
        .server
        .post("/quiz/create")
        .json(&common::assessment_body(start))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    body["assessment_id"].as_str().unwrap().to_string()
}

fn bearer(config: &AuthConfig, roles: &[&str]) -> HeaderValue {
    let token = issue_token(
        config,
        TokenRequest {
            subject: "teacher-7".into(),
            email: Some("teacher@school.test".into()),
            name: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            ttl: chrono::Duration::minutes(5),
        },
    )
    .unwrap();
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

#[tokio::test]
async fn create_list_details_edit_roundtrip() {
    let app = common::create_test_app().await;
    let older = create(&app, "2024-03-04T09:00:00Z").await;
    let newer = create(&app, "2024-03-20T09:00:00Z").await;

    let response = app
        .server
        .post("/quiz/list")
        .json(&json!({ "filters": { "course_id": "math", "year": 2024, "month": 3 } }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![newer.as_str(), older.as_str()]);
    assert!(body["data"][0].get("questions").is_none());

    let response = app
        .server
        .post("/quiz/details")
        .json(&json!({ "assessment_id": older }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let details = &body["data"];
    assert_eq!(details["id"], older.as_str());
    assert_eq!(details["questions"][0]["questions"][0]["question_latex"], "$x^2 = 4$");
    assert_eq!(details["questions"][0]["questions"][0]["solution"], "x = 2");
    assert_eq!(details["questions"][0]["questions"][0]["marks"], 5.0);
    let url = details["question_paper"].as_str().unwrap();
    assert!(url.starts_with(&format!("http://127.0.0.1:7743/documents/quiz/{older}.tex?token=")));

    let mut edited = common::assessment_body("2024-04-01T09:00:00Z");
    edited["assessment_id"] = json!(older);
    edited["name"] = json!("Algebra quiz (revised)");
    let response = app.server.post("/quiz/edit").json(&edited).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["assessment_id"], older.as_str());

    let response = app
        .server
        .post("/quiz/details")
        .json(&json!({ "assessment_id": older }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "Algebra quiz (revised)");
    assert_eq!(body["data"]["start_date"], "2024-04-01T09:00:00Z");
}

#[tokio::test]
async fn create_without_questions_is_rejected() {
    let app = common::create_test_app().await;
    let mut body = common::assessment_body("2024-03-04T09:00:00Z");
    body["questions"] = json!([]);

    let response = app.server.post("/quiz/create").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["code"], "BAD_REQUEST");
    assert_eq!(error["error"], "Assessment must contain at least one question");
    assert_eq!(app.store.count("quiz_db").await, 0);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = common::create_test_app().await;

    let response = app
        .server
        .post("/quiz/list")
        .json(&json!({ "filters": { "teacher": "someone" } }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/quiz/create")
        .text("{not json")
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/quiz/list")
        .json(&json!({ "filters": { "month": 4 } }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/quiz.v2/list")
        .json(&json!({ "filters": {} }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_without_matches_is_empty_success() {
    let app = common::create_test_app().await;
    let response = app
        .server
        .post("/exam/list")
        .json(&json!({ "filters": {} }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "status": "success", "data": [] }));
}

#[tokio::test]
async fn missing_assessment_is_not_found() {
    let app = common::create_test_app().await;
    let missing = "0190f5b2-7c1e-7a51-9b3e-2f6c1d0a4e11";

    let response = app
        .server
        .post("/quiz/details")
        .json(&json!({ "assessment_id": missing }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let error: Value = response.json();
    assert_eq!(error["error"], "No Data found for given assessment");
    assert_eq!(error["code"], "NOT_FOUND");

    app.server
        .post("/quiz/grade")
        .json(&json!({
            "assessment_id": missing,
            "course": "math",
            "marks": [{ "student_id": "s1", "marks": 3, "status": "graded" }]
        }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .delete("/quiz/delete")
        .json(&json!({ "assessment_id": missing, "course": "math" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.store.count("math_questions_quiz_db").await, 1);
}

#[tokio::test]
async fn unknown_library_question_is_not_found() {
    let app = common::create_test_app().await;
    let mut body = common::assessment_body("2024-03-04T09:00:00Z");
    body["questions"][0]["questions"][1]["question_id"] = json!("q404");
    let response = app.server.post("/quiz/create").json(&body).await;
    response.assert_status_ok();
    let created: Value = response.json();

    let response = app
        .server
        .post("/quiz/details")
        .json(&json!({ "assessment_id": created["assessment_id"] }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let error: Value = response.json();
    assert_eq!(error["error"], "Question q404 not found");
    assert!(!response.text().contains("math_questions"));
}

#[tokio::test]
async fn month_boundaries_ignore_subsecond_dates() {
    let app = common::create_test_app().await;
    let id = create(&app, "2024-03-31T23:59:59.900Z").await;

    let list = |month: u32| {
        app.server
            .post("/quiz/list")
            .json(&json!({ "filters": { "year": 2024, "month": month } }))
    };

    let body: Value = list(3).await.json();
    assert_eq!(body["data"][0]["id"], id.as_str());
    assert_eq!(body["data"][0]["start_date"], "2024-03-31T23:59:59Z");

    let body: Value = list(4).await.json();
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn unrepresentable_years_are_bad_requests() {
    let app = common::create_test_app().await;

    for year in [i32::MAX, 0, 10000] {
        let response = app
            .server
            .post("/quiz/list")
            .json(&json!({ "filters": { "year": year, "month": 12 } }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    let response = app
        .server
        .post("/quiz/create")
        .json(&common::assessment_body("+10000-01-01T00:00:00Z"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.store.count("quiz_db").await, 0);
}

#[tokio::test]
async fn grading_and_student_grades() {
    let app = common::create_test_app().await;
    let id = create(&app, "2024-03-04T09:00:00Z").await;

    let response = app
        .server
        .post("/quiz/grades")
        .json(&json!({ "assessment_id": id, "course": "math" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let grades = body["data"].as_array().unwrap();
    assert_eq!(grades.len(), 3);
    assert!(grades.iter().all(|g| g["marks"].is_null() && g["status"].is_null()));
    assert_eq!(grades[0]["email"], "s1@school.test");

    let response = app
        .server
        .post("/quiz/grade")
        .json(&json!({
            "assessment_id": id,
            "course": "math",
            "marks": [
                { "student_id": "s3", "marks": 9, "status": "graded" },
                { "student_id": "s1", "marks": 4, "status": "graded" }
            ]
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["upserted_count"], 2);

    let response = app
        .server
        .post("/quiz/grades")
        .json(&json!({ "assessment_id": id, "course": "math" }))
        .await;
    let body: Value = response.json();
    let students: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["student_id"].as_str().unwrap())
        .collect();
    assert_eq!(students, vec!["s3", "s1", "s2"]);
    assert_eq!(body["data"][0]["marks"], 9.0);
    assert!(body["data"][0].get("_id").is_none());

    let response = app
        .server
        .delete("/quiz/delete")
        .json(&json!({ "assessment_id": id, "course": "math" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Assessment and associated 2 student grade documents deleted successfully"
    );
    assert_eq!(app.store.count("quiz_db").await, 0);
    assert_eq!(app.store.count("math_questions_quiz_db").await, 0);
}

#[tokio::test]
async fn generate_echoes_local_caller() {
    let app = common::create_test_app().await;
    let response = app
        .server
        .post("/quiz/generate")
        .json(&common::assessment_body("2024-03-04T09:00:00Z"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "source": "local" }));
}

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let config = AuthConfig::new("api-secret");
    let app = common::create_authenticated_app(config.clone()).await;

    let response = app
        .server
        .post("/quiz/create")
        .json(&common::assessment_body("2024-03-04T09:00:00Z"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let error: Value = response.json();
    assert_eq!(error["code"], "UNAUTHORIZED");
    assert_eq!(app.store.count("quiz_db").await, 0);
    assert!(!response.header("x-request-id").is_empty());

    let response = app
        .server
        .post("/quiz/create")
        .add_header(AUTHORIZATION, bearer(&AuthConfig::new("wrong"), &[]))
        .json(&common::assessment_body("2024-03-04T09:00:00Z"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/quiz/create")
        .add_header(AUTHORIZATION, bearer(&config, &[]))
        .json(&common::assessment_body("2024-03-04T09:00:00Z"))
        .await;
    response.assert_status_ok();
    assert_eq!(app.store.count("quiz_db").await, 1);

    // Health stays open
    app.server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn missing_role_is_forbidden() {
    let config = AuthConfig::new("api-secret").with_required_role("instructor");
    let app = common::create_authenticated_app(config.clone()).await;

    let response = app
        .server
        .post("/quiz/list")
        .add_header(AUTHORIZATION, bearer(&config, &["student"]))
        .json(&json!({ "filters": {} }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .post("/quiz/generate")
        .add_header(AUTHORIZATION, bearer(&config, &["instructor"]))
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-me"),
        )
        .json(&common::assessment_body("2024-03-04T09:00:00Z"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("x-request-id"), "trace-me");
    let body: Value = response.json();
    assert_eq!(body["source"], "authenticated");
    assert_eq!(body["identity"]["subject"], "teacher-7");
    assert_eq!(body["identity"]["email"], "teacher@school.test");
}

#[tokio::test]
async fn enabled_auth_without_secret_rejects_every_request() {
    let config = AuthConfig {
        enabled: true,
        ..AuthConfig::default()
    };
    let app = common::create_authenticated_app(config.clone()).await;

    let response = app
        .server
        .post("/quiz/create")
        .json(&common::assessment_body("2024-03-04T09:00:00Z"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/quiz/create")
        .add_header(AUTHORIZATION, bearer(&AuthConfig::new(""), &[]))
        .json(&common::assessment_body("2024-03-04T09:00:00Z"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.count("quiz_db").await, 0);

    app.server.get("/health").await.assert_status_ok();
}
