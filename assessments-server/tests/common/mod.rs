//! Shared test utilities for assessments-server integration tests

use std::sync::Arc;

use assessments_core::store::{Document, DocumentStore};
use assessments_core::{
    AssessmentService, AuthConfig, LatexRenderer, MemoryDocumentStore, SignedUrlIssuer,
    StorageConfig, StoreCourseDirectory,
};
use assessments_server::{AppState, AuthLayer, ServerConfig, create_router};
use axum_test::TestServer;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Router under test plus the store behind it
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryDocumentStore>,
    _papers: TempDir,
}

/// Creates a test app with grading routes on and auth off, course seeded
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    create_test_app_with(
        ServerConfig::default().with_grading_routes(true),
        AuthLayer::disabled(),
    )
    .await
}

/// Creates a test app with bearer auth using the given config
#[allow(dead_code)]
pub async fn create_authenticated_app(auth: AuthConfig) -> TestApp {
    create_test_app_with(ServerConfig::default(), AuthLayer::new(auth)).await
}

/// Creates a test app with custom config
pub async fn create_test_app_with(config: ServerConfig, auth: AuthLayer) -> TestApp {
    let papers = TempDir::new().unwrap();
    let store = Arc::new(MemoryDocumentStore::new());
    seed_course(&store).await;

    let service = AssessmentService::new(
        store.clone(),
        Arc::new(LatexRenderer::new(papers.path())),
        Arc::new(
            SignedUrlIssuer::new(&StorageConfig {
                signing_secret: "test-signing".into(),
                ..StorageConfig::default()
            })
            .unwrap(),
        ),
        Arc::new(StoreCourseDirectory::new(store.clone())),
    );
    let state = Arc::new(AppState::new(Arc::new(service)).with_auth(auth));
    let server = TestServer::new(create_router(state, &config)).unwrap();

    TestApp {
        server,
        store,
        _papers: papers,
    }
}

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

/// Course `math` with library `math_questions`, questions q1/q2, students s1-s3
async fn seed_course(store: &MemoryDocumentStore) {
    store
        .insert_one(
            "courses",
            doc(json!({ "_id": "math", "question_library": "math_questions" })),
        )
        .await
        .unwrap();
    for student in ["s1", "s2", "s3"] {
        store
            .insert_one(
                "enrollments",
                doc(json!({ "course_id": "math", "student_id": student, "email": format!("{student}@school.test") })),
            )
            .await
            .unwrap();
    }
    store
        .insert_one(
            "math_questions",
            doc(json!({ "_id": "q1", "question_latex": "$x^2 = 4$", "solution": "x = 2" })),
        )
        .await
        .unwrap();
    store
        .insert_one(
            "math_questions",
            doc(json!({ "_id": "q2", "question_latex": "$2x = 6$", "solution": "x = 3" })),
        )
        .await
        .unwrap();
}

/// A valid create payload starting at `start`
#[allow(dead_code)]
pub fn assessment_body(start: &str) -> Value {
    json!({
        "name": "Algebra quiz",
        "course": "math",
        "start_date": start,
        "end_date": start,
        "total_time": 45,
        "total_marks": 10,
        "lessons": ["linear-equations"],
        "questions": [{
            "section_name": "Section A",
            "description": "Solve for x",
            "questions": [
                { "question_id": "q1", "question_latex": "stub", "marks": 5 },
                { "question_id": "q2", "question_latex": "stub", "marks": 5 }
            ]
        }]
    })
}
