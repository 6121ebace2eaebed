//! HTTP server module

mod api;
mod assessments;
mod extract;

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::HeaderName,
    middleware,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{AppState, ServerConfig, auth_middleware};

pub use api::HealthResponse;
pub use assessments::{DataResponse, IdResponse, MessageResponse};
pub use extract::ApiJson;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let mut routes = Router::new()
        .route("/:assessment_type/create", post(assessments::create))
        .route("/:assessment_type/list", post(assessments::list))
        .route("/:assessment_type/details", post(assessments::details))
        .route("/:assessment_type/generate", post(assessments::generate))
        .route("/:assessment_type/edit", post(assessments::edit))
        .route("/:assessment_type/delete", delete(assessments::delete));

    if config.expose_grading_routes {
        routes = routes
            .route("/:assessment_type/grade", post(assessments::grade))
            .route("/:assessment_type/grades", post(assessments::grades));
    }

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    routes
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .route("/health", get(api::health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
}
