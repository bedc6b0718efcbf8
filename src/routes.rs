// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{health, notes, question, quiz_result, stats},
    state::AppState,
};

/// Builds the CORS policy from the configured origins.
/// Origins that are not valid header values are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Requests still running after `timeout` get a bare 408.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Assembles the main application router.
///
/// * Question bank, attempt records, statistics and teaching notes under `/api`.
/// * Applies global middleware (Trace, request timeout, CORS).
/// * Injects global state (pool, config, providers).
pub fn create_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(timeout_layer(state.config.request_timeout))
        .layer(cors_layer(&state.config.cors_origins));

    Router::new()
        .route("/api/hello", get(health::hello))
        .route(
            "/api/questions",
            get(question::list_questions).post(question::create_question),
        )
        .route("/api/questions/bulk", post(question::bulk_create_questions))
        .route("/api/questions/search", get(question::search_questions))
        .route("/api/questions/{id}", get(question::get_question))
        .route(
            "/api/quiz_results",
            get(quiz_result::list_results).post(quiz_result::submit_results),
        )
        .route(
            "/api/quiz_results/{user_id}",
            get(quiz_result::list_user_results),
        )
        .route("/api/leaderboard", get(stats::get_leaderboard))
        .route("/api/quiz_summary", get(stats::get_quiz_summary))
        .route("/api/generate_notes", post(notes::generate_notes))
        .route("/api/get_notes", get(notes::get_notes))
        .route("/api/all_notes", get(notes::list_notes))
        .layer(middleware)
        .with_state(state)
}
