use axum::{
    Router,
    routing::{get, post},
};

pub mod feedback;
pub mod streams;
pub mod system;

/// Router for all bus-backed endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/", post(feedback::publish_feedback))
        .route("/feedback", get(feedback::feedback_summary))
        .route("/streams/:name", get(streams::read_stream))
}
