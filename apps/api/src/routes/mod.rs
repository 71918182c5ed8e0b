pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::dashboard::handlers as dashboard;
use crate::evaluation::handlers as evaluation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Evaluation lifecycle
        .route("/analyze", post(evaluation::handle_analyze))
        .route("/interview/start", post(evaluation::handle_start_interview))
        .route("/interview", post(evaluation::handle_interview))
        .route("/audit", post(evaluation::handle_audit))
        // Dashboard (read-only)
        .route("/evaluations", get(dashboard::handle_list_evaluations))
        .route("/evaluations/:id", get(dashboard::handle_get_evaluation))
        .with_state(state)
}
