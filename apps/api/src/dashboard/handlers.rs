use axum::{
    extract::{Path, State},
    Json,
};

use crate::dashboard::EvaluationDetail;
use crate::errors::AppError;
use crate::evaluation::handlers::parse_evaluation_id;
use crate::models::evaluation::EvaluationSummary;
use crate::state::AppState;

/// GET /evaluations
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
) -> Result<Json<Vec<EvaluationSummary>>, AppError> {
    Ok(Json(state.dashboard.summaries().await?))
}

/// GET /evaluations/:id
pub async fn handle_get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EvaluationDetail>, AppError> {
    let id = parse_evaluation_id(&id)?;
    Ok(Json(state.dashboard.detail(id).await?))
}
