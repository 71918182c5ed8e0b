//! Axum route handlers for the evaluation lifecycle.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::machine::{AnalyzeInput, AuditReport, InterviewTurn};
use crate::models::evaluation::{ChatMessage, EvaluationRecord};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

// Missing fields deserialize as empty so they surface as validation errors.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub cv_text: String,
    #[serde(default)]
    pub offer_text: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub candidate_identifier: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub evaluation: EvaluationRecord,
    pub evaluation_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub evaluation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewRequest {
    pub evaluation_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub evaluation_id: String,
    #[serde(default)]
    pub force: bool,
}

/// Ids that are not UUIDs cannot name an evaluation, so they are reported as not found.
pub(crate) fn parse_evaluation_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::NotFound(format!("Evaluation {raw} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Classifies the résumé against the offer and creates the evaluation record.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let evaluation = state
        .machine
        .analyze(AnalyzeInput {
            offer_text: request.offer_text,
            cv_text: request.cv_text,
            first_name: request.first_name,
            last_name: request.last_name,
            candidate_identifier: request.candidate_identifier,
        })
        .await?;

    Ok(Json(AnalyzeResponse {
        evaluation_id: evaluation.id,
        evaluation,
    }))
}

/// POST /interview/start
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<InterviewTurn>, AppError> {
    let id = parse_evaluation_id(&request.evaluation_id)?;
    Ok(Json(state.machine.start_interview(id).await?))
}

/// POST /interview
pub async fn handle_interview(
    State(state): State<AppState>,
    Json(request): Json<InterviewRequest>,
) -> Result<Json<InterviewTurn>, AppError> {
    let id = parse_evaluation_id(&request.evaluation_id)?;
    Ok(Json(
        state
            .machine
            .interview(id, &request.message, request.history)
            .await?,
    ))
}

/// POST /audit
///
/// Final reconciliation. Re-auditing requires `"force": true`.
pub async fn handle_audit(
    State(state): State<AppState>,
    Json(request): Json<AuditRequest>,
) -> Result<Json<AuditReport>, AppError> {
    let id = parse_evaluation_id(&request.evaluation_id)?;
    Ok(Json(state.machine.audit(id, request.force).await?))
}
