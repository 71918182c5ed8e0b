//! Evaluation state machine — Analyze → Interview → Audit.
//!
//! Flow: analyze creates the record → start_interview / interview append to
//! the transcript only → audit reconciles record + transcript and overwrites
//! the record in one commit.
//!
//! Every operation on an existing evaluation holds that evaluation's lock for
//! its whole duration, so turns and audits on one id never interleave.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::classifier::{Classifier, InterviewContext};
use crate::evaluation::rules::{
    check_reconciliation, compute_discarded, compute_score, normalize_mandatory, normalize_sets,
};
use crate::models::evaluation::{
    ChatMessage, EvaluationRecord, EvaluationStatus, TranscriptLine,
};
use crate::store::EvaluationStore;

/// Caller-supplied inputs to Analyze.
#[derive(Debug, Clone)]
pub struct AnalyzeInput {
    pub offer_text: String,
    pub cv_text: String,
    pub first_name: String,
    pub last_name: String,
    pub candidate_identifier: String,
}

/// One interviewer turn plus the conversation so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewTurn {
    pub response: String,
    pub history: Vec<ChatMessage>,
}

/// The committed post-audit record plus the audit findings.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub evaluation: EvaluationRecord,
    pub key_points: Vec<String>,
    pub red_flags: Vec<String>,
}

/// Lazily created async mutex per evaluation id.
#[derive(Default)]
struct IdLocks {
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl IdLocks {
    async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

pub struct EvaluationMachine {
    store: Arc<dyn EvaluationStore>,
    classifier: Arc<dyn Classifier>,
    locks: IdLocks,
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl EvaluationMachine {
    pub fn new(store: Arc<dyn EvaluationStore>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            store,
            classifier,
            locks: IdLocks::default(),
        }
    }

    async fn load(&self, id: Uuid) -> Result<EvaluationRecord, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Evaluation {id} not found")))
    }

    async fn load_transcript(&self, id: Uuid) -> Result<String, AppError> {
        self.store.transcript(id).await?.ok_or_else(|| {
            AppError::NotFound(format!("No interview transcript for evaluation {id}"))
        })
    }

    /// Classifies the résumé against the offer and persists a new record.
    ///
    /// Identity comes from the caller, score and discard are derived from the
    /// partition. Nothing is written unless the classification is valid.
    pub async fn analyze(&self, input: AnalyzeInput) -> Result<EvaluationRecord, AppError> {
        require_non_empty("offer_text", &input.offer_text)?;
        require_non_empty("cv_text", &input.cv_text)?;
        require_non_empty("first_name", &input.first_name)?;
        require_non_empty("last_name", &input.last_name)?;
        require_non_empty("candidate_identifier", &input.candidate_identifier)?;

        let classification = self
            .classifier
            .classify(&input.offer_text, &input.cv_text)
            .await
            .map_err(|e| AppError::Classification(e.to_string()))?;

        let sets = normalize_sets(&classification)
            .map_err(|e| AppError::Classification(e.to_string()))?;
        let mandatory = normalize_mandatory(&classification.mandatory, &sets)
            .map_err(|e| AppError::Classification(e.to_string()))?;

        let requirements_total = sets.total();
        let score = compute_score(sets.matching.len(), requirements_total);
        let discarded = compute_discarded(&sets.unmatching, &mandatory);
        if discarded != classification.discarded {
            warn!(
                "Classifier reported discarded={} but the partition implies {discarded}",
                classification.discarded
            );
        }

        let now = Utc::now();
        let record = EvaluationRecord {
            id: Uuid::new_v4(),
            candidate_name: format!("{} {}", input.first_name, input.last_name),
            candidate_identifier: input.candidate_identifier.clone(),
            requirements_total,
            matching: sets.matching,
            unmatching: sets.unmatching,
            not_found: sets.not_found,
            mandatory,
            score,
            discarded,
            status: if discarded {
                EvaluationStatus::Finished
            } else {
                EvaluationStatus::InterviewNeeded
            },
            key_points: Vec::new(),
            red_flags: Vec::new(),
            created_at: now,
            updated_at: now,
            audited_at: None,
        };

        self.store.put(&record).await?;
        info!(
            "Evaluation {} analyzed: {}/{} matching, {} not found, score {:.1}, discarded={}",
            record.id,
            record.matching.len(),
            record.requirements_total,
            record.not_found.len(),
            record.score,
            record.discarded
        );
        Ok(record)
    }

    /// (Re)starts the interview: fresh transcript seeded with the greeting turn.
    pub async fn start_interview(&self, id: Uuid) -> Result<InterviewTurn, AppError> {
        let _guard = self.locks.acquire(id).await;
        let record = self.load(id).await?;

        let greeting = self
            .classifier
            .open_interview(InterviewContext::from_record(&record))
            .await
            .map_err(|e| AppError::Interview(e.to_string()))?;

        self.store.reset_transcript(id).await?;
        self.store
            .append_transcript(id, &[TranscriptLine::evaluator(&greeting)])
            .await?;

        info!(
            "Interview started for {id} with {} unresolved requirements",
            record.not_found.len()
        );
        Ok(InterviewTurn {
            history: vec![ChatMessage::assistant(greeting.clone())],
            response: greeting,
        })
    }

    /// One candidate message in, one interviewer reply out. Only the transcript changes.
    pub async fn interview(
        &self,
        id: Uuid,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> Result<InterviewTurn, AppError> {
        require_non_empty("message", message)?;

        let _guard = self.locks.acquire(id).await;
        let record = self.load(id).await?;
        self.load_transcript(id).await?;

        let reply = self
            .classifier
            .reply(InterviewContext::from_record(&record), &history, message)
            .await
            .map_err(|e| AppError::Interview(e.to_string()))?;

        // The turn lands whole or not at all
        self.store
            .append_transcript(
                id,
                &[
                    TranscriptLine::candidate(message),
                    TranscriptLine::evaluator(&reply),
                ],
            )
            .await?;

        let mut history = history;
        history.push(ChatMessage::user(message));
        history.push(ChatMessage::assistant(reply.clone()));
        Ok(InterviewTurn {
            response: reply,
            history,
        })
    }

    /// Reconciles the record with the interview transcript and commits the result.
    ///
    /// An already audited record is rejected unless `force` is set. On any
    /// failure the stored record is left exactly as it was.
    pub async fn audit(&self, id: Uuid, force: bool) -> Result<AuditReport, AppError> {
        let _guard = self.locks.acquire(id).await;
        let before = self.load(id).await?;
        let transcript = self.load_transcript(id).await?;

        if before.is_audited() && !force {
            return Err(AppError::Conflict(format!(
                "Evaluation {id} was already audited; pass force=true to audit again"
            )));
        }

        let outcome = self
            .classifier
            .reconcile(&before, &transcript)
            .await
            .map_err(|e| AppError::Audit(e.to_string()))?;

        let sets =
            normalize_sets(&outcome.evaluation).map_err(|e| AppError::Audit(e.to_string()))?;
        check_reconciliation(&before, &sets).map_err(|e| AppError::Audit(e.to_string()))?;

        let score = compute_score(sets.matching.len(), before.requirements_total);
        let discarded = compute_discarded(&sets.unmatching, &before.mandatory);
        if (score - outcome.evaluation.score).abs() > 0.5 {
            warn!(
                "Classifier reported score {:.1} for {id}; committing computed {score:.1}",
                outcome.evaluation.score
            );
        }

        let now = Utc::now();
        let audited = EvaluationRecord {
            matching: sets.matching,
            unmatching: sets.unmatching,
            not_found: sets.not_found,
            score,
            discarded,
            status: EvaluationStatus::Finished,
            key_points: outcome.key_points.clone(),
            red_flags: outcome.red_flags.clone(),
            updated_at: now,
            audited_at: Some(now),
            ..before
        };

        self.store.put(&audited).await?;
        info!(
            "Evaluation {id} audited: score {:.1}, discarded={}, {} red flags",
            audited.score,
            audited.discarded,
            audited.red_flags.len()
        );

        Ok(AuditReport {
            evaluation: audited,
            key_points: outcome.key_points,
            red_flags: outcome.red_flags,
        })
    }
}
