//! Classifier contract — the black-box collaborator behind every phase.
//!
//! The state machine depends only on this trait. Production wires in
//! `LlmClassifier`; tests inject a deterministic fake. Implementations must
//! return output matching the schema or fail: the core never fills in
//! missing fields.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::models::evaluation::{ChatMessage, EvaluationRecord};

#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The collaborator could not be reached or refused the request.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered, but not with the required schema.
    #[error("malformed classifier output: {0}")]
    Malformed(String),
}

impl From<LlmError> for ClassifierError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(_) | LlmError::EmptyContent => Self::Malformed(err.to_string()),
            LlmError::Http(_) | LlmError::Api { .. } | LlmError::RateLimited { .. } => {
                Self::Unavailable(err.to_string())
            }
        }
    }
}

/// Requirement partition returned by the classifier.
///
/// Every field is required on the wire; a missing field fails deserialization.
/// `score` and `discarded` are the classifier's own opinion and are recomputed
/// by the core before anything is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub requirements_total: usize,
    pub mandatory: Vec<String>,
    pub matching: Vec<String>,
    pub unmatching: Vec<String>,
    pub not_found: Vec<String>,
    pub score: f64,
    pub discarded: bool,
}

/// Reconciliation returned by the classifier at audit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub evaluation: Classification,
    pub key_points: Vec<String>,
    pub red_flags: Vec<String>,
}

/// What the interviewer is allowed to know about the evaluation.
#[derive(Debug, Clone, Copy)]
pub struct InterviewContext<'a> {
    pub candidate_name: &'a str,
    /// The only requirements the interviewer may ask about.
    pub not_found: &'a [String],
}

impl<'a> InterviewContext<'a> {
    pub fn from_record(record: &'a EvaluationRecord) -> Self {
        Self {
            candidate_name: &record.candidate_name,
            not_found: &record.not_found,
        }
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Partitions the offer's requirements against the résumé.
    async fn classify(&self, offer_text: &str, cv_text: &str)
        -> Result<Classification, ClassifierError>;

    /// Greeting plus the first question, or a closing message when nothing is unresolved.
    async fn open_interview(&self, context: InterviewContext<'_>)
        -> Result<String, ClassifierError>;

    /// Next interviewer turn: one question about one unresolved requirement at a time.
    async fn reply(
        &self,
        context: InterviewContext<'_>,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ClassifierError>;

    /// Resolves `not_found` requirements from transcript evidence and reports findings.
    async fn reconcile(
        &self,
        record: &EvaluationRecord,
        transcript: &str,
    ) -> Result<AuditOutcome, ClassifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_missing_field_is_rejected() {
        let json = r#"{
            "requirements_total": 1,
            "mandatory": [],
            "matching": ["Rust"],
            "unmatching": [],
            "not_found": [],
            "score": 100.0
        }"#;
        assert!(serde_json::from_str::<Classification>(json).is_err());
    }

    #[test]
    fn test_classification_ignores_extra_identity_fields() {
        let json = r#"{
            "candidate_name": "Invented Name",
            "requirements_total": 1,
            "mandatory": ["Rust"],
            "matching": ["Rust"],
            "unmatching": [],
            "not_found": [],
            "score": 100.0,
            "discarded": false
        }"#;
        let parsed: Classification = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.matching, vec!["Rust".to_string()]);
    }

    #[test]
    fn test_llm_parse_error_maps_to_malformed() {
        let parse_err = serde_json::from_str::<Classification>("nope").unwrap_err();
        let err = ClassifierError::from(LlmError::Parse(parse_err));
        assert!(matches!(err, ClassifierError::Malformed(_)));

        let err = ClassifierError::from(LlmError::RateLimited { retries: 3 });
        assert!(matches!(err, ClassifierError::Unavailable(_)));
    }
}
