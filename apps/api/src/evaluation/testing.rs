//! Deterministic classifier used by the state machine and router tests.

use async_trait::async_trait;

use crate::evaluation::classifier::{
    AuditOutcome, Classification, Classifier, ClassifierError, InterviewContext,
};
use crate::models::evaluation::{ChatMessage, EvaluationRecord};

type ReconcileFn =
    fn(&EvaluationRecord, &str) -> Result<AuditOutcome, ClassifierError>;

/// Three mandatory requirements: one confirmed, one contradicted, one never mentioned.
pub fn scenario_classification() -> Classification {
    Classification {
        requirements_total: 3,
        mandatory: vec![
            "FastAPI".to_string(),
            "LangChain".to_string(),
            "Docker".to_string(),
        ],
        matching: vec!["FastAPI".to_string()],
        unmatching: vec!["Docker".to_string()],
        not_found: vec!["LangChain".to_string()],
        score: 33.3,
        discarded: true,
    }
}

pub struct FakeClassifier {
    classification: Result<Classification, String>,
    reconcile: ReconcileFn,
    replies_fail: bool,
}

impl FakeClassifier {
    pub fn new(classification: Classification) -> Self {
        Self {
            classification: Ok(classification),
            reconcile: reconcile_from_transcript,
            replies_fail: false,
        }
    }

    /// A classifier whose `classify` always fails with `error`.
    pub fn failing(error: ClassifierError) -> Self {
        Self {
            classification: Err(error.to_string()),
            reconcile: reconcile_from_transcript,
            replies_fail: false,
        }
    }

    pub fn with_reconcile(mut self, reconcile: ReconcileFn) -> Self {
        self.reconcile = reconcile;
        self
    }

    /// Interview replies after the opening greeting fail as if the model were down.
    pub fn with_failing_replies(mut self) -> Self {
        self.replies_fail = true;
        self
    }
}

/// "I know X" confirms X, "I don't know X" denies it; anything else stays not found.
fn reconcile_from_transcript(
    record: &EvaluationRecord,
    transcript: &str,
) -> Result<AuditOutcome, ClassifierError> {
    let transcript = transcript.to_lowercase();
    let mut matching = record.matching.clone();
    let mut unmatching = record.unmatching.clone();
    let mut not_found = Vec::new();
    let mut key_points = Vec::new();

    for requirement in &record.not_found {
        let lower = requirement.to_lowercase();
        if transcript.contains(&format!("i don't know {lower}")) {
            unmatching.push(requirement.clone());
            key_points.push(format!("Candidate lacks {requirement}"));
        } else if transcript.contains(&format!("i know {lower}")) {
            matching.push(requirement.clone());
            key_points.push(format!("Candidate confirmed {requirement}"));
        } else {
            not_found.push(requirement.clone());
        }
    }

    let red_flags = if transcript.contains("candidate: yes\n") {
        vec!["Vague answer without detail".to_string()]
    } else {
        vec![]
    };

    Ok(AuditOutcome {
        evaluation: Classification {
            requirements_total: record.requirements_total,
            mandatory: record.mandatory.clone(),
            score: matching.len() as f64 / record.requirements_total as f64 * 100.0,
            discarded: record.discarded,
            matching,
            unmatching,
            not_found,
        },
        key_points,
        red_flags,
    })
}

fn next_question(context: InterviewContext<'_>) -> String {
    match context.not_found.first() {
        Some(requirement) => format!(
            "Thanks, {}. Can you tell me about your experience with {requirement}?",
            context.candidate_name
        ),
        None => format!(
            "Thank you, {}. I have all the information I need, no further questions.",
            context.candidate_name
        ),
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(
        &self,
        _offer_text: &str,
        _cv_text: &str,
    ) -> Result<Classification, ClassifierError> {
        self.classification
            .clone()
            .map_err(ClassifierError::Malformed)
    }

    async fn open_interview(
        &self,
        context: InterviewContext<'_>,
    ) -> Result<String, ClassifierError> {
        Ok(next_question(context))
    }

    async fn reply(
        &self,
        context: InterviewContext<'_>,
        _history: &[ChatMessage],
        _message: &str,
    ) -> Result<String, ClassifierError> {
        if self.replies_fail {
            return Err(ClassifierError::Unavailable("model overloaded".into()));
        }
        Ok(next_question(context))
    }

    async fn reconcile(
        &self,
        record: &EvaluationRecord,
        transcript: &str,
    ) -> Result<AuditOutcome, ClassifierError> {
        (self.reconcile)(record, transcript)
    }
}
