//! Classifier backed by Claude. Prompt building lives here; every call goes
//! through `llm_client`.

use async_trait::async_trait;
use serde_json::json;

use crate::evaluation::classifier::{
    AuditOutcome, Classification, Classifier, ClassifierError, InterviewContext,
};
use crate::evaluation::prompts::{
    ANALYZE_PROMPT_TEMPLATE, ANALYZE_SYSTEM, AUDIT_PROMPT_TEMPLATE, AUDIT_SYSTEM,
    INTERVIEW_KICKOFF, INTERVIEW_SYSTEM_TEMPLATE,
};
use crate::llm_client::prompts::{EVIDENCE_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmMessage};
use crate::models::evaluation::{ChatMessage, EvaluationRecord, Role};

pub struct LlmClassifier(pub LlmClient);

fn json_system(base: &str) -> String {
    format!("{base}\n\n{EVIDENCE_INSTRUCTION}\n\n{JSON_ONLY_SYSTEM}")
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn interview_system(context: InterviewContext<'_>) -> String {
    INTERVIEW_SYSTEM_TEMPLATE
        .replace("{candidate_name}", context.candidate_name)
        .replace("{not_found}", &bullet_list(context.not_found))
}

/// Replays the history as alternating turns ending with the new candidate
/// message. The opening greeting is an assistant turn, so the kickoff user
/// turn is put in front of it.
fn conversation(history: &[ChatMessage], message: &str) -> Vec<LlmMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if history.first().map(|m| m.role) == Some(Role::Assistant) {
        messages.push(LlmMessage::user(INTERVIEW_KICKOFF));
    }
    messages.extend(history.iter().map(|m| match m.role {
        Role::User => LlmMessage::user(m.content.clone()),
        Role::Assistant => LlmMessage::assistant(m.content.clone()),
    }));
    messages.push(LlmMessage::user(message));
    messages
}

/// The part of the record the auditor may see. Identity is left out on purpose:
/// it is never the model's to change.
fn audit_view(record: &EvaluationRecord) -> serde_json::Value {
    json!({
        "requirements_total": record.requirements_total,
        "mandatory": record.mandatory,
        "matching": record.matching,
        "unmatching": record.unmatching,
        "not_found": record.not_found,
        "score": record.score,
        "discarded": record.discarded,
    })
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(
        &self,
        offer_text: &str,
        cv_text: &str,
    ) -> Result<Classification, ClassifierError> {
        let prompt = ANALYZE_PROMPT_TEMPLATE
            .replace("{offer_text}", offer_text)
            .replace("{cv_text}", cv_text);
        Ok(self
            .0
            .call_json::<Classification>(&prompt, &json_system(ANALYZE_SYSTEM))
            .await?)
    }

    async fn open_interview(
        &self,
        context: InterviewContext<'_>,
    ) -> Result<String, ClassifierError> {
        Ok(self
            .0
            .call_text(
                &interview_system(context),
                &[LlmMessage::user(INTERVIEW_KICKOFF)],
            )
            .await?)
    }

    async fn reply(
        &self,
        context: InterviewContext<'_>,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ClassifierError> {
        Ok(self
            .0
            .call_text(&interview_system(context), &conversation(history, message))
            .await?)
    }

    async fn reconcile(
        &self,
        record: &EvaluationRecord,
        transcript: &str,
    ) -> Result<AuditOutcome, ClassifierError> {
        let record_json = serde_json::to_string_pretty(&audit_view(record))
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;
        let prompt = AUDIT_PROMPT_TEMPLATE
            .replace("{record_json}", &record_json)
            .replace("{transcript}", transcript);
        Ok(self
            .0
            .call_json::<AuditOutcome>(&prompt, &json_system(AUDIT_SYSTEM))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_list_empty_is_none_marker() {
        assert_eq!(bullet_list(&[]), "(none)");
        assert_eq!(
            bullet_list(&["Docker".to_string(), "AWS".to_string()]),
            "- Docker\n- AWS"
        );
    }

    #[test]
    fn test_interview_system_embeds_name_and_unresolved() {
        let not_found = vec!["Docker".to_string()];
        let system = interview_system(InterviewContext {
            candidate_name: "Pedro Pascal",
            not_found: &not_found,
        });
        assert!(system.contains("Candidate: Pedro Pascal"));
        assert!(system.contains("- Docker"));
        assert!(!system.contains("{not_found}"));
    }

    #[test]
    fn test_conversation_prepends_kickoff_before_greeting() {
        let history = vec![ChatMessage::assistant("Hola Pedro, ¿usas Docker?")];
        let messages = conversation(&history, "Sí, a diario");
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
        assert_eq!(messages[0].content, INTERVIEW_KICKOFF);
        assert_eq!(messages[2].content, "Sí, a diario");
    }

    #[test]
    fn test_conversation_without_greeting_starts_with_user() {
        let messages = conversation(&[], "hola");
        assert_eq!(messages, vec![LlmMessage::user("hola")]);
    }

    #[test]
    fn test_audit_view_omits_identity() {
        let record = EvaluationRecord {
            id: uuid::Uuid::new_v4(),
            candidate_name: "Pedro Pascal".to_string(),
            candidate_identifier: "12345678Z".to_string(),
            requirements_total: 1,
            matching: vec![],
            unmatching: vec![],
            not_found: vec!["Docker".to_string()],
            mandatory: vec!["Docker".to_string()],
            score: 0.0,
            discarded: false,
            status: crate::models::evaluation::EvaluationStatus::InterviewNeeded,
            key_points: vec![],
            red_flags: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            audited_at: None,
        };
        let view = audit_view(&record);
        assert!(view.get("candidate_name").is_none());
        assert!(view.get("candidate_identifier").is_none());
        assert_eq!(view["not_found"][0], "Docker");
    }
}
