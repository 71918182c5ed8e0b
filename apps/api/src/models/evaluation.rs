use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an evaluation sits in the analyze → interview → audit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Analyzed and not discarded; the interview is expected next.
    InterviewNeeded,
    /// Discarded at analysis, or audited.
    Finished,
}

/// The durable per-evaluation state. One JSON blob per evaluation id.
///
/// `matching`, `unmatching` and `not_found` partition the requirement units
/// extracted from the offer; their sizes always sum to `requirements_total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: Uuid,
    pub candidate_name: String,
    pub candidate_identifier: String,
    pub requirements_total: usize,
    pub matching: Vec<String>,
    pub unmatching: Vec<String>,
    pub not_found: Vec<String>,
    /// Requirement units the offer marks as required rather than desirable.
    pub mandatory: Vec<String>,
    pub score: f64,
    pub discarded: bool,
    pub status: EvaluationStatus,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub audited_at: Option<DateTime<Utc>>,
}

impl EvaluationRecord {
    pub fn is_audited(&self) -> bool {
        self.audited_at.is_some()
    }
}

/// Dashboard row for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub id: Uuid,
    pub candidate_name: String,
    pub score: f64,
    pub discarded: bool,
    pub requirements_total: usize,
    /// Last-modified time of the record.
    pub timestamp: DateTime<Utc>,
}

impl From<&EvaluationRecord> for EvaluationSummary {
    fn from(record: &EvaluationRecord) -> Self {
        Self {
            id: record.id,
            candidate_name: record.candidate_name.clone(),
            score: record.score,
            discarded: record.discarded,
            requirements_total: record.requirements_total,
            timestamp: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of the interview as exchanged with the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Candidate,
    Evaluator,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Candidate => f.write_str("Candidate"),
            Speaker::Evaluator => f.write_str("Evaluator"),
        }
    }
}

/// One line of the append-only interview transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptLine {
    pub fn candidate(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Candidate,
            text: text.into(),
        }
    }

    pub fn evaluator(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Evaluator,
            text: text.into(),
        }
    }

    /// `Speaker: text` terminated by a newline, as stored in the transcript blob.
    ///
    /// Line breaks inside the text are folded into spaces: one turn is always
    /// exactly one line, so a message cannot smuggle in another speaker's turn.
    pub fn render(&self) -> String {
        let text = self
            .text
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}: {text}\n", self.speaker)
    }
}
