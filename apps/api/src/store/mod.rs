//! Evaluation Store — durable keyed storage for evaluation records and transcripts.
//!
//! One record blob and one transcript blob per evaluation id. Records are only
//! ever replaced whole, and every backend makes that replace atomic: a reader
//! sees either the previous record or the new one, never a mix.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::evaluation::{EvaluationRecord, EvaluationSummary, TranscriptLine};

pub mod fs;
pub mod s3;

pub use fs::FsEvaluationStore;
pub use s3::S3EvaluationStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("S3 error: {0}")]
    S3(String),
}

/// Storage contract shared by every backend.
///
/// Carried by the state machine and the dashboard as `Arc<dyn EvaluationStore>`.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Creates or wholly replaces the record stored under `record.id`.
    async fn put(&self, record: &EvaluationRecord) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<EvaluationRecord>, StoreError>;

    /// Summaries of every readable record, most recently modified first.
    async fn list(&self) -> Result<Vec<EvaluationSummary>, StoreError>;

    /// Creates the transcript for `id`, truncating any previous one.
    async fn reset_transcript(&self, id: Uuid) -> Result<(), StoreError>;

    /// Appends `lines` in order with a single write to the backend.
    async fn append_transcript(
        &self,
        id: Uuid,
        lines: &[TranscriptLine],
    ) -> Result<(), StoreError>;

    /// `None` when no interview was ever started for `id`.
    async fn transcript(&self, id: Uuid) -> Result<Option<String>, StoreError>;
}

/// Orders summaries newest first; ties fall back to id for a stable listing.
pub(crate) fn sort_newest_first(summaries: &mut [EvaluationSummary]) {
    summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.id.cmp(&b.id)));
}

/// The transcript bytes for a batch of lines.
pub(crate) fn render_lines(lines: &[TranscriptLine]) -> String {
    lines.iter().map(TranscriptLine::render).collect()
}

/// Summary of a stored record blob, or `None` (logged) when the blob is not a record.
pub(crate) fn decode_summary(source: &str, bytes: &[u8]) -> Option<EvaluationSummary> {
    match serde_json::from_slice::<EvaluationRecord>(bytes) {
        Ok(record) => Some(EvaluationSummary::from(&record)),
        Err(e) => {
            warn!("Skipping unreadable evaluation {source}: {e}");
            None
        }
    }
}
