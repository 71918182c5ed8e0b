//! Dashboard — read-only views over the evaluation store.
//!
//! Never writes and never calls the classifier. Sees only committed records.

pub mod handlers;

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::evaluation::{EvaluationRecord, EvaluationSummary};
use crate::store::EvaluationStore;

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationDetail {
    pub evaluation: EvaluationRecord,
    /// Snapshot of the transcript; empty when no interview was started.
    pub transcript: String,
}

#[derive(Clone)]
pub struct Dashboard {
    store: Arc<dyn EvaluationStore>,
}

impl Dashboard {
    pub fn new(store: Arc<dyn EvaluationStore>) -> Self {
        Self { store }
    }

    /// Every evaluation, most recently modified first.
    pub async fn summaries(&self) -> Result<Vec<EvaluationSummary>, AppError> {
        Ok(self.store.list().await?)
    }

    pub async fn detail(&self, id: Uuid) -> Result<EvaluationDetail, AppError> {
        let evaluation = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Evaluation {id} not found")))?;
        let transcript = self.store.transcript(id).await?.unwrap_or_default();
        Ok(EvaluationDetail {
            evaluation,
            transcript,
        })
    }
}
