use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use crate::models::evaluation::{EvaluationRecord, EvaluationSummary, TranscriptLine};
use crate::store::{decode_summary, render_lines, sort_newest_first, EvaluationStore, StoreError};

const RECORD_PREFIX: &str = "eval_";
const RECORD_SUFFIX: &str = ".json";

/// Filesystem backend: `eval_<id>.json` and `transcript_<id>.txt` in one directory.
pub struct FsEvaluationStore {
    data_dir: PathBuf,
}

impl FsEvaluationStore {
    /// Opens the store, creating `data_dir` if it does not exist yet.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Evaluation store at {}", data_dir.display());
        Ok(Self { data_dir })
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.data_dir
            .join(format!("{RECORD_PREFIX}{id}{RECORD_SUFFIX}"))
    }

    fn transcript_path(&self, id: Uuid) -> PathBuf {
        self.data_dir.join(format!("transcript_{id}.txt"))
    }

    /// Writes `bytes` to a temp file in the data directory and renames it over `path`.
    async fn write_atomic(&self, path: PathBuf, bytes: Vec<u8>) -> Result<(), StoreError> {
        let dir = self.data_dir.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &bytes))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;
        Ok(())
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn is_record_file(name: &str) -> bool {
    name.starts_with(RECORD_PREFIX) && name.ends_with(RECORD_SUFFIX)
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl EvaluationStore for FsEvaluationStore {
    async fn put(&self, record: &EvaluationRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(record)?;
        self.write_atomic(self.record_path(record.id), bytes).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<EvaluationRecord>, StoreError> {
        match read_optional(&self.record_path(id)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<EvaluationSummary>, StoreError> {
        let mut summaries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.data_dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_record_file(name) {
                continue;
            }

            let bytes = match tokio::fs::read(entry.path()).await {
                Ok(bytes) => bytes,
                // Listing raced with something removing the file
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            summaries.extend(decode_summary(name, &bytes));
        }

        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn reset_transcript(&self, id: Uuid) -> Result<(), StoreError> {
        self.write_atomic(self.transcript_path(id), Vec::new()).await
    }

    async fn append_transcript(
        &self,
        id: Uuid,
        lines: &[TranscriptLine],
    ) -> Result<(), StoreError> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.transcript_path(id))
            .await?;
        file.write_all(render_lines(lines).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn transcript(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        match read_optional(&self.transcript_path(id)).await? {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            None => Ok(None),
        }
    }
}
