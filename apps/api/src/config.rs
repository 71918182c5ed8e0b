use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Where evaluation records and transcripts are persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    /// One JSON file per record and one text file per transcript under `data_dir`.
    Filesystem { data_dir: PathBuf },
    /// Same layout as object keys in an S3 / MinIO bucket.
    S3(S3Settings),
}

#[derive(Debug, Clone, PartialEq)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub storage: StorageBackend,
    pub llm_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            storage: storage_from_env()?,
            llm_timeout: Duration::from_secs(
                std::env::var("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn storage_from_env() -> Result<StorageBackend> {
    let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "fs".to_string());
    parse_storage(&backend, |key| std::env::var(key).ok())
}

/// Resolves the storage backend from its name and a variable lookup.
/// Split out from `storage_from_env` so the selection rules are testable.
fn parse_storage(
    backend: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<StorageBackend> {
    let require = |key: &str| {
        lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
    };

    match backend.trim().to_lowercase().as_str() {
        "fs" | "filesystem" => Ok(StorageBackend::Filesystem {
            data_dir: PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "./data".to_string())),
        }),
        "s3" => Ok(StorageBackend::S3(S3Settings {
            bucket: require("S3_BUCKET")?,
            endpoint: require("S3_ENDPOINT")?,
            access_key_id: require("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
        })),
        other => bail!("STORAGE_BACKEND must be 'fs' or 's3', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
