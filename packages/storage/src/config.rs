//! Backend selection for the document store.

use std::path::PathBuf;
use std::time::Duration;

use crate::StorageError;

/// Directory used when nothing else is configured.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploaded_docs";

/// Upper bound on a single storage operation.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    S3,
    Filesystem,
    Memory,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::S3 => "s3",
            StorageKind::Filesystem => "filesystem",
            StorageKind::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub allow_http: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Debug, Clone)]
pub enum StorageBackendConfig {
    S3(S3Config),
    Filesystem { root: PathBuf },
    Memory,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackendConfig,
    /// Optional key prefix applied to all document names.
    pub prefix: Option<String>,
    /// Deadline for each store call.
    pub op_timeout: Duration,
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self::with_backend(StorageBackendConfig::Memory)
    }

    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self::with_backend(StorageBackendConfig::Filesystem { root: root.into() })
    }

    pub fn s3(cfg: S3Config) -> Self {
        Self::with_backend(StorageBackendConfig::S3(cfg))
    }

    fn with_backend(backend: StorageBackendConfig) -> Self {
        Self {
            backend,
            prefix: None,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = non_empty(prefix.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    /// Build a config from environment variables.
    ///
    /// - `STORAGE_BACKEND`: `filesystem` (default), `memory` or `s3`
    /// - `STORAGE_FS_ROOT`: upload directory (default `./uploaded_docs`)
    /// - `STORAGE_PREFIX`: optional key prefix
    /// - `STORAGE_TIMEOUT_SECS`: per-operation deadline (default 10)
    /// - `S3_BUCKET`, `AWS_REGION`, `S3_ENDPOINT`, `S3_ALLOW_HTTP`,
    ///   `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` for the s3 backend
    pub fn from_env() -> Result<Self, StorageError> {
        let backend = env("STORAGE_BACKEND");

        let cfg = match backend.as_deref() {
            None | Some("filesystem") | Some("fs") => {
                let root = env("STORAGE_FS_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));
                Self::filesystem(root)
            }
            Some("memory") | Some("mem") => Self::memory(),
            Some("s3") => Self::s3(read_s3_config()?),
            Some(other) => {
                return Err(StorageError::InvalidConfig(format!(
                    "unsupported STORAGE_BACKEND={other} (expected filesystem|memory|s3)"
                )));
            }
        };

        let op_timeout = match env("STORAGE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    StorageError::InvalidConfig(format!(
                        "invalid STORAGE_TIMEOUT_SECS={raw} (expected positive integer)"
                    ))
                })?,
            None => DEFAULT_OP_TIMEOUT,
        };

        Ok(Self {
            prefix: env("STORAGE_PREFIX"),
            op_timeout,
            ..cfg
        })
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(non_empty)
}

pub(crate) fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_s3_config() -> Result<S3Config, StorageError> {
    let bucket = env("S3_BUCKET").ok_or_else(|| {
        StorageError::InvalidConfig("S3_BUCKET is required for s3 backend".into())
    })?;
    let endpoint = env("S3_ENDPOINT");

    let allow_http = match env("S3_ALLOW_HTTP").as_deref() {
        Some("1" | "true" | "yes") => true,
        Some("0" | "false" | "no") => false,
        Some(other) => {
            return Err(StorageError::InvalidConfig(format!(
                "invalid boolean for S3_ALLOW_HTTP={other}"
            )));
        }
        None => endpoint
            .as_deref()
            .is_some_and(|e| e.to_ascii_lowercase().starts_with("http://")),
    };

    Ok(S3Config {
        bucket,
        region: env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        endpoint,
        allow_http,
        access_key_id: env("AWS_ACCESS_KEY_ID"),
        secret_access_key: env("AWS_SECRET_ACCESS_KEY"),
    })
}
