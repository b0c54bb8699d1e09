//! Document store for uploaded print files.
//!
//! Maps a logical document name to bytes held by an `object_store` backend:
//! - on-disk upload directory for normal deployments
//! - in-memory storage for tests
//! - S3-compatible storage when documents live off-box
//!
//! Every call is bounded by the configured operation timeout so a slow backend
//! surfaces as [`StorageError::Timeout`] instead of stalling the caller.

mod config;

use std::future::Future;
use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use object_store::ObjectStore;
use object_store::aws::S3CopyIfNotExists;
use object_store::ObjectStoreExt;
use object_store::path::Path;
use object_store::{PutMode, PutOptions, PutPayload};

pub use config::{
    DEFAULT_OP_TIMEOUT, DEFAULT_UPLOAD_DIR, S3Config, StorageBackendConfig, StorageConfig,
    StorageKind,
};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage config: {0}")]
    InvalidConfig(String),

    #[error("invalid document name {0:?}")]
    InvalidName(String),

    #[error("document {0:?} not found")]
    NotFound(String),

    #[error("document {0:?} already exists")]
    AlreadyExists(String),

    #[error("storage {op} of {name:?} timed out after {after:?}")]
    Timeout {
        op: &'static str,
        name: String,
        after: Duration,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object_store error: {0}")]
    ObjectStore(#[from] object_store::Error),
}

/// A document as it sits in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRef {
    pub name: String,
    pub size: u64,
}

#[derive(Clone)]
pub struct DocumentStore {
    kind: StorageKind,
    store: Arc<dyn ObjectStore>,
    prefix: Option<String>,
    op_timeout: Duration,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("kind", &self.kind)
            .field("prefix", &self.prefix)
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}

impl DocumentStore {
    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    /// Open the configured backend. The upload directory is created if absent.
    pub fn new(cfg: StorageConfig) -> Result<Self, StorageError> {
        let (kind, store) = match cfg.backend {
            StorageBackendConfig::S3(s3) => (StorageKind::S3, Arc::new(build_s3(s3)?) as _),
            StorageBackendConfig::Filesystem { root } => {
                ensure_dir(&root)?;
                let fs = object_store::local::LocalFileSystem::new_with_prefix(&root)?;
                tracing::info!(root = %root.display(), "Using upload directory");
                (StorageKind::Filesystem, Arc::new(fs) as _)
            }
            StorageBackendConfig::Memory => {
                let mem = object_store::memory::InMemory::new();
                (StorageKind::Memory, Arc::new(mem) as _)
            }
        };

        Ok(Self {
            kind,
            store,
            prefix: cfg.prefix.and_then(config::non_empty),
            op_timeout: cfg.op_timeout,
        })
    }

    pub fn memory() -> Self {
        Self {
            kind: StorageKind::Memory,
            store: Arc::new(object_store::memory::InMemory::new()),
            prefix: None,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, StorageError> {
        Self::new(StorageConfig::from_env()?)
    }

    fn to_path(&self, name: &str) -> Result<Path, StorageError> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(StorageError::InvalidName(name.to_string()));
        }

        let joined = match self.prefix.as_deref().map(|p| p.trim_matches('/')) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}/{name}"),
            _ => name.to_string(),
        };

        // Keys must equal the file name on disk; object_store would percent-encode
        // reserved characters instead.
        let path = Path::from(joined);
        if path.filename() != Some(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(path)
    }

    /// Store `bytes` under `name`. Never overwrites: an existing document
    /// yields [`StorageError::AlreadyExists`].
    pub async fn save(&self, name: &str, bytes: Bytes) -> Result<StoredRef, StorageError> {
        let path = self.to_path(name)?;
        let size = bytes.len() as u64;
        let opts = PutOptions::from(PutMode::Create);

        bounded(
            self.op_timeout,
            "save",
            name,
            self.store.put_opts(&path, PutPayload::from(bytes), opts),
        )
        .await?;

        tracing::debug!(name, size, "Saved document");
        Ok(StoredRef {
            name: name.to_string(),
            size,
        })
    }

    pub async fn fetch(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = self.to_path(name)?;
        let store = self.store.clone();
        bounded(self.op_timeout, "fetch", name, async move {
            store.get(&path).await?.bytes().await
        })
        .await
    }

    pub async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.to_path(name)?;
        match bounded(self.op_timeout, "head", name, self.store.head(&path)).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Move `from` to `to`. Fails without touching either name when `from`
    /// is missing or `to` is taken.
    pub async fn rename(&self, from: &str, to: &str) -> Result<StoredRef, StorageError> {
        self.rename_with(from, to, |store, src, dst| async move {
            store.rename_if_not_exists(&src, &dst).await
        })
        .await
    }

    async fn rename_with<F, Fut>(
        &self,
        from: &str,
        to: &str,
        move_object: F,
    ) -> Result<StoredRef, StorageError>
    where
        F: FnOnce(Arc<dyn ObjectStore>, Path, Path) -> Fut,
        Fut: Future<Output = Result<(), object_store::Error>>,
    {
        let src = self.to_path(from)?;
        let dst = self.to_path(to)?;

        let meta = bounded(self.op_timeout, "head", from, self.store.head(&src)).await?;
        if self.exists(to).await? {
            return Err(StorageError::AlreadyExists(to.to_string()));
        }
        let renamed = StoredRef {
            name: to.to_string(),
            size: meta.size as u64,
        };

        let result = bounded(
            self.op_timeout,
            "rename",
            from,
            move_object(self.store.clone(), src, dst),
        )
        .await;

        match result {
            Ok(()) => {}
            Err(StorageError::AlreadyExists(_)) => {
                return Err(StorageError::AlreadyExists(to.to_string()));
            }
            Err(StorageError::NotFound(_)) => {
                return Err(StorageError::NotFound(from.to_string()));
            }
            Err(e) => {
                // `to` was free before the move, so whatever sits there now came from it.
                let source_left = self.exists(from).await.unwrap_or(true);
                let target_present = self.exists(to).await.unwrap_or(false);
                match (source_left, target_present) {
                    (false, true) => {
                        tracing::warn!(from, to, error = %e, "Rename reported an error after the move landed");
                    }
                    (true, true) => {
                        if let Err(cleanup) = self.delete(to).await {
                            tracing::warn!(from, to, error = %cleanup, "Failed to roll back partial rename");
                        }
                        return Err(e);
                    }
                    _ => return Err(e),
                }
            }
        }

        tracing::debug!(from, to, "Renamed document");
        Ok(renamed)
    }

    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.to_path(name)?;
        bounded(self.op_timeout, "delete", name, self.store.delete(&path)).await?;
        tracing::debug!(name, "Deleted document");
        Ok(())
    }
}

/// Run a store call under `limit`, mapping missing/existing objects to the
/// document-level variants.
async fn bounded<T>(
    limit: Duration,
    op: &'static str,
    name: &str,
    fut: impl Future<Output = Result<T, object_store::Error>>,
) -> Result<T, StorageError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(object_store::Error::NotFound { .. })) => {
            Err(StorageError::NotFound(name.to_string()))
        }
        Ok(Err(object_store::Error::AlreadyExists { .. })) => {
            Err(StorageError::AlreadyExists(name.to_string()))
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(StorageError::Timeout {
            op,
            name: name.to_string(),
            after: limit,
        }),
    }
}

fn ensure_dir(root: &FsPath) -> Result<(), StorageError> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

fn build_s3(cfg: S3Config) -> Result<object_store::aws::AmazonS3, StorageError> {
    let mut builder = object_store::aws::AmazonS3Builder::new()
        .with_bucket_name(cfg.bucket)
        .with_region(cfg.region)
        .with_allow_http(cfg.allow_http)
        .with_copy_if_not_exists(S3CopyIfNotExists::Multipart);

    if let Some(endpoint) = cfg.endpoint {
        builder = builder.with_endpoint(endpoint);
    }
    if let Some(access_key_id) = cfg.access_key_id {
        builder = builder.with_access_key_id(access_key_id);
    }
    if let Some(secret_access_key) = cfg.secret_access_key {
        builder = builder.with_secret_access_key(secret_access_key);
    }

    Ok(builder.build()?)
}
