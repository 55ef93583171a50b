//! Durable storage for captured payloads.

use std::path::{Path, PathBuf};

use kiosk_config::StorageConfig;
use kiosk_protocols::CapturedPayload;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";
const MAX_SUFFIX: u32 = 1000;

/// Writes one pretty-printed JSON file per captured payload.
///
/// Writes are serialized through an internal lock; existing files are never
/// overwritten.
pub struct PayloadStore {
    dir: PathBuf,
    prefix: String,
    write_lock: Mutex<()>,
}

impl PayloadStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.resolved_data_dir(), config.file_prefix.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Base file name (without extension) for a payload.
    pub fn file_stem(&self, payload: &CapturedPayload) -> String {
        format!(
            "{}_{}",
            self.prefix,
            payload.received_at.format(TIMESTAMP_FORMAT)
        )
    }

    /// Persist the payload body and return the written path.
    pub async fn save(&self, payload: &CapturedPayload) -> Result<PathBuf, StoreError> {
        let mut contents = serde_json::to_vec_pretty(&payload.body)?;
        contents.push(b'\n');

        let _guard = self.write_lock.lock().await;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let stem = self.file_stem(payload);
        for suffix in 0..MAX_SUFFIX {
            let name = match suffix {
                0 => format!("{}.json", stem),
                n => format!("{}_{}.json", stem, n),
            };
            let path = self.dir.join(name);

            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            let mut file = match file {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("{} exists, trying next suffix", path.display());
                    continue;
                }
                Err(source) => return Err(StoreError::Io { path, source }),
            };

            let written = async {
                file.write_all(&contents).await?;
                file.sync_all().await
            }
            .await;
            if let Err(source) = written {
                return Err(StoreError::Io { path, source });
            }

            info!("Saved captured payload to {}", path.display());
            return Ok(path);
        }

        Err(StoreError::NameExhausted(stem))
    }
}
