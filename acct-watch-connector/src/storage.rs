//! # Persistence Writer
//!
//! Appends rendered [`LogRecord`]s to the audit log. The log is append-only:
//! nothing here truncates, rewrites or reads it.

use crate::records::LogRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

/// A destination for complete, newline-terminated record lines.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append_line(&self, line: &str) -> Result<()>;
}

/// A file-backed [`RecordStore`].
///
/// The file is opened in append mode (and created if needed) for every line,
/// so it does not exist until the first record is written. Each line goes out
/// in a single `write_all`; concurrent writers rely on append-mode atomicity.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn append_line(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Stamps, renders and appends records without ever failing the caller.
///
/// Serialization and I/O errors go to the operator log and the record is
/// dropped. There is no retry.
#[derive(Clone)]
pub struct RecordWriter {
    store: Arc<dyn RecordStore>,
}

impl RecordWriter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// A writer appending to the file at `path`.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(path)))
    }

    pub async fn append(&self, record: LogRecord) {
        let kind = record.kind();
        let line = match record.render(Utc::now()) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(prefix = kind.prefix(), "Failed to serialize record: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.append_line(&line).await {
            tracing::error!(prefix = kind.prefix(), "Failed to write to log file: {:#}", e);
        }
    }
}
