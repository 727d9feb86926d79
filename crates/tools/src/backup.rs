//! Pre-change product snapshots.
//!
//! Update and delete write the product as it was before touching the store.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shop_agent_core::{Product, ProductId};
use thiserror::Error;
use tracing::{info, instrument};

/// Errors writing a snapshot.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The product could not be serialized.
    #[error("Failed to serialize product: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The file could not be written.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Destination for named text resources.
#[async_trait]
pub trait ResourceWriter: Send + Sync {
    /// Write `contents` under `name`, replacing any existing resource.
    async fn write_file(&self, name: &str, contents: &str) -> Result<(), BackupError>;
}

/// Writes resources as files under a root directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct FileResourceWriter {
    root: PathBuf,
}

impl FileResourceWriter {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ResourceWriter for FileResourceWriter {
    #[instrument(skip(self, contents), fields(root = %self.root.display()))]
    async fn write_file(&self, name: &str, contents: &str) -> Result<(), BackupError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| BackupError::Io {
                path: self.root.clone(),
                source,
            })?;

        let path = self.root.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| BackupError::Io { path, source })
    }
}

/// Why a snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupAction {
    Update,
    Delete,
}

impl fmt::Display for BackupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// `product_<id>_<action>_<UTC timestamp>.json`
#[must_use]
pub fn snapshot_name(id: ProductId, action: BackupAction, at: DateTime<Utc>) -> String {
    format!("product_{id}_{action}_{}.json", at.format("%Y%m%dT%H%M%SZ"))
}

/// Write a pretty JSON snapshot of `product` and return its name.
///
/// # Errors
///
/// Returns [`BackupError`] if serialization or the write fails.
pub async fn back_up_product(
    writer: &dyn ResourceWriter,
    id: ProductId,
    product: &Product,
    action: BackupAction,
) -> Result<String, BackupError> {
    let name = snapshot_name(id, action, Utc::now());
    let contents = serde_json::to_string_pretty(product)?;
    writer.write_file(&name, &contents).await?;

    info!(product_id = %id, backup = %name, "Product backed up");
    Ok(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_snapshot_name() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            snapshot_name(ProductId::new(42), BackupAction::Delete, at),
            "product_42_delete_20260304T050607Z.json"
        );
    }

    #[tokio::test]
    async fn test_file_writer_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileResourceWriter::new(dir.path().join("backups"));

        writer.write_file("a.json", "{}").await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("backups/a.json")).unwrap();
        assert_eq!(written, "{}");
    }

    #[tokio::test]
    async fn test_back_up_product_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileResourceWriter::new(dir.path());
        let product = Product {
            id: Some(ProductId::new(42)),
            title: "Blue Widget".to_string(),
            ..Product::default()
        };

        let name = back_up_product(&writer, ProductId::new(42), &product, BackupAction::Update)
            .await
            .unwrap();

        assert!(name.starts_with("product_42_update_"));
        let written = std::fs::read_to_string(writer.root().join(&name)).unwrap();
        let restored: Product = serde_json::from_str(&written).unwrap();
        assert_eq!(restored, product);
        assert!(written.contains('\n'));
    }

    #[tokio::test]
    async fn test_write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let err = FileResourceWriter::new(&blocker)
            .write_file("a.json", "{}")
            .await
            .unwrap_err();
        assert!(matches!(err, BackupError::Io { .. }));
    }
}
