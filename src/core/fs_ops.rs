// src/core/fs_ops.rs
//! JSON file persistence for the session and local collections

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Read a JSON document. A missing file is `Ok(None)`.
    pub async fn read_json<T>(path: &Path) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        if !path.exists() {
            debug!("No file at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
        Ok(Some(value))
    }

    /// Write a JSON document, creating the parent directory. The content is
    /// written to a sibling temp file first and renamed into place.
    pub async fn write_json<T>(path: &Path, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .await
            .with_context(|| format!("Failed to move {} into place", tmp_path.display()))?;

        debug!("Written file: {}", path.display());
        Ok(())
    }

    pub async fn remove_file_if_exists(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .await
                .with_context(|| format!("Failed to remove file: {}", path.display()))?;
            info!("Removed file: {}", path.display());
        }
        Ok(())
    }
}
