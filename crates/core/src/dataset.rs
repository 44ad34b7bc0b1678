// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// src/dataset.rs
//
// Datasets: named, on-disk inputs that workloads read.
//
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::DatasetSpec;

/// Writes a dataset to disk. Implemented once per dataset kind.
#[async_trait]
pub trait DatasetGenerator: Send + Sync {
    /// Create the dataset at `path`: either a single file or a directory.
    /// `path` does not exist yet, but its parent does.
    async fn generate(&self, path: &Path) -> Result<()>;
}

/// Outcome of `Dataset::create_if_necessary`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preparation {
    Created,
    AlreadyExists,
}

/// A dataset declared by a recipe, bound to the generator for its kind.
#[derive(Clone)]
pub struct Dataset {
    spec: DatasetSpec,
    generator: Arc<dyn DatasetGenerator>,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("name", &self.spec.name)
            .field("kind", &self.spec.kind)
            .finish()
    }
}

impl Dataset {
    pub fn new(spec: DatasetSpec, generator: Arc<dyn DatasetGenerator>) -> Self {
        Self { spec, generator }
    }

    /// Unique amongst all datasets of a run; also the on-disk name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> &str {
        &self.spec.kind
    }

    pub fn spec(&self) -> &DatasetSpec {
        &self.spec
    }

    /// Location of this dataset below `data_path`.
    pub fn path(&self, data_path: &Path) -> PathBuf {
        data_path.join(&self.spec.name)
    }

    /// True if the dataset is already on disk: a non-empty directory or a
    /// single file.
    pub async fn already_exists(&self, data_path: &Path) -> Result<bool> {
        path_holds_data(&self.path(data_path)).await
    }

    /// Generate the dataset unless it is already on disk. A failed generation
    /// leaves nothing behind, so the next run tries again.
    pub async fn create_if_necessary(&self, data_path: &Path) -> Result<Preparation> {
        let path = self.path(data_path);
        if self.already_exists(data_path).await? {
            info!("{} already exists.", self.name());
            return Ok(Preparation::AlreadyExists);
        }

        info!("Creating dataset for {} at {:?}", self.name(), path);
        // An empty directory left over from an earlier attempt doesn't count as data.
        if tokio::fs::metadata(&path).await.is_ok() {
            remove_path(&path).await?;
        }

        if let Err(e) = self.generator.generate(&path).await {
            if tokio::fs::symlink_metadata(&path).await.is_ok() {
                if let Err(cleanup) = remove_path(&path).await {
                    warn!("Failed to remove partial dataset {:?}: {:#}", path, cleanup);
                }
            }
            return Err(e).with_context(|| format!("Failed to create dataset {}", self.name()));
        }
        Ok(Preparation::Created)
    }
}

/// Returns true if `path` is a directory with at least one entry.
pub async fn path_not_empty(path: &Path) -> Result<bool> {
    let mut entries = tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Failed to list {:?}", path))?;
    // One entry is enough; don't walk the rest.
    Ok(entries.next_entry().await?.is_some())
}

async fn path_holds_data(path: &Path) -> Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => path_not_empty(path).await,
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to inspect {:?}", path)),
    }
}

async fn remove_path(path: &Path) -> Result<()> {
    let meta = tokio::fs::symlink_metadata(path).await?;
    let removed = if meta.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    removed.with_context(|| format!("Failed to remove {:?}", path))
}
