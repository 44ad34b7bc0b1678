// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// src/cache.rs
//
// Page cache eviction between runs, via `vmtouch -e`.
//
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const VMTOUCH: &str = "vmtouch";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCache {
    /// Leave the page cache alone.
    Keep,
    /// Evict the dataset from the page cache before every run.
    Evict { vmtouch: PathBuf },
}

impl PageCache {
    /// `Keep` when `keep_cache` is set, otherwise `Evict` with `vmtouch`
    /// found on `PATH`.
    pub fn resolve(keep_cache: bool) -> Result<Self> {
        if keep_cache {
            return Ok(Self::Keep);
        }
        match which::which(VMTOUCH) {
            Ok(vmtouch) => {
                debug!("Using {:?} to evict the page cache", vmtouch);
                Ok(Self::Evict { vmtouch })
            }
            Err(_) => bail!(
                "If you want to flush the page cache before each run, then please install {}. \
                 Or run with the --keep-cache option, which does not call {}.",
                VMTOUCH,
                VMTOUCH
            ),
        }
    }

    pub async fn evict(&self, path: &Path) -> Result<()> {
        let vmtouch = match self {
            Self::Keep => return Ok(()),
            Self::Evict { vmtouch } => vmtouch,
        };

        let output = tokio::process::Command::new(vmtouch)
            .arg("-e")
            .arg(path)
            .output()
            .await
            .with_context(|| format!("Failed to start {:?}", vmtouch))?;
        if !output.status.success() {
            bail!(
                "{:?} -e {:?} failed with {}: {}",
                vmtouch,
                path,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}
