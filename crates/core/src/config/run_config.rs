// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/run_config.rs
use anyhow::{bail, Context, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::info;

/// Everything a single benchmark run needs, passed explicitly to the `Runner`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Where datasets are created and read from.
    pub data_path: PathBuf,
    /// A directory of recipe files, or a single recipe file.
    pub recipe_path: PathBuf,
    /// When set, only these workloads run.
    pub selected_workloads: Option<Vec<String>>,
    /// Skip `vmtouch -e` before each run.
    pub keep_cache: bool,
}

impl RunConfig {
    pub fn new(data_path: impl Into<PathBuf>, recipe_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            recipe_path: recipe_path.into(),
            selected_workloads: None,
            keep_cache: false,
        }
    }

    pub fn with_selected_workloads(mut self, names: Vec<String>) -> Self {
        self.selected_workloads = Some(names);
        self
    }

    pub fn with_keep_cache(mut self, keep_cache: bool) -> Self {
        self.keep_cache = keep_cache;
        self
    }

    /// Make sure the recipe path exists and the data path is a writable
    /// directory (creating it if needed). Nothing is created when the recipe
    /// path is bad.
    pub fn validate(&self) -> Result<()> {
        self.check_recipe_path()?;
        self.prepare_data_path()
    }

    fn prepare_data_path(&self) -> Result<()> {
        let path = &self.data_path;
        match std::fs::metadata(path) {
            Ok(meta) if !meta.is_dir() => {
                bail!("Data path {:?} exists but is not a directory", path)
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                std::fs::create_dir_all(path)
                    .with_context(|| format!("Data path {:?} does not exist and could not be created", path))?;
                info!("Created data directory: {:?}", path);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Data path {:?} is not accessible", path));
            }
        }

        // Probe with a real file; permission bits alone don't tell the whole story.
        tempfile::NamedTempFile::new_in(path)
            .with_context(|| format!("Data path {:?} is not writable", path))?;
        Ok(())
    }

    fn check_recipe_path(&self) -> Result<()> {
        let path = &self.recipe_path;
        std::fs::metadata(path)
            .with_context(|| format!("Recipe path {:?} does not exist or cannot be accessed", path))?;
        Ok(())
    }
}
