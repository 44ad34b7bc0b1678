// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/recipe_config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recipe file: the datasets it defines and the workloads that read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeConfig {
    #[serde(default)]
    pub datasets: Vec<DatasetSpec>,
    #[serde(default)]
    pub workloads: Vec<WorkloadSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: String,
    pub kind: String,                   // registry key, e.g. "npy" | "random_files"
    /// Everything else in the entry; handed to the kind's factory.
    #[serde(flatten)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub name: String,
    pub kind: String,                   // registry key, e.g. "read_npy" | "read_files"
    #[serde(default)]
    pub datasets: Vec<String>,          // names of datasets declared in the same file
    pub n_repeats: Option<u32>,
    #[serde(flatten)]
    pub params: serde_yaml::Value,
}

impl WorkloadSpec {
    /// Number of timed runs per dataset.
    pub fn repeats(&self) -> u32 {
        self.n_repeats.unwrap_or(1)
    }
}

impl RecipeConfig {
    /// Parse a recipe from YAML. Blank input is a recipe with nothing in it.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        if yaml_str.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml_str).map_err(|e| anyhow::anyhow!("Failed to parse recipe YAML: {}", e))
    }

    /// Load a recipe from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe file {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid recipe file {:?}", path))
    }
}
