// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/registry.rs
//
// Maps the `kind` of a recipe entry to the code that implements it.
//
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::builtin::{files, npy, NpyDataset, RandomFilesDataset, ReadFiles, ReadNpy};
use crate::config::{DatasetSpec, WorkloadSpec};
use crate::dataset::{Dataset, DatasetGenerator};
use crate::workload::Workload;

/// Builds a dataset generator from the free-form parameters of a recipe entry.
pub type DatasetFactory = fn(&serde_yaml::Value) -> Result<Arc<dyn DatasetGenerator>>;
/// Builds a workload from the free-form parameters of a recipe entry.
pub type WorkloadFactory = fn(&serde_yaml::Value) -> Result<Arc<dyn Workload>>;

#[derive(Clone, Default)]
pub struct Registry {
    datasets: BTreeMap<String, DatasetFactory>,
    workloads: BTreeMap<String, WorkloadFactory>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("datasets", &self.dataset_kinds())
            .field("workloads", &self.workload_kinds())
            .finish()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every kind that ships with perfcapture.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_dataset(npy::NPY_DATASET_KIND, NpyDataset::from_params);
        registry.register_dataset(files::RANDOM_FILES_KIND, RandomFilesDataset::from_params);
        registry.register_workload(npy::READ_NPY_KIND, ReadNpy::from_params);
        registry.register_workload(files::READ_FILES_KIND, ReadFiles::from_params);
        registry
    }

    /// Register (or replace) a dataset kind.
    pub fn register_dataset(&mut self, kind: impl Into<String>, factory: DatasetFactory) {
        self.datasets.insert(kind.into(), factory);
    }

    /// Register (or replace) a workload kind.
    pub fn register_workload(&mut self, kind: impl Into<String>, factory: WorkloadFactory) {
        self.workloads.insert(kind.into(), factory);
    }

    pub fn dataset_kinds(&self) -> Vec<&str> {
        self.datasets.keys().map(String::as_str).collect()
    }

    pub fn workload_kinds(&self) -> Vec<&str> {
        self.workloads.keys().map(String::as_str).collect()
    }

    pub fn build_dataset(&self, spec: &DatasetSpec) -> Result<Dataset> {
        let factory = self.datasets.get(&spec.kind).ok_or_else(|| {
            anyhow!(
                "Unknown dataset kind '{}' for dataset {} (known kinds: {})",
                spec.kind,
                spec.name,
                self.dataset_kinds().join(", ")
            )
        })?;
        let generator = factory(&spec.params).with_context(|| format!("Dataset {}", spec.name))?;
        Ok(Dataset::new(spec.clone(), generator))
    }

    pub fn build_workload(&self, spec: &WorkloadSpec) -> Result<Arc<dyn Workload>> {
        let factory = self.workloads.get(&spec.kind).ok_or_else(|| {
            anyhow!(
                "Unknown workload kind '{}' for workload {} (known kinds: {})",
                spec.kind,
                spec.name,
                self.workload_kinds().join(", ")
            )
        })?;
        factory(&spec.params).with_context(|| format!("Workload {}", spec.name))
    }
}
