// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::WorkloadSpec;
use crate::dataset::Dataset;
use crate::metrics::RunMetrics;

/// The benchmarked work itself. Implemented once per workload kind.
#[async_trait]
pub trait Workload: Send + Sync {
    /// Run once against the dataset stored at `dataset_path`.
    async fn run(&self, dataset_path: &Path) -> Result<RunMetrics>;
}

/// A workload declared by a recipe, with the datasets it reads.
#[derive(Clone)]
pub struct RecipeWorkload {
    spec: WorkloadSpec,
    datasets: Vec<Dataset>,
    workload: Arc<dyn Workload>,
}

impl std::fmt::Debug for RecipeWorkload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeWorkload")
            .field("name", &self.spec.name)
            .field("kind", &self.spec.kind)
            .field("datasets", &self.spec.datasets)
            .field("n_repeats", &self.n_repeats())
            .finish()
    }
}

impl RecipeWorkload {
    pub fn new(spec: WorkloadSpec, datasets: Vec<Dataset>, workload: Arc<dyn Workload>) -> Self {
        Self { spec, datasets, workload }
    }

    /// Unique amongst all workloads of a run.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> &str {
        &self.spec.kind
    }

    pub fn n_repeats(&self) -> u32 {
        self.spec.repeats()
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub async fn run(&self, dataset_path: &Path) -> Result<RunMetrics> {
        self.workload.run(dataset_path).await
    }
}
