// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// src/runner.rs
//
// The orchestrator: discover recipes, prepare datasets, run workloads.
//
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::cache::PageCache;
use crate::config::RunConfig;
use crate::dataset::{Dataset, Preparation};
use crate::metrics::{RunSummary, RunTimer};
use crate::recipe::{discover_recipes, Recipe};
use crate::registry::Registry;
use crate::workload::RecipeWorkload;

/// Timings for one workload on one dataset.
#[derive(Debug, Clone)]
pub struct WorkloadReport {
    pub workload: String,
    pub dataset: String,
    pub dataset_path: PathBuf,
    pub summary: RunSummary,
}

impl fmt::Display for WorkloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} on {} ({} run(s), {})",
            self.workload,
            self.dataset,
            self.summary.runs,
            self.dataset_path.display()
        )?;
        write!(f, "{}", self.summary)
    }
}

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub recipes: Vec<String>,
    pub datasets_created: Vec<String>,
    pub datasets_reused: Vec<String>,
    pub workloads: Vec<WorkloadReport>,
}

/// Drives one benchmark run, sequentially: every dataset is prepared before
/// the first workload starts, and workloads run one at a time.
#[derive(Debug)]
pub struct Runner {
    config: RunConfig,
    registry: Registry,
}

impl Runner {
    /// A runner that knows the built-in dataset and workload kinds.
    pub fn new(config: RunConfig) -> Self {
        Self::with_registry(config, Registry::with_builtins())
    }

    pub fn with_registry(config: RunConfig, registry: Registry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate()?;

        let recipes = discover_recipes(&self.config.recipe_path, &self.registry)?;
        info!("Found {} recipe(s) in {:?}", recipes.len(), self.config.recipe_path);

        let workloads = self.select_workloads(&recipes);
        info!("Selected {} workload(s)", workloads.len());

        let datasets = self.datasets_to_prepare(&recipes, &workloads);
        info!("Found {} dataset(s)", datasets.len());

        let mut report = RunReport {
            recipes: recipes.iter().map(|r| r.name().to_string()).collect(),
            ..RunReport::default()
        };

        for dataset in datasets {
            match dataset.create_if_necessary(&self.config.data_path).await? {
                Preparation::Created => report.datasets_created.push(dataset.name().to_string()),
                Preparation::AlreadyExists => report.datasets_reused.push(dataset.name().to_string()),
            }
        }

        if !workloads.is_empty() {
            let cache = PageCache::resolve(self.config.keep_cache)?;
            for workload in workloads {
                report.workloads.extend(self.run_workload(workload, &cache).await?);
            }
        }

        info!("✅ Run completed");
        Ok(report)
    }

    /// All workloads in discovery order, narrowed to the selection if one was given.
    fn select_workloads<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a RecipeWorkload> {
        let all = recipes.iter().flat_map(|r| r.workloads());
        let Some(selected) = &self.config.selected_workloads else {
            return all.collect();
        };

        let known: HashSet<&str> = recipes
            .iter()
            .flat_map(|r| r.workloads())
            .map(|w| w.name())
            .collect();
        for name in selected {
            if !known.contains(name.as_str()) {
                warn!("Selected workload {} was not found in any recipe", name);
            }
        }

        all.filter(|w| selected.iter().any(|s| s == w.name())).collect()
    }

    /// Without a selection every declared dataset is prepared; with one, only
    /// the datasets the selected workloads read.
    fn datasets_to_prepare<'a>(
        &self,
        recipes: &'a [Recipe],
        workloads: &[&'a RecipeWorkload],
    ) -> Vec<&'a Dataset> {
        let candidates: Vec<&'a Dataset> = if self.config.selected_workloads.is_some() {
            workloads.iter().copied().flat_map(|w| w.datasets()).collect()
        } else {
            recipes.iter().flat_map(|r| r.datasets()).collect()
        };

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|d| seen.insert(d.name().to_string()))
            .collect()
    }

    async fn run_workload(&self, workload: &RecipeWorkload, cache: &PageCache) -> Result<Vec<WorkloadReport>> {
        if workload.datasets().is_empty() {
            warn!("Workload {} has no datasets; nothing to run", workload.name());
        }

        let mut reports = Vec::with_capacity(workload.datasets().len());
        for dataset in workload.datasets() {
            let path = dataset.path(&self.config.data_path);
            info!("Running {} {} times on {:?}!", workload.name(), workload.n_repeats(), path);

            let mut timer = RunTimer::new();
            for _ in 0..workload.n_repeats() {
                cache.evict(&path).await?;
                timer.start_run();
                let mut metrics = workload.run(&path).await.with_context(|| {
                    format!("Workload {} failed on dataset {}", workload.name(), dataset.name())
                })?;
                timer.stop_run(&mut metrics);
                debug!("{} run {:?}: {:?}", workload.name(), metrics.run_id, metrics);
            }

            let summary = timer.summary();
            info!("  Finished!\n{}", summary);
            reports.push(WorkloadReport {
                workload: workload.name().to_string(),
                dataset: dataset.name().to_string(),
                dataset_path: path,
                summary,
            });
        }
        Ok(reports)
    }
}
