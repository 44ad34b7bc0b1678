//! Core library for perfcapture ─ recipe discovery, dataset preparation and
//! timed workload execution.

pub mod builtin;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod metrics;
pub mod recipe;
pub mod registry;
pub mod runner;
pub mod workload;

pub use cache::PageCache;
pub use config::{RecipeConfig, RunConfig};
pub use dataset::{Dataset, DatasetGenerator, Preparation};
pub use metrics::{RunMetrics, RunSummary, RunTimer};
pub use recipe::{discover_recipes, Recipe};
pub use registry::Registry;
pub use runner::{RunReport, Runner, WorkloadReport};
pub use workload::{RecipeWorkload, Workload};
