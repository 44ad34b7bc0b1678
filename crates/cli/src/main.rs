// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use clap::Parser;
use perfcapture_core::{RunConfig, Runner};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// perfcapture – run benchmark workloads against on-disk datasets and report
/// how long they take.
///
/// Datasets required by the workloads are generated first and stored below
/// `--data-path`; creating them is never timed. They are not removed
/// afterwards, so later runs reuse them. If you change how a recipe builds a
/// dataset, delete the old dataset by hand.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory for the datasets the benchmarks read (created if missing)
    #[arg(long, env = "PERFCAPTURE_DATA_PATH")]
    data_path: PathBuf,

    /// Recipe file, or directory of *.yaml recipes defining datasets and workloads
    #[arg(long, env = "PERFCAPTURE_RECIPE_PATH")]
    recipe_path: PathBuf,

    /// Space-separated names of the workloads to run (default: all)
    #[arg(long)]
    selected_workloads: Option<String>,

    /// Don't call `vmtouch -e` on the dataset before each run
    #[arg(long)]
    keep_cache: bool,
}

impl Args {
    fn into_run_config(self) -> RunConfig {
        let mut config = RunConfig::new(self.data_path, self.recipe_path).with_keep_cache(self.keep_cache);
        if let Some(selected) = self.selected_workloads {
            config = config.with_selected_workloads(selected.split_whitespace().map(str::to_string).collect());
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Lets PERFCAPTURE_DATA_PATH / PERFCAPTURE_RECIPE_PATH live in a .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if args.verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("perfcapture={0},perfcapture_core={0}", log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("perfcapture v{} starting", env!("CARGO_PKG_VERSION"));

    let runner = Runner::new(args.into_run_config());
    let report = runner.run().await?;

    println!(
        "Found {} recipe(s); created {} dataset(s), reused {}.",
        report.recipes.len(),
        report.datasets_created.len(),
        report.datasets_reused.len()
    );
    for workload in &report.workloads {
        println!("\n{}", workload);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_map_to_run_config() {
        let args = Args::parse_from([
            "perfcapture",
            "--data-path",
            "/tmp/data",
            "--recipe-path",
            "recipes",
            "--selected-workloads",
            "ReadNumpyFile  ReadFiles",
            "--keep-cache",
        ]);
        let config = args.into_run_config();
        assert_eq!(config.data_path, PathBuf::from("/tmp/data"));
        assert_eq!(config.recipe_path, PathBuf::from("recipes"));
        assert_eq!(
            config.selected_workloads,
            Some(vec!["ReadNumpyFile".to_string(), "ReadFiles".to_string()])
        );
        assert!(config.keep_cache);
    }

    #[test]
    fn test_paths_are_required() {
        assert!(Args::try_parse_from(["perfcapture", "--data-path", "/tmp/data"]).is_err());
    }
}
