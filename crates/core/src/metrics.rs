// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use std::time::{Duration, Instant};

const BYTES_PER_GB: f64 = 1e9;

/// What a single run of a workload reports back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunMetrics {
    /// Bytes the workload produced or consumed during the run.
    pub nbytes: u64,
    /// Filled in by `RunTimer::stop_run`.
    pub total_secs: Option<f64>,
    /// 1-based, filled in by `RunTimer::stop_run`.
    pub run_id: Option<u32>,
}

impl RunMetrics {
    pub fn new(nbytes: u64) -> Self {
        Self { nbytes, ..Self::default() }
    }
}

/// Times repeated runs of one workload against one dataset.
#[derive(Debug, Default)]
pub struct RunTimer {
    started: Option<Instant>,
    run_id: u32,
    seconds_per_run: Vec<f64>,
    gigabytes_per_sec_per_run: Vec<f64>,
}

impl RunTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_run(&mut self) {
        self.run_id += 1;
        self.started = Some(Instant::now());
    }

    /// Stamp `metrics` with the elapsed time and run id, and record the run.
    pub fn stop_run(&mut self, metrics: &mut RunMetrics) {
        let elapsed = self.started.take().map(|t| t.elapsed()).unwrap_or(Duration::ZERO);
        self.record(elapsed, metrics);
    }

    fn record(&mut self, elapsed: Duration, metrics: &mut RunMetrics) {
        let secs = elapsed.as_secs_f64();
        metrics.total_secs = Some(secs);
        metrics.run_id = Some(self.run_id);

        self.seconds_per_run.push(secs);
        self.gigabytes_per_sec_per_run.push(gigabytes_per_sec(metrics.nbytes, secs));
    }

    pub fn runs(&self) -> usize {
        self.seconds_per_run.len()
    }

    pub fn summary(&self) -> RunSummary {
        let (runtime_mean_secs, runtime_std_secs) = mean_and_std(&self.seconds_per_run);
        let (bandwidth_mean_gbps, bandwidth_std_gbps) = mean_and_std(&self.gigabytes_per_sec_per_run);
        RunSummary {
            runs: self.runs(),
            runtime_mean_secs,
            runtime_std_secs,
            bandwidth_mean_gbps,
            bandwidth_std_gbps,
        }
    }
}

/// Mean and population standard deviation over all runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub runs: usize,
    pub runtime_mean_secs: f64,
    pub runtime_std_secs: f64,
    pub bandwidth_mean_gbps: f64,
    pub bandwidth_std_gbps: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  Runtime: mean = {:.3} seconds; std = {:.3}",
            self.runtime_mean_secs, self.runtime_std_secs
        )?;
        write!(
            f,
            "  Bandwidth: mean = {:.3} GB/s; std = {:.3}",
            self.bandwidth_mean_gbps, self.bandwidth_std_gbps
        )
    }
}

fn gigabytes_per_sec(nbytes: u64, secs: f64) -> f64 {
    if secs > 0.0 {
        nbytes as f64 / BYTES_PER_GB / secs
    } else {
        0.0
    }
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
