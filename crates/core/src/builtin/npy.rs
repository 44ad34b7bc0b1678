// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/builtin/npy.rs

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{ArrayD, IxDyn};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use super::{parse_params, random_bytes};
use crate::dataset::DatasetGenerator;
use crate::metrics::RunMetrics;
use crate::workload::Workload;

pub const NPY_DATASET_KIND: &str = "npy";
pub const READ_NPY_KIND: &str = "read_npy";

fn default_shape() -> Vec<usize> {
    vec![100, 100, 100, 100]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct NpyDatasetParams {
    #[serde(default = "default_shape")]
    shape: Vec<usize>,
}

/// A single `.npy` file holding a `u8` array of random values.
#[derive(Debug, Clone)]
pub struct NpyDataset {
    shape: Vec<usize>,
}

impl NpyDataset {
    pub fn new(shape: Vec<usize>) -> Self {
        Self { shape }
    }

    pub fn from_params(params: &serde_yaml::Value) -> Result<Arc<dyn DatasetGenerator>> {
        let params: NpyDatasetParams = parse_params(NPY_DATASET_KIND, params)?;
        let dataset = Self::new(params.shape);
        dataset.total_elements()?;
        Ok(Arc::new(dataset))
    }

    /// Number of elements (and bytes) in the array; fails if the shape overflows `usize`.
    pub fn total_elements(&self) -> Result<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| anyhow!("{} shape {:?} is too large", NPY_DATASET_KIND, self.shape))
    }

    fn random_array(&self) -> Result<ArrayD<u8>> {
        let total_elements = self.total_elements()?;
        ArrayD::from_shape_vec(IxDyn(&self.shape), random_bytes(total_elements))
            .with_context(|| format!("Failed to build array of shape {:?}", self.shape))
    }
}

#[async_trait]
impl DatasetGenerator for NpyDataset {
    async fn generate(&self, path: &Path) -> Result<()> {
        let this = self.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let array = this.random_array()?;
            ndarray_npy::write_npy(&path, &array)
                .with_context(|| format!("Failed to write NPY file {:?}", path))?;
            Ok(())
        })
        .await
        .context("NPY generation task failed")?
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadNpyParams {}

/// Load a `u8` `.npy` file into memory.
#[derive(Debug, Clone, Default)]
pub struct ReadNpy;

impl ReadNpy {
    pub fn from_params(params: &serde_yaml::Value) -> Result<Arc<dyn Workload>> {
        let _: ReadNpyParams = parse_params(READ_NPY_KIND, params)?;
        Ok(Arc::new(Self))
    }
}

#[async_trait]
impl Workload for ReadNpy {
    async fn run(&self, dataset_path: &Path) -> Result<RunMetrics> {
        let path = dataset_path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<RunMetrics> {
            let array: ArrayD<u8> = ndarray_npy::read_npy(&path)
                .with_context(|| format!("Failed to read NPY file {:?}", path))?;
            Ok(RunMetrics::new(array.len() as u64))
        })
        .await
        .context("NPY read task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_generate_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("NumpyDataset");

        NpyDataset::new(vec![4, 5, 6]).generate(&path).await.unwrap();
        assert!(path.is_file());

        let metrics = ReadNpy.run(&path).await.unwrap();
        assert_eq!(metrics.nbytes, 4 * 5 * 6);
        assert_eq!(metrics.total_secs, None);
    }

    #[test]
    fn test_params() {
        let params: serde_yaml::Value = serde_yaml::from_str("shape: [2, 3]").unwrap();
        let parsed: NpyDatasetParams = parse_params(NPY_DATASET_KIND, &params).unwrap();
        assert_eq!(parsed.shape, vec![2, 3]);

        let empty = serde_yaml::Value::Mapping(Default::default());
        let parsed: NpyDatasetParams = parse_params(NPY_DATASET_KIND, &empty).unwrap();
        assert_eq!(parsed.shape, default_shape());

        let typo: serde_yaml::Value = serde_yaml::from_str("shap: [2, 3]").unwrap();
        assert!(NpyDataset::from_params(&typo).is_err());
    }

    #[test]
    fn test_oversized_shape_rejected() {
        let params: serde_yaml::Value = serde_yaml::from_str("shape: [18446744073709551615, 2]").unwrap();
        let err = NpyDataset::from_params(&params).err().unwrap();
        assert!(err.to_string().contains("too large"));

        assert_eq!(NpyDataset::new(vec![3, 4, 5]).total_elements().unwrap(), 60);
        assert_eq!(NpyDataset::new(vec![]).total_elements().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_oversized_shape_fails_without_panicking() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("huge");
        let err = NpyDataset::new(vec![usize::MAX, 2]).generate(&path).await.unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(!path.exists());
    }

    #[test]
    fn test_read_npy_takes_no_params() {
        let params: serde_yaml::Value = serde_yaml::from_str("block_size_bytes: 4").unwrap();
        assert!(ReadNpy::from_params(&params).is_err());
        assert!(ReadNpy::from_params(&serde_yaml::Value::Mapping(Default::default())).is_ok());
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = ReadNpy.run(&temp_dir.path().join("missing")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read NPY file"));
    }
}
