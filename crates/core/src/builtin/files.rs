// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/builtin/files.rs

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::debug;
use walkdir::WalkDir;

use super::{parse_params, random_bytes};
use crate::dataset::DatasetGenerator;
use crate::metrics::RunMetrics;
use crate::workload::Workload;

pub const RANDOM_FILES_KIND: &str = "random_files";
pub const READ_FILES_KIND: &str = "read_files";

const DEFAULT_FILE_SIZE_BYTES: u64 = 1024 * 1024;

fn default_num_files() -> usize {
    1
}

fn default_file_size_bytes() -> u64 {
    DEFAULT_FILE_SIZE_BYTES
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RandomFilesParams {
    #[serde(default = "default_num_files")]
    num_files: usize,
    #[serde(default = "default_file_size_bytes")]
    file_size_bytes: u64,
}

/// A directory of equally sized files filled with random bytes.
#[derive(Debug, Clone)]
pub struct RandomFilesDataset {
    num_files: usize,
    file_size_bytes: u64,
}

impl RandomFilesDataset {
    pub fn new(num_files: usize, file_size_bytes: u64) -> Result<Self> {
        // An empty directory would never count as an existing dataset.
        if num_files == 0 {
            bail!("{} needs num_files >= 1", RANDOM_FILES_KIND);
        }
        Ok(Self { num_files, file_size_bytes })
    }

    pub fn from_params(params: &serde_yaml::Value) -> Result<Arc<dyn DatasetGenerator>> {
        let params: RandomFilesParams = parse_params(RANDOM_FILES_KIND, params)?;
        Ok(Arc::new(Self::new(params.num_files, params.file_size_bytes)?))
    }

    fn file_name(index: usize) -> String {
        format!("file_{:06}.bin", index)
    }
}

#[async_trait]
impl DatasetGenerator for RandomFilesDataset {
    async fn generate(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create dataset directory {:?}", path))?;

        // One buffer, written to every file.
        let size = usize::try_from(self.file_size_bytes)
            .with_context(|| format!("file_size_bytes {} is too large", self.file_size_bytes))?;
        let data = tokio::task::spawn_blocking(move || random_bytes(size))
            .await
            .context("Random data task failed")?;

        for i in 0..self.num_files {
            let file_path = path.join(Self::file_name(i));
            tokio::fs::write(&file_path, &data)
                .await
                .with_context(|| format!("Failed to write {:?}", file_path))?;

            if i % 100 == 0 {
                debug!("Generated file {}/{}", i + 1, self.num_files);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadFilesParams {
    block_size_bytes: Option<usize>,
}

/// Read every file below the dataset path (or the dataset file itself).
/// With a block size, files are streamed through a fixed buffer; without one
/// each file is read whole.
#[derive(Debug, Clone, Default)]
pub struct ReadFiles {
    block_size_bytes: Option<usize>,
}

impl ReadFiles {
    pub fn new(block_size_bytes: Option<usize>) -> Result<Self> {
        if block_size_bytes == Some(0) {
            bail!("{} needs block_size_bytes >= 1", READ_FILES_KIND);
        }
        Ok(Self { block_size_bytes })
    }

    pub fn from_params(params: &serde_yaml::Value) -> Result<Arc<dyn Workload>> {
        let params: ReadFilesParams = parse_params(READ_FILES_KIND, params)?;
        Ok(Arc::new(Self::new(params.block_size_bytes)?))
    }

    async fn read_blocks(path: &Path, block_size: usize) -> Result<u64> {
        let mut file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open {:?}", path))?;
        let mut buffer = vec![0u8; block_size];
        let mut total = 0u64;
        loop {
            let n = file
                .read(&mut buffer)
                .await
                .with_context(|| format!("Failed to read {:?}", path))?;
            if n == 0 {
                return Ok(total);
            }
            total += n as u64;
        }
    }
}

/// Regular files at or below `root`, in a stable order.
fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", root))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[async_trait]
impl Workload for ReadFiles {
    async fn run(&self, dataset_path: &Path) -> Result<RunMetrics> {
        let root = dataset_path.to_path_buf();
        let files = tokio::task::spawn_blocking(move || list_files(&root))
            .await
            .context("File listing task failed")??;

        let mut nbytes = 0u64;
        for file in &files {
            nbytes += match self.block_size_bytes {
                Some(block_size) => Self::read_blocks(file, block_size).await?,
                None => {
                    tokio::fs::read(file)
                        .await
                        .with_context(|| format!("Failed to read {:?}", file))?
                        .len() as u64
                }
            };
        }
        Ok(RunMetrics::new(nbytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_generate_directory_of_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("RandomFiles");

        RandomFilesDataset::new(3, 100).unwrap().generate(&path).await.unwrap();

        let mut names: Vec<_> = std::fs::read_dir(&path)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["file_000000.bin", "file_000001.bin", "file_000002.bin"]);
        assert_eq!(std::fs::metadata(path.join("file_000001.bin")).unwrap().len(), 100);
    }

    #[tokio::test]
    async fn test_read_files_counts_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("RandomFiles");
        RandomFilesDataset::new(4, 1000).unwrap().generate(&path).await.unwrap();

        let whole = ReadFiles::new(None).unwrap().run(&path).await.unwrap();
        let blocked = ReadFiles::new(Some(64)).unwrap().run(&path).await.unwrap();
        assert_eq!(whole.nbytes, 4000);
        assert_eq!(blocked.nbytes, 4000);
    }

    #[tokio::test]
    async fn test_read_files_on_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("single");
        std::fs::write(&path, vec![7u8; 123]).unwrap();

        let metrics = ReadFiles::default().run(&path).await.unwrap();
        assert_eq!(metrics.nbytes, 123);
    }

    #[tokio::test]
    async fn test_read_files_recurses() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("tree");
        std::fs::create_dir_all(root.join("a").join("b")).unwrap();
        std::fs::write(root.join("top.bin"), vec![0u8; 10]).unwrap();
        std::fs::write(root.join("a").join("b").join("deep.bin"), vec![0u8; 5]).unwrap();

        let metrics = ReadFiles::default().run(&root).await.unwrap();
        assert_eq!(metrics.nbytes, 15);
    }

    #[test]
    fn test_invalid_params() {
        assert!(RandomFilesDataset::new(0, 10).is_err());
        assert!(ReadFiles::new(Some(0)).is_err());

        let params: serde_yaml::Value = serde_yaml::from_str("num_files: 0").unwrap();
        assert!(RandomFilesDataset::from_params(&params).is_err());

        let params: serde_yaml::Value = serde_yaml::from_str("num_files: 2\nfile_size_bytes: 8").unwrap();
        assert!(RandomFilesDataset::from_params(&params).is_ok());
    }
}
