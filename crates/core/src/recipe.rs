// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// src/recipe.rs
//
// Recipe discovery: turn the files at a recipe path into datasets and
// workloads ready to run.
//
use anyhow::{anyhow, bail, Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{DatasetSpec, RecipeConfig};
use crate::dataset::Dataset;
use crate::registry::Registry;
use crate::workload::RecipeWorkload;

const RECIPE_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// The datasets and workloads defined by one recipe file.
#[derive(Debug, Clone)]
pub struct Recipe {
    name: String,
    source: PathBuf,
    datasets: Vec<Dataset>,
    workloads: Vec<RecipeWorkload>,
}

impl Recipe {
    /// Load a single recipe file.
    pub fn load(path: &Path, registry: &Registry) -> Result<Self> {
        let config = RecipeConfig::from_yaml_file(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_config(name, path.to_path_buf(), &config, registry)
            .with_context(|| format!("Invalid recipe {:?}", path))
    }

    /// Bind every entry of `config` to its registered kind and resolve the
    /// dataset names each workload refers to.
    pub fn from_config(
        name: impl Into<String>,
        source: PathBuf,
        config: &RecipeConfig,
        registry: &Registry,
    ) -> Result<Self> {
        let mut datasets: Vec<Dataset> = Vec::with_capacity(config.datasets.len());
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for spec in &config.datasets {
            check_name("dataset", &spec.name)?;
            if by_name.insert(spec.name.as_str(), datasets.len()).is_some() {
                bail!("Dataset {} is defined more than once", spec.name);
            }
            datasets.push(registry.build_dataset(spec)?);
        }

        let mut workloads = Vec::with_capacity(config.workloads.len());
        let mut workload_names = HashSet::new();
        for spec in &config.workloads {
            check_name("workload", &spec.name)?;
            if !workload_names.insert(spec.name.as_str()) {
                bail!("Workload {} is defined more than once", spec.name);
            }
            if spec.repeats() == 0 {
                bail!("Workload {} has n_repeats = 0; it must run at least once", spec.name);
            }

            let mut bound = Vec::with_capacity(spec.datasets.len());
            for dataset_name in &spec.datasets {
                let index = by_name.get(dataset_name.as_str()).ok_or_else(|| {
                    anyhow!(
                        "Workload {} uses dataset {} which is not defined in this recipe",
                        spec.name,
                        dataset_name
                    )
                })?;
                bound.push(datasets[*index].clone());
            }

            let workload = registry.build_workload(spec)?;
            workloads.push(RecipeWorkload::new(spec.clone(), bound, workload));
        }

        Ok(Self { name: name.into(), source, datasets, workloads })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn workloads(&self) -> &[RecipeWorkload] {
        &self.workloads
    }
}

/// Dataset names become directory entries under the data path, so they must
/// be a single plain path component.
fn check_name(what: &str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    );
    if name.trim().is_empty() || !plain {
        bail!("Invalid {} name {:?}: must be a single, non-empty path component", what, name);
    }
    Ok(())
}

/// The recipe files at `recipe_path`: the file itself, or every `*.yaml` /
/// `*.yml` file directly inside the directory, sorted by name.
pub fn recipe_files(recipe_path: &Path) -> Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(recipe_path)
        .with_context(|| format!("Recipe path {:?} does not exist or cannot be accessed", recipe_path))?;
    if !meta.is_dir() {
        return Ok(vec![recipe_path.to_path_buf()]);
    }

    let mut files = Vec::new();
    let entries = std::fs::read_dir(recipe_path)
        .with_context(|| format!("Failed to read recipe directory {:?}", recipe_path))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read recipe directory {:?}", recipe_path))?
            .path();
        let is_recipe = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| RECIPE_EXTENSIONS.contains(&ext));
        if is_recipe && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every recipe at `recipe_path` and check that names are unique across
/// all of them.
pub fn discover_recipes(recipe_path: &Path, registry: &Registry) -> Result<Vec<Recipe>> {
    let files = recipe_files(recipe_path)?;
    debug!("Recipe files in {:?}: {:?}", recipe_path, files);

    let mut recipes = Vec::with_capacity(files.len());
    for file in &files {
        let recipe = Recipe::load(file, registry)?;
        info!(
            "Loaded recipe {} ({} dataset(s), {} workload(s))",
            recipe.name(),
            recipe.datasets().len(),
            recipe.workloads().len()
        );
        recipes.push(recipe);
    }

    check_unique_across(&recipes)?;
    Ok(recipes)
}

fn check_unique_across(recipes: &[Recipe]) -> Result<()> {
    let mut datasets: HashMap<&str, (&DatasetSpec, &Path)> = HashMap::new();
    let mut workloads: HashMap<&str, &Path> = HashMap::new();

    for recipe in recipes {
        for dataset in recipe.datasets() {
            match datasets.get(dataset.name()) {
                Some((spec, first)) if *spec != dataset.spec() => bail!(
                    "Dataset {} is defined differently in {:?} and {:?}",
                    dataset.name(),
                    first,
                    recipe.source()
                ),
                Some(_) => {}
                None => {
                    datasets.insert(dataset.name(), (dataset.spec(), recipe.source()));
                }
            }
        }
        for workload in recipe.workloads() {
            if let Some(first) = workloads.insert(workload.name(), recipe.source()) {
                bail!(
                    "Workload {} is defined in both {:?} and {:?}",
                    workload.name(),
                    first,
                    recipe.source()
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const NUMPY_RECIPE: &str = r#"
datasets:
  - name: NumpyDataset
    kind: npy
    shape: [2, 2]
workloads:
  - name: ReadNumpyFile
    kind: read_npy
    datasets: [NumpyDataset]
    n_repeats: 2
"#;

    fn recipe(yaml: &str) -> Result<Recipe> {
        let config = RecipeConfig::from_yaml(yaml)?;
        Recipe::from_config("test", PathBuf::from("test.yaml"), &config, &Registry::with_builtins())
    }

    #[test]
    fn test_workload_binds_datasets() {
        let recipe = recipe(NUMPY_RECIPE).unwrap();
        assert_eq!(recipe.datasets().len(), 1);
        let workload = &recipe.workloads()[0];
        assert_eq!(workload.name(), "ReadNumpyFile");
        assert_eq!(workload.n_repeats(), 2);
        assert_eq!(workload.datasets()[0].name(), "NumpyDataset");
    }

    #[test]
    fn test_undefined_dataset_reference() {
        let err = recipe(
            r#"
workloads:
  - name: W
    kind: read_files
    datasets: [Missing]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_duplicate_names_in_one_file() {
        let yaml = r#"
datasets:
  - { name: D, kind: random_files }
  - { name: D, kind: random_files }
"#;
        assert!(recipe(yaml).unwrap_err().to_string().contains("more than once"));
    }

    #[test]
    fn test_zero_repeats_rejected() {
        let yaml = r#"
workloads:
  - { name: W, kind: read_files, n_repeats: 0 }
"#;
        assert!(recipe(yaml).is_err());
    }

    #[test]
    fn test_names_must_be_plain() {
        for bad in ["../escape", "a/b", "", "."] {
            let yaml = format!("datasets:\n  - {{ name: \"{}\", kind: random_files }}\n", bad);
            assert!(recipe(&yaml).is_err(), "name {:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_recipe_files_in_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.yml"), "").unwrap();
        std::fs::write(temp_dir.path().join("a.yaml"), "").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir_all(temp_dir.path().join("nested")).unwrap();
        std::fs::write(temp_dir.path().join("nested").join("c.yaml"), "").unwrap();

        let files = recipe_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yml"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_recipe_directory_with_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join(OsStr::from_bytes(b"recipes-\xff"));
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("one.yaml"), NUMPY_RECIPE).unwrap();

        let recipes = discover_recipes(&dir, &Registry::with_builtins()).unwrap();
        assert_eq!(recipes.len(), 1);
    }

    #[test]
    fn test_single_recipe_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("one.yaml");
        std::fs::write(&file, NUMPY_RECIPE).unwrap();

        let recipes = discover_recipes(&file, &Registry::with_builtins()).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name(), "one");
    }

    #[test]
    fn test_empty_directory_has_no_recipes() {
        let temp_dir = TempDir::new().unwrap();
        let recipes = discover_recipes(temp_dir.path(), &Registry::with_builtins()).unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_missing_recipe_path() {
        let temp_dir = TempDir::new().unwrap();
        let err = recipe_files(&temp_dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_shared_dataset_across_recipes() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.yaml"), NUMPY_RECIPE).unwrap();
        std::fs::write(
            temp_dir.path().join("b.yaml"),
            r#"
datasets:
  - name: NumpyDataset
    kind: npy
    shape: [2, 2]
workloads:
  - { name: ReadAgain, kind: read_files, datasets: [NumpyDataset] }
"#,
        )
        .unwrap();
        assert!(discover_recipes(temp_dir.path(), &Registry::with_builtins()).is_ok());

        std::fs::write(
            temp_dir.path().join("c.yaml"),
            "datasets:\n  - { name: NumpyDataset, kind: npy, shape: [3, 3] }\n",
        )
        .unwrap();
        let err = discover_recipes(temp_dir.path(), &Registry::with_builtins()).unwrap_err();
        assert!(err.to_string().contains("defined differently"));
    }

    #[test]
    fn test_duplicate_workload_across_recipes() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.yaml"), NUMPY_RECIPE).unwrap();
        std::fs::write(temp_dir.path().join("b.yaml"), NUMPY_RECIPE).unwrap();
        let err = discover_recipes(temp_dir.path(), &Registry::with_builtins()).unwrap_err();
        assert!(err.to_string().contains("ReadNumpyFile"));
    }
}
