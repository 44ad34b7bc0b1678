// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/mod.rs
pub mod recipe_config;
pub mod run_config;

pub use recipe_config::{DatasetSpec, RecipeConfig, WorkloadSpec};
pub use run_config::RunConfig;
