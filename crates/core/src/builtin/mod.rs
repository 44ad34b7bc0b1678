// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/builtin/mod.rs
//
// Dataset and workload kinds that ship with perfcapture.
//
pub mod files;
pub mod npy;

pub use files::{RandomFilesDataset, ReadFiles};
pub use npy::{NpyDataset, ReadNpy};

use anyhow::{Context, Result};
use rand::RngCore;
use serde::de::DeserializeOwned;

/// Decode the free-form part of a recipe entry into a kind's parameter struct.
pub(crate) fn parse_params<T: DeserializeOwned>(kind: &str, params: &serde_yaml::Value) -> Result<T> {
    serde_yaml::from_value(params.clone())
        .with_context(|| format!("Invalid parameters for kind '{}'", kind))
}

/// `len` random bytes.
pub(crate) fn random_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::rng().fill_bytes(&mut data);
    data
}
