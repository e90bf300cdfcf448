// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Pennywise", "pennywise"));

pub const ENV_DB: &str = "PENNYWISE_DB";
pub const ENV_RECEIPTS_DB: &str = "PENNYWISE_RECEIPTS_DB";
pub const ENV_RECEIPT_LIMIT: &str = "PENNYWISE_RECEIPT_LIMIT";
pub const ENV_WRITE_RETRIES: &str = "PENNYWISE_WRITE_RETRIES";
pub const ENV_LOG: &str = "PENNYWISE_LOG";

/// Largest receipt accepted, measured in data-URL characters (~5MB).
pub const DEFAULT_RECEIPT_LIMIT: usize = 5_000_000;
/// Total characters the receipt store may hold before reporting full.
pub const DEFAULT_RECEIPT_QUOTA: usize = 50_000_000;
pub const DEFAULT_WRITE_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub receipts_path: PathBuf,
    pub receipt_limit: usize,
    pub receipt_quota: usize,
    pub write_retries: u32,
}

impl Config {
    /// Reads overrides from the environment and falls back to the platform
    /// data directory for storage paths.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup(ENV_DB) {
            Some(p) => PathBuf::from(p),
            None => data_dir()?.join("pennywise.sqlite"),
        };
        let receipts_path = match lookup(ENV_RECEIPTS_DB) {
            Some(p) => PathBuf::from(p),
            None => db_path.with_file_name("receipts.sqlite"),
        };
        let receipt_limit = match lookup(ENV_RECEIPT_LIMIT) {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} '{}'", ENV_RECEIPT_LIMIT, v))?,
            None => DEFAULT_RECEIPT_LIMIT,
        };
        let write_retries = match lookup(ENV_WRITE_RETRIES) {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} '{}'", ENV_WRITE_RETRIES, v))?,
            None => DEFAULT_WRITE_RETRIES,
        };
        Ok(Self {
            db_path,
            receipts_path,
            receipt_limit,
            receipt_quota: DEFAULT_RECEIPT_QUOTA.max(receipt_limit),
            write_retries,
        })
    }
}

fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().to_path_buf())
}
