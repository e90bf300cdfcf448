// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::backup::{export_json, EXPORT_FILE_NAME};
use crate::state::Store;
use crate::utils::output_path;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    let path = export(store, m)?;
    println!("Exported data to {}", path.display());
    Ok(())
}

pub fn export(store: &Store, m: &clap::ArgMatches) -> Result<PathBuf> {
    let path = output_path(m.get_one::<String>("out"), EXPORT_FILE_NAME);
    let body = export_json(store.state()).context("serialize export")?;
    std::fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
