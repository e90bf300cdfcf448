// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use crate::backup::parse_import;
use crate::db::Collection;
use crate::state::Store;

/// Reads an export file and replaces the collections it contains.
pub fn import(store: &mut Store, m: &clap::ArgMatches) -> Result<Vec<Collection>> {
    let path = m.get_one::<String>("file").context("file is required")?;
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    let bundle = parse_import(&text)?;
    Ok(store.apply_import(bundle))
}

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    let replaced = import(store, m)?;
    if replaced.is_empty() {
        println!("Nothing to import");
    } else {
        let names: Vec<&str> = replaced.iter().map(|c| c.table()).collect();
        println!("Data imported successfully: {}", names.join(", "));
    }
    Ok(())
}
