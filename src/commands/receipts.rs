// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Context, Result};

use crate::receipts::{decode_data_url, ReceiptStore};
use crate::state::Store;

pub fn handle(store: &mut Store, receipts: &ReceiptStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let key = sub.get_one::<String>("key").context("key is required")?;
            let data_url = receipts
                .retrieve(key)?
                .ok_or_else(|| anyhow!("Receipt '{}' not found", key))?;
            match sub.get_one::<String>("out") {
                Some(out) => {
                    let bytes = decode_data_url(&data_url)
                        .ok_or_else(|| anyhow!("Receipt '{}' is not a base64 data URL", key))?;
                    std::fs::write(out, &bytes).with_context(|| format!("write {}", out))?;
                    println!("Wrote {} bytes to {}", bytes.len(), out);
                }
                None => println!("{}", data_url),
            }
        }
        Some(("rm", sub)) => {
            let key = sub.get_one::<String>("key").context("key is required")?;
            receipts.delete(key)?;
            // detach from any transaction still pointing at it
            let linked: Vec<_> = store
                .state()
                .transactions
                .iter()
                .filter(|t| t.receipt_url.as_deref() == Some(key.as_str()))
                .cloned()
                .collect();
            for mut t in linked {
                t.receipt_url = None;
                store.update_transaction(t)?;
            }
            println!("Removed receipt {}", key);
        }
        _ => {}
    }
    Ok(())
}
