// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::receipts::{ReceiptStore, KEY_PREFIX};
use crate::state::Store;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(store: &Store, receipts: &ReceiptStore) -> Result<()> {
    let mut rows: Vec<Vec<String>> = store
        .orphaned_references()
        .into_iter()
        .map(|o| {
            vec![
                format!("{}_missing_category", o.kind),
                format!("{} '{}' -> {}", o.id, o.name, o.category_id),
            ]
        })
        .collect();

    for t in &store.state().transactions {
        let Some(key) = t.receipt_url.as_deref().filter(|k| k.starts_with(KEY_PREFIX)) else {
            continue;
        };
        if receipts.retrieve(key)?.is_none() {
            rows.push(vec!["missing_receipt".into(), format!("{} -> {}", t.id, key)]);
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
