// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{NewCategory, TransactionType};
use crate::state::Store;
use crate::utils::{maybe_print_json, opt_string, parse_enum, pretty_table};
use anyhow::{anyhow, Context, Result};

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let draft = NewCategory {
                name: opt_string(sub, "name").unwrap_or_default(),
                kind: parse_enum(sub.get_one::<String>("type").context("--type is required")?)?,
                icon: opt_string(sub, "icon"),
                color: opt_string(sub, "color").unwrap_or_default(),
            };
            let c = store.add_category(draft)?;
            println!("Added category '{}' ({})", c.name, c.id);
        }
        Some(("list", sub)) => {
            let kind: Option<TransactionType> =
                sub.get_one::<String>("type").map(|t| parse_enum(t)).transpose()?;
            let mut data: Vec<_> = store
                .state()
                .categories
                .iter()
                .filter(|c| kind.is_none_or(|k| c.kind == k))
                .cloned()
                .collect();
            data.sort_by(|a, b| a.kind.as_str().cmp(b.kind.as_str()).then_with(|| a.name.cmp(&b.name)));
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| vec![c.name.clone(), c.kind.label().to_string(), c.color.clone(), c.id.clone()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Type", "Color", "Id"], rows));
            }
        }
        Some(("edit", sub)) => {
            let id = sub.get_one::<String>("id").context("id is required")?;
            let mut c = store
                .state()
                .categories
                .iter()
                .find(|c| &c.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("Category '{}' not found", id))?;
            if let Some(v) = opt_string(sub, "name") {
                c.name = v;
            }
            if let Some(v) = sub.get_one::<String>("type") {
                c.kind = parse_enum(v)?;
            }
            if let Some(v) = opt_string(sub, "color") {
                c.color = v;
            }
            if let Some(v) = opt_string(sub, "icon") {
                c.icon = Some(v).filter(|i| !i.is_empty());
            }
            store.update_category(c)?;
            println!("Updated category '{}'", id);
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").context("id is required")?;
            if sub.get_flag("force") {
                let usage = store.category_usage(id);
                store.delete_category(id);
                if !usage.is_unused() {
                    println!(
                        "Removed category '{}'; {} transaction(s), {} subscription(s) and {} budget(s) now show as Uncategorized",
                        id, usage.transactions, usage.subscriptions, usage.budgets
                    );
                    return Ok(());
                }
            } else {
                store.delete_category_checked(id)?;
            }
            println!("Removed category '{}'", id);
        }
        _ => {}
    }
    Ok(())
}
