// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};

use pennywise::config::Config;
use pennywise::receipts::ReceiptStore;
use pennywise::state::Store;
use pennywise::storage::Storage;
use pennywise::{cli, commands, db, logging};

fn main() -> Result<()> {
    logging::init();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = Config::from_env()?;
    let conn = db::open_or_init(&cfg.db_path)
        .with_context(|| format!("open database {}", cfg.db_path.display()))?;
    let mut store = Store::open(Storage::new(conn), cfg.write_retries);
    let receipts = ReceiptStore::open(&cfg.receipts_path, cfg.receipt_limit, cfg.receipt_quota)
        .with_context(|| format!("open receipt store {}", cfg.receipts_path.display()))?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!(
                "Database initialized at {} ({} categories)",
                cfg.db_path.display(),
                store.state().categories.len()
            );
        }
        Some(("tx", sub)) => commands::transactions::handle(&mut store, &receipts, sub)?,
        Some(("sub", sub)) => commands::subscriptions::handle(&mut store, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut store, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut store, sub)?,
        Some(("report", sub)) => commands::reports::handle(&store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut store, sub)?,
        Some(("receipt", sub)) => commands::receipts::handle(&mut store, &receipts, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&store, &receipts)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }

    store.flush();
    if store.write_failures() > 0 {
        bail!(
            "changes could not be saved: {}",
            store.last_write_error().unwrap_or_default()
        );
    }
    Ok(())
}
