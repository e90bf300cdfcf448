// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{transactions_in_range, CategoryNames};
use crate::models::{NewTransaction, Transaction, TransactionType, Validate};
use crate::receipts::{ReceiptStore, KEY_PREFIX};
use crate::report::display_date;
use crate::state::{AppState, Store};
use crate::utils::{
    maybe_print_json, opt_date, opt_decimal, opt_string, parse_enum, period_from_args,
    pretty_table, today,
};

pub fn handle(store: &mut Store, receipts: &ReceiptStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, receipts, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("edit", sub)) => edit(store, receipts, sub)?,
        Some(("rm", sub)) => remove(store, receipts, sub)?,
        _ => {}
    }
    Ok(())
}

// Without --type the category decides; unknown categories count as expense.
fn kind_for(state: &AppState, sub: &clap::ArgMatches, category_id: &str) -> Result<TransactionType> {
    if let Some(t) = sub.get_one::<String>("type") {
        return parse_enum(t);
    }
    Ok(state
        .categories
        .iter()
        .find(|c| c.id == category_id)
        .map_or(TransactionType::Expense, |c| c.kind))
}

fn attach(receipts: &ReceiptStore, sub: &clap::ArgMatches) -> Result<Option<String>> {
    match sub.get_one::<String>("receipt") {
        Some(path) => Ok(Some(receipts.store_file(Path::new(path))?)),
        None => Ok(None),
    }
}

fn add(store: &mut Store, receipts: &ReceiptStore, sub: &clap::ArgMatches) -> Result<()> {
    let category_id = opt_string(sub, "category").unwrap_or_default();
    let kind = kind_for(store.state(), sub, &category_id)?;
    let draft = NewTransaction {
        amount: opt_decimal(sub, "amount")?.context("--amount is required")?,
        description: opt_string(sub, "description").unwrap_or_default(),
        date: opt_date(sub, "date")?.unwrap_or_else(today),
        kind,
        category_id,
        is_recurring: sub.get_flag("recurring"),
        recurring_frequency: sub.get_one::<String>("frequency").map(|f| parse_enum(f)).transpose()?,
        receipt_url: None,
        notes: opt_string(sub, "notes"),
    };
    // validate before storing a receipt that would otherwise be orphaned
    draft.validate()?;
    let draft = NewTransaction {
        receipt_url: attach(receipts, sub)?,
        ..draft
    };
    let t = store.add_transaction(draft)?;
    println!(
        "Recorded {} {} on {} '{}' ({})",
        t.kind, t.amount, t.date, t.description, t.id
    );
    Ok(())
}

fn find(store: &Store, id: &str) -> Result<Transaction> {
    store
        .state()
        .transactions
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .ok_or_else(|| anyhow!("Transaction '{}' not found", id))
}

fn edit(store: &mut Store, receipts: &ReceiptStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id is required")?;
    let mut t = find(store, id)?;
    if let Some(v) = opt_decimal(sub, "amount")? {
        t.amount = v;
    }
    if let Some(v) = opt_string(sub, "description") {
        t.description = v;
    }
    if let Some(v) = opt_string(sub, "category") {
        t.category_id = v;
    }
    if let Some(v) = sub.get_one::<String>("type") {
        t.kind = parse_enum(v)?;
    }
    if let Some(v) = opt_date(sub, "date")? {
        t.date = v;
    }
    if let Some(v) = opt_string(sub, "notes") {
        t.notes = Some(v).filter(|n| !n.is_empty());
    }
    if let Some(v) = sub.get_one::<String>("frequency") {
        t.recurring_frequency = Some(parse_enum(v)?);
    }
    if let Some(v) = sub.get_one::<bool>("recurring") {
        t.is_recurring = *v;
    }
    t.validate()?;
    let mut replaced = None;
    if let Some(key) = attach(receipts, sub)? {
        replaced = t.receipt_url.replace(key);
    }
    store.update_transaction(t)?;
    if let Some(old) = replaced.filter(|k| k.starts_with(KEY_PREFIX)) {
        receipts.delete(&old)?;
    }
    println!("Updated transaction {}", id);
    Ok(())
}

fn remove(store: &mut Store, receipts: &ReceiptStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id is required")?;
    let t = find(store, id)?;
    store.delete_transaction(id);
    if let Some(key) = t.receipt_url.filter(|k| k.starts_with(KEY_PREFIX)) {
        receipts.delete(&key)?;
    }
    println!("Deleted transaction {}", id);
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(store.state(), sub, today())?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    display_date(r.date),
                    r.kind.label().to_string(),
                    r.category.clone(),
                    r.description.clone(),
                    r.amount.clone(),
                    r.notes.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Category", "Description", "Amount", "Notes", "Id"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub description: String,
    pub amount: String,
    pub notes: String,
    pub receipt: Option<String>,
}

/// Newest first, filtered by the list options.
pub fn query_rows(state: &AppState, sub: &clap::ArgMatches, today: NaiveDate) -> Result<Vec<TransactionRow>> {
    let mut hits: Vec<&Transaction> = match period_from_args(sub, today)? {
        Some(period) => transactions_in_range(&state.transactions, &period.range(today)),
        None => {
            let mut all: Vec<&Transaction> = state.transactions.iter().collect();
            all.sort_by(|a, b| b.date.cmp(&a.date));
            all
        }
    };
    if let Some(cat) = sub.get_one::<String>("category") {
        hits.retain(|t| &t.category_id == cat);
    }
    if let Some(kind) = sub.get_one::<String>("type") {
        let kind: TransactionType = parse_enum(kind)?;
        hits.retain(|t| t.kind == kind);
    }
    if let Some(limit) = sub.get_one::<usize>("limit") {
        hits.truncate(*limit);
    }

    let names = CategoryNames::new(&state.categories);
    Ok(hits
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: t.date,
            kind: t.kind,
            category: names.resolve(&t.category_id).to_string(),
            description: t.description.clone(),
            amount: t.amount.to_string(),
            notes: t.notes.clone().unwrap_or_default(),
            receipt: t.receipt_url.clone(),
        })
        .collect())
}
