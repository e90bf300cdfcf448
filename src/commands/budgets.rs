// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{budget_progress, BudgetProgress, CategoryNames};
use crate::models::{Budget, BudgetPeriod, NewBudget};
use crate::state::{AppState, Store};
use crate::utils::{maybe_print_json, opt_date, opt_decimal, opt_string, parse_enum, pretty_table, today};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").context("id is required")?;
            if !store.state().budgets.iter().any(|b| &b.id == id) {
                return Err(anyhow!("Budget '{}' not found", id));
            }
            store.delete_budget(id);
            println!("Deleted budget {}", id);
        }
        Some(("progress", sub)) => progress(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let period: BudgetPeriod = match sub.get_one::<String>("period") {
        Some(p) => parse_enum(p)?,
        None => BudgetPeriod::Monthly,
    };
    let draft = NewBudget {
        name: opt_string(sub, "name").unwrap_or_default(),
        amount: opt_decimal(sub, "amount")?.context("--amount is required")?,
        allocated_amount: None,
        spent_amount: None,
        period,
        category_id: opt_string(sub, "category").filter(|c| !c.is_empty()),
        start_date: opt_date(sub, "start")?.unwrap_or_else(today),
        end_date: opt_date(sub, "end")?,
        color: opt_string(sub, "color"),
    };
    let b = store.add_budget(draft)?;
    println!("Added {} budget '{}' of {} ({})", b.period.as_str(), b.name, b.amount, b.id);
    Ok(())
}

fn edit(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id is required")?;
    let mut b = store
        .state()
        .budgets
        .iter()
        .find(|b| &b.id == id)
        .cloned()
        .ok_or_else(|| anyhow!("Budget '{}' not found", id))?;
    if let Some(v) = opt_string(sub, "name") {
        b.name = v;
    }
    if let Some(v) = opt_decimal(sub, "amount")? {
        b.amount = v;
    }
    if let Some(v) = sub.get_one::<String>("period") {
        b.period = parse_enum(v)?;
    }
    if let Some(v) = opt_string(sub, "category") {
        b.category_id = Some(v).filter(|c| !c.is_empty());
    }
    if let Some(v) = opt_date(sub, "start")? {
        b.start_date = v;
    }
    if let Some(v) = opt_date(sub, "end")? {
        b.end_date = Some(v);
    }
    if let Some(v) = opt_string(sub, "color") {
        b.color = Some(v).filter(|c| !c.is_empty());
    }
    store.update_budget(b)?;
    println!("Updated budget {}", id);
    Ok(())
}

fn scope(b: &Budget, names: &CategoryNames<'_>) -> String {
    match b.category_id.as_deref() {
        Some(c) if !c.is_empty() => names.resolve(c).to_string(),
        _ => "All expenses".to_string(),
    }
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let state = store.state();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &state.budgets)? {
        return Ok(());
    }
    let names = CategoryNames::new(&state.categories);
    let rows = state
        .budgets
        .iter()
        .map(|b| {
            vec![
                b.name.clone(),
                b.period.as_str().to_string(),
                scope(b, &names),
                b.amount.to_string(),
                b.start_date.to_string(),
                b.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Budget", "Period", "Category", "Target", "Start", "Id"], rows)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub target: String,
    #[serde(flatten)]
    pub progress: BudgetProgress,
    pub over_budget: bool,
}

pub fn progress_rows(state: &AppState, today: NaiveDate) -> Vec<ProgressRow> {
    let names = CategoryNames::new(&state.categories);
    state
        .budgets
        .iter()
        .map(|b| {
            let progress = budget_progress(b, &state.transactions, today);
            ProgressRow {
                id: b.id.clone(),
                name: b.name.clone(),
                category: scope(b, &names),
                target: b.amount.to_string(),
                over_budget: progress.is_over_budget(),
                progress,
            }
        })
        .collect()
}

fn progress(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = progress_rows(store.state(), today());
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.name.clone(),
                    r.category.clone(),
                    r.target.clone(),
                    r.progress.spent.to_string(),
                    format!("{}%", r.progress.percentage),
                    r.progress.remaining.to_string(),
                    if r.over_budget { "OVER".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Budget", "Category", "Target", "Spent", "Used", "Remaining", ""],
                rows
            )
        );
    }
    Ok(())
}
