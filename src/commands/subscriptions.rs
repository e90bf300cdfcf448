// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{
    days_until_renewal, is_renewal_soon, next_renewal_date, upcoming_renewals, CategoryNames,
};
use crate::models::{BillingCycle, NewSubscription, Subscription};
use crate::report::display_date;
use crate::state::{AppState, Store};
use crate::utils::{maybe_print_json, opt_date, opt_decimal, opt_string, parse_enum, pretty_table, today};

const DEFAULT_CATEGORY: &str = "expense-subscriptions";

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => remove(store, sub)?,
        Some(("renewals", sub)) => renewals(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let billing_cycle: BillingCycle = match sub.get_one::<String>("cycle") {
        Some(c) => parse_enum(c)?,
        None => BillingCycle::Monthly,
    };
    let start_date = opt_date(sub, "start")?.unwrap_or_else(today);
    let renewal_date = match opt_date(sub, "renewal")? {
        Some(d) => d,
        None => next_renewal_date(start_date, billing_cycle, today()),
    };
    let draft = NewSubscription {
        name: opt_string(sub, "name").unwrap_or_default(),
        amount: opt_decimal(sub, "amount")?.context("--amount is required")?,
        start_date,
        renewal_date,
        billing_cycle,
        category_id: opt_string(sub, "category").unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        description: opt_string(sub, "description"),
        logo_url: None,
        color: opt_string(sub, "color"),
        is_active: !sub.get_flag("inactive"),
    };
    let s = store.add_subscription(draft)?;
    println!(
        "Added subscription '{}' {} {} renewing {} ({})",
        s.name,
        s.amount,
        s.billing_cycle.as_str(),
        s.renewal_date,
        s.id
    );
    Ok(())
}

fn find(store: &Store, id: &str) -> Result<Subscription> {
    store
        .state()
        .subscriptions
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .ok_or_else(|| anyhow!("Subscription '{}' not found", id))
}

fn edit(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id is required")?;
    let mut s = find(store, id)?;
    if let Some(v) = opt_string(sub, "name") {
        s.name = v;
    }
    if let Some(v) = opt_decimal(sub, "amount")? {
        s.amount = v;
    }
    let cycle = sub.get_one::<String>("cycle");
    if let Some(v) = cycle {
        s.billing_cycle = parse_enum(v)?;
    }
    let start = opt_date(sub, "start")?;
    if let Some(v) = start {
        s.start_date = v;
    }
    match opt_date(sub, "renewal")? {
        Some(v) => s.renewal_date = v,
        None if cycle.is_some() || start.is_some() => {
            s.renewal_date = next_renewal_date(s.start_date, s.billing_cycle, today());
        }
        None => {}
    }
    if let Some(v) = opt_string(sub, "category") {
        s.category_id = v;
    }
    if let Some(v) = opt_string(sub, "description") {
        s.description = Some(v).filter(|d| !d.is_empty());
    }
    if let Some(v) = opt_string(sub, "color") {
        s.color = Some(v).filter(|c| !c.is_empty());
    }
    if let Some(v) = sub.get_one::<bool>("active") {
        s.is_active = *v;
    }
    store.update_subscription(s)?;
    println!("Updated subscription {}", id);
    Ok(())
}

fn remove(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id is required")?;
    find(store, id)?;
    store.delete_subscription(id);
    println!("Deleted subscription {}", id);
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRow {
    pub id: String,
    pub name: String,
    pub amount: String,
    pub billing_cycle: BillingCycle,
    pub renewal_date: NaiveDate,
    pub days_until_renewal: i64,
    pub renewal_soon: bool,
    pub category: String,
    pub is_active: bool,
}

fn row(s: &Subscription, names: &CategoryNames<'_>, today: NaiveDate) -> SubscriptionRow {
    SubscriptionRow {
        id: s.id.clone(),
        name: s.name.clone(),
        amount: s.amount.to_string(),
        billing_cycle: s.billing_cycle,
        renewal_date: s.renewal_date,
        days_until_renewal: days_until_renewal(s, today),
        renewal_soon: is_renewal_soon(s, today),
        category: names.resolve(&s.category_id).to_string(),
        is_active: s.is_active,
    }
}

/// All subscriptions, next renewal first.
pub fn query_rows(state: &AppState, today: NaiveDate) -> Vec<SubscriptionRow> {
    let names = CategoryNames::new(&state.categories);
    let mut rows: Vec<SubscriptionRow> = state.subscriptions.iter().map(|s| row(s, &names, today)).collect();
    rows.sort_by_key(|r| r.renewal_date);
    rows
}

fn print_rows(data: &[SubscriptionRow]) {
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|r| {
            let due = if r.renewal_soon {
                format!("{} (in {}d)", display_date(r.renewal_date), r.days_until_renewal)
            } else {
                display_date(r.renewal_date)
            };
            vec![
                r.name.clone(),
                r.amount.clone(),
                r.billing_cycle.as_str().to_string(),
                due,
                r.category.clone(),
                if r.is_active { "yes".into() } else { "no".into() },
                r.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Name", "Amount", "Cycle", "Renews", "Category", "Active", "Id"],
            rows
        )
    );
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store.state(), today());
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        print_rows(&data);
    }
    Ok(())
}

fn renewals(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let today = today();
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(3);
    let state = store.state();
    let names = CategoryNames::new(&state.categories);
    let data: Vec<SubscriptionRow> = upcoming_renewals(&state.subscriptions, today, limit)
        .into_iter()
        .map(|s| row(s, &names, today))
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No renewals in the next 7 days");
    } else {
        print_rows(&data);
    }
    Ok(())
}
