// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::PathBuf;

use crate::analytics::{
    balance, recent_transactions, spend_by_category, total_expenses, total_income,
    transactions_in_range, upcoming_renewals,
};
use crate::models::{DateRange, Subscription, Transaction};
use crate::report::{csv_file_name, display_date, transactions_csv, ReportPeriod};
use crate::state::{AppState, Store};
use crate::utils::{maybe_print_json, output_path, period_from_args, pretty_table, today};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(store, sub)?,
        Some(("csv", sub)) => {
            let path = write_csv(store.state(), sub, today())?;
            println!("Exported transactions to {}", path.display());
        }
        Some(("spend-by-category", sub)) => by_category(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn period_or_this_month(sub: &clap::ArgMatches, today: NaiveDate) -> Result<ReportPeriod> {
    Ok(period_from_args(sub, today)?.unwrap_or(ReportPeriod::ThisMonth))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub period: &'static str,
    #[serde(flatten)]
    pub range: DateRange,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub transactions: usize,
    pub recent: Vec<Transaction>,
    pub upcoming_renewals: Vec<Subscription>,
}

const RECENT_LIMIT: usize = 5;
const RENEWALS_LIMIT: usize = 3;

pub fn build_summary(state: &AppState, period: &ReportPeriod, today: NaiveDate) -> Summary {
    let range = period.range(today);
    Summary {
        period: period.token(),
        range,
        income: total_income(&state.transactions, Some(&range)),
        expenses: total_expenses(&state.transactions, &state.subscriptions, Some(&range)),
        balance: balance(&state.transactions, &state.subscriptions, Some(&range)),
        transactions: transactions_in_range(&state.transactions, &range).len(),
        recent: recent_transactions(&state.transactions, RECENT_LIMIT)
            .into_iter()
            .cloned()
            .collect(),
        upcoming_renewals: upcoming_renewals(&state.subscriptions, today, RENEWALS_LIMIT)
            .into_iter()
            .cloned()
            .collect(),
    }
}

fn summary(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let today = today();
    let period = period_or_this_month(sub, today)?;
    let s = build_summary(store.state(), &period, today);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let rows = vec![
            vec!["Income".to_string(), s.income.round_dp(2).to_string()],
            vec!["Expenses".to_string(), s.expenses.round_dp(2).to_string()],
            vec!["Balance".to_string(), s.balance.round_dp(2).to_string()],
            vec!["Transactions".to_string(), s.transactions.to_string()],
        ];
        println!("{} .. {}", s.range.start_date, s.range.end_date);
        println!("{}", pretty_table(&["", "Amount"], rows));
        if !s.recent.is_empty() {
            let recent = s
                .recent
                .iter()
                .map(|t| {
                    vec![
                        display_date(t.date),
                        t.description.clone(),
                        t.kind.label().to_string(),
                        t.amount.to_string(),
                    ]
                })
                .collect();
            println!("Recent transactions");
            println!("{}", pretty_table(&["Date", "Description", "Type", "Amount"], recent));
        }
        if !s.upcoming_renewals.is_empty() {
            let renewals = s
                .upcoming_renewals
                .iter()
                .map(|r| vec![r.name.clone(), display_date(r.renewal_date), r.amount.to_string()])
                .collect();
            println!("Upcoming renewals");
            println!("{}", pretty_table(&["Subscription", "Renews", "Amount"], renewals));
        }
    }
    Ok(())
}

/// Writes the period's transactions as CSV and returns the file written.
pub fn write_csv(state: &AppState, sub: &clap::ArgMatches, today: NaiveDate) -> Result<PathBuf> {
    let period = period_or_this_month(sub, today)?;
    let hits = transactions_in_range(&state.transactions, &period.range(today));
    let body = transactions_csv(hits, &state.categories)?;
    let path = output_path(sub.get_one::<String>("out"), &csv_file_name(&period));
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

#[derive(Debug, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub amount: Decimal,
}

fn by_category(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let today = today();
    let range = period_or_this_month(sub, today)?.range(today);
    let state = store.state();
    let data: Vec<CategorySpend> = spend_by_category(&state.transactions, &state.categories, Some(&range))
        .into_iter()
        .map(|(category, amount)| CategorySpend { category, amount })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| vec![r.category.clone(), r.amount.round_dp(2).to_string()])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
    }
    Ok(())
}
