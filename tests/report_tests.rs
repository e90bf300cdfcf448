// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::commands::{budgets, reports};
use pennywise::models::{
    BillingCycle, BudgetPeriod, NewBudget, NewSubscription, NewTransaction, TransactionType,
};
use pennywise::report::ReportPeriod;
use pennywise::state::Store;
use pennywise::storage::Storage;
use pennywise::cli;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx(amount: &str, kind: TransactionType, date: &str, cat: &str) -> NewTransaction {
    NewTransaction {
        amount: amount.parse().unwrap(),
        description: format!("{} on {}", kind, date),
        date: d(date),
        kind,
        category_id: cat.into(),
        is_recurring: false,
        recurring_frequency: None,
        receipt_url: None,
        notes: None,
    }
}

fn january() -> Store {
    let mut store = Store::open(Storage::open_in_memory().unwrap(), 0);
    store
        .add_transaction(tx("1000", TransactionType::Income, "2024-01-10", "income-salary"))
        .unwrap();
    store
        .add_transaction(tx("400", TransactionType::Expense, "2024-01-12", "expense-housing"))
        .unwrap();
    store
        .add_subscription(NewSubscription {
            name: "Gym".into(),
            amount: "60".parse().unwrap(),
            start_date: d("2023-06-01"),
            renewal_date: d("2024-02-01"),
            billing_cycle: BillingCycle::Monthly,
            category_id: "expense-subscriptions".into(),
            description: None,
            logo_url: None,
            color: None,
            is_active: true,
        })
        .unwrap();
    store
}

#[test]
fn summary_prorates_subscriptions() {
    let store = january();
    let period = ReportPeriod::Custom(pennywise::models::DateRange::new(d("2024-01-01"), d("2024-01-31")));
    let s = reports::build_summary(store.state(), &period, d("2024-02-10"));
    assert_eq!(s.income.to_string(), "1000");
    assert_eq!(s.expenses.to_string(), "460");
    assert_eq!(s.balance.to_string(), "540");
    assert_eq!(s.transactions, 2);
    assert_eq!(s.period, "custom-period");
    assert_eq!(s.recent.len(), 2);
    assert_eq!(s.recent[0].amount.to_string(), "400");
    assert!(s.upcoming_renewals.is_empty());

    // the gym renews on Feb 1
    let s = reports::build_summary(store.state(), &period, d("2024-01-28"));
    assert_eq!(s.upcoming_renewals.len(), 1);
}

#[test]
fn csv_report_is_written_with_period_name() {
    let store = january();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap().to_string();
    let m = cli::build_cli().get_matches_from([
        "pennywise", "report", "csv", "--period", "lastMonth", "--out", out.as_str(),
    ]);
    let (_, report_m) = m.subcommand().unwrap();
    let (_, csv_m) = report_m.subcommand().unwrap();

    let path = reports::write_csv(store.state(), csv_m, d("2024-02-10")).unwrap();
    assert_eq!(path, dir.path().join("transactions-lastMonth.csv"));
    let body = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    // newest first
    assert!(lines[1].starts_with(r#""Jan 12, 2024","Expense","Housing""#));
    assert!(lines[2].contains(r#""Salary""#));
}

#[test]
fn budget_progress_rows_cap_at_full() {
    let mut store = january();
    store
        .add_budget(NewBudget {
            name: "Everything".into(),
            amount: "300".parse().unwrap(),
            allocated_amount: None,
            spent_amount: None,
            period: BudgetPeriod::Monthly,
            category_id: None,
            start_date: d("2024-01-01"),
            end_date: None,
            color: None,
        })
        .unwrap();
    let rows = budgets::progress_rows(store.state(), d("2024-01-20"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].progress.percentage, 100);
    assert_eq!(rows[0].progress.remaining.to_string(), "0");
    assert!(rows[0].over_budget);
    assert_eq!(rows[0].category, "All expenses");
}
