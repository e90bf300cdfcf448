// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use chrono::NaiveDate;
use pennywise::backup::parse_import;
use pennywise::db::{self, Collection};
use pennywise::error::{StoreError, ValidationError};
use pennywise::models::{BudgetPeriod, NewBudget, NewTransaction, TransactionType};
use pennywise::state::Store;
use pennywise::storage::Storage;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn open(path: &Path, retries: u32) -> Store {
    Store::open(Storage::new(db::open_or_init(path).unwrap()), retries)
}

fn lunch(amount: &str) -> NewTransaction {
    NewTransaction {
        amount: amount.parse().unwrap(),
        description: "Lunch".into(),
        date: d("2024-01-05"),
        kind: TransactionType::Expense,
        category_id: "expense-food".into(),
        is_recurring: false,
        recurring_frequency: None,
        receipt_url: None,
        notes: None,
    }
}

#[test]
fn mutations_survive_reopen_after_flush() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pw.sqlite");

    let mut store = open(&path, 3);
    assert!(!store.is_loading());
    let a = store.add_transaction(lunch("12.50")).unwrap();
    let b = store.add_transaction(lunch("8")).unwrap();
    assert_ne!(a.id, b.id);
    store.delete_transaction(&b.id);
    store.flush();
    assert_eq!(store.write_failures(), 0);
    drop(store);

    let store = open(&path, 3);
    assert_eq!(store.state().transactions, vec![a]);
    assert_eq!(store.state().categories.len(), 14);
}

#[test]
fn invalid_records_are_refused_before_dispatch() {
    let mut store = Store::open(Storage::open_in_memory().unwrap(), 0);
    let err = store.add_transaction(lunch("-3")).unwrap_err();
    assert_eq!(err, StoreError::Invalid(ValidationError::InvalidAmount));
    assert!(store.state().transactions.is_empty());
}

#[test]
fn add_budget_fills_legacy_amounts() {
    let mut store = Store::open(Storage::open_in_memory().unwrap(), 0);
    let b = store
        .add_budget(NewBudget {
            name: "Food".into(),
            amount: "500".parse().unwrap(),
            allocated_amount: None,
            spent_amount: None,
            period: BudgetPeriod::Monthly,
            category_id: None,
            start_date: d("2024-01-01"),
            end_date: None,
            color: None,
        })
        .unwrap();
    assert_eq!(b.allocated_amount, Some(Decimal::ZERO));
    assert_eq!(store.state().budgets[0].spent_amount, Some(Decimal::ZERO));
}

#[test]
fn update_budget_keeps_stored_legacy_amounts() {
    let mut store = Store::open(Storage::open_in_memory().unwrap(), 0);
    let b = store
        .add_budget(NewBudget {
            name: "Food".into(),
            amount: "500".parse().unwrap(),
            allocated_amount: Some("250".parse().unwrap()),
            spent_amount: None,
            period: BudgetPeriod::Monthly,
            category_id: Some("expense-food".into()),
            start_date: d("2024-01-01"),
            end_date: None,
            color: None,
        })
        .unwrap();

    let mut edited = b.clone();
    edited.amount = "650".parse().unwrap();
    edited.allocated_amount = None;
    edited.spent_amount = None;
    store.update_budget(edited).unwrap();

    let stored = &store.state().budgets[0];
    assert_eq!(stored.amount.to_string(), "650");
    assert_eq!(stored.allocated_amount, Some("250".parse().unwrap()));
    assert_eq!(stored.spent_amount, Some(Decimal::ZERO));

    let mut bad = stored.clone();
    bad.end_date = Some(d("2023-12-31"));
    assert!(matches!(
        store.update_budget(bad),
        Err(StoreError::Invalid(ValidationError::EndBeforeStart { .. }))
    ));
    assert_eq!(store.state().budgets[0].end_date, None);
}

#[test]
fn update_category_persists_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pw.sqlite");

    let mut store = open(&path, 3);
    let mut food = store
        .state()
        .categories
        .iter()
        .find(|c| c.id == "expense-food")
        .cloned()
        .unwrap();
    food.name = "Groceries".into();
    food.color = "#123abc".into();
    store.update_category(food.clone()).unwrap();

    let mut bad = food.clone();
    bad.color = "green".into();
    assert!(store.update_category(bad).is_err());
    store.flush();
    drop(store);

    let store = open(&path, 3);
    let stored = store.state().categories.iter().find(|c| c.id == "expense-food").unwrap();
    assert_eq!(stored, &food);
    assert_eq!(store.state().categories.len(), 14);
}

#[test]
fn checked_category_delete_refuses_when_referenced() {
    let mut store = Store::open(Storage::open_in_memory().unwrap(), 0);
    store.add_transaction(lunch("10")).unwrap();

    let err = store.delete_category_checked("expense-food").unwrap_err();
    assert!(matches!(err, StoreError::CategoryInUse { transactions: 1, .. }));
    assert!(store.orphaned_references().is_empty());

    store.delete_category_checked("expense-shopping").unwrap();
    assert!(matches!(
        store.delete_category_checked("expense-shopping"),
        Err(StoreError::NotFound { .. })
    ));

    // unchecked delete leaves the transaction dangling
    store.delete_category("expense-food");
    let orphans = store.orphaned_references();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].kind, "transaction");
}

#[test]
fn import_replaces_only_present_collections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pw.sqlite");
    let mut store = open(&path, 3);
    store.add_transaction(lunch("10")).unwrap();

    let bundle = parse_import(
        r##"{"categories": [{"id": "c1", "name": "Pets", "type": "expense", "color": "#abcdef"}]}"##,
    )
    .unwrap();
    let replaced = store.apply_import(bundle);
    assert_eq!(replaced, vec![Collection::Categories]);
    assert_eq!(store.state().transactions.len(), 1);
    assert_eq!(store.state().categories.len(), 1);
    store.flush();
    drop(store);

    let store = open(&path, 3);
    assert_eq!(store.state().categories[0].name, "Pets");
    assert_eq!(store.state().transactions.len(), 1);
}

#[test]
fn write_failures_are_counted_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pw.sqlite");
    let mut store = open(&path, 0);

    let other = Connection::open(&path).unwrap();
    other.execute_batch("DROP TABLE transactions;").unwrap();
    drop(other);

    let t = store.add_transaction(lunch("10")).unwrap();
    store.flush();
    assert_eq!(store.write_failures(), 1);
    assert!(store.last_write_error().unwrap().starts_with("transactions"));
    // in-memory state is kept
    assert_eq!(store.state().transactions, vec![t]);
}
