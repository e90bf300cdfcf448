// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use pennywise::cli;
use pennywise::commands::subscriptions;
use pennywise::models::BillingCycle;
use pennywise::state::Store;
use pennywise::storage::Storage;
use pennywise::utils::today;

fn store() -> Store {
    Store::open(Storage::open_in_memory().unwrap(), 0)
}

fn sub(store: &mut Store, args: &[&str]) {
    let matches = cli::build_cli().get_matches_from(
        ["pennywise", "sub"].iter().chain(args.iter()).copied(),
    );
    let (_, sub_m) = matches.subcommand().expect("sub subcommand");
    subscriptions::handle(store, sub_m).unwrap();
}

#[test]
fn add_without_start_renews_today() {
    let mut store = store();
    sub(&mut store, &["add", "--name", "Music", "--amount", "5"]);
    let s = &store.state().subscriptions[0];
    assert_eq!(s.start_date, today());
    assert_eq!(s.renewal_date, s.start_date);
}

#[test]
fn add_with_future_start_renews_on_start() {
    let mut store = store();
    sub(&mut store, &["add", "--name", "News", "--amount", "9", "--start", "2099-01-01"]);
    let s = &store.state().subscriptions[0];
    assert_eq!(s.renewal_date, NaiveDate::from_ymd_opt(2099, 1, 1).unwrap());
}

#[test]
fn explicit_renewal_wins() {
    let mut store = store();
    sub(
        &mut store,
        &["add", "--name", "Cloud", "--amount", "3", "--start", "2099-01-01", "--renewal", "2099-03-05"],
    );
    assert_eq!(
        store.state().subscriptions[0].renewal_date,
        NaiveDate::from_ymd_opt(2099, 3, 5).unwrap()
    );
}

#[test]
fn editing_start_or_cycle_recomputes_renewal() {
    let mut store = store();
    sub(&mut store, &["add", "--name", "Gym", "--amount", "40", "--start", "2020-01-10"]);
    let id = store.state().subscriptions[0].id.clone();
    let before = store.state().subscriptions[0].renewal_date;
    assert!(before >= today());
    assert_eq!(before.day(), 10);

    sub(&mut store, &["edit", id.as_str(), "--start", "2099-06-20", "--cycle", "yearly"]);
    let s = &store.state().subscriptions[0];
    assert_eq!(s.billing_cycle, BillingCycle::Yearly);
    assert_eq!(s.renewal_date, NaiveDate::from_ymd_opt(2099, 6, 20).unwrap());

    // other edits leave the renewal alone
    sub(&mut store, &["edit", id.as_str(), "--amount", "45"]);
    assert_eq!(
        store.state().subscriptions[0].renewal_date,
        NaiveDate::from_ymd_opt(2099, 6, 20).unwrap()
    );
}
