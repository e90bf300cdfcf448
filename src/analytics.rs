// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Totals, balances and budget progress over loaded collections.
//!
//! Nothing here touches storage. Functions that depend on the current day
//! take it as `today` so callers decide which clock to use.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::{
    BillingCycle, Budget, Category, DateRange, Subscription, Transaction, TransactionType,
};

/// Days ahead (inclusive) in which a renewal counts as "soon".
pub const RENEWAL_SOON_DAYS: i64 = 7;

pub const UNCATEGORIZED: &str = "Uncategorized";

fn in_range(date: NaiveDate, range: Option<&DateRange>) -> bool {
    range.is_none_or(|r| r.contains(date))
}

fn sum_of_kind(
    transactions: &[Transaction],
    kind: TransactionType,
    range: Option<&DateRange>,
) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.kind == kind && in_range(t.date, range))
        .map(|t| t.amount)
        .sum()
}

/// Sum of income amounts dated inside `range`, or over all time.
pub fn total_income(transactions: &[Transaction], range: Option<&DateRange>) -> Decimal {
    sum_of_kind(transactions, TransactionType::Income, range)
}

/// Expense transactions in `range` plus the pro-rated cost of active
/// subscriptions.
///
/// With a range, each active subscription contributes its monthly
/// equivalent times the number of calendar months the range touches.
/// Without one, it contributes one undiluted cycle.
pub fn total_expenses(
    transactions: &[Transaction],
    subscriptions: &[Subscription],
    range: Option<&DateRange>,
) -> Decimal {
    let expenses = sum_of_kind(transactions, TransactionType::Expense, range);
    let recurring: Decimal = subscriptions
        .iter()
        .filter(|s| s.is_active)
        .map(|s| subscription_cost(s, range))
        .sum();
    expenses + recurring
}

fn subscription_cost(sub: &Subscription, range: Option<&DateRange>) -> Decimal {
    match range {
        None => sub.amount,
        Some(r) => {
            let per_month = sub.amount / Decimal::from(sub.billing_cycle.months());
            per_month * Decimal::from(r.months_spanned())
        }
    }
}

pub fn balance(
    transactions: &[Transaction],
    subscriptions: &[Subscription],
    range: Option<&DateRange>,
) -> Decimal {
    total_income(transactions, range) - total_expenses(transactions, subscriptions, range)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetProgress {
    pub spent: Decimal,
    /// Whole percent of the target spent, capped at 100.
    pub percentage: u32,
    /// Never negative.
    pub remaining: Decimal,
    #[serde(skip)]
    target: Decimal,
}

impl BudgetProgress {
    /// Compares the uncapped spend, so a budget that is exactly used up
    /// counts as over.
    pub fn is_over_budget(&self) -> bool {
        self.spent >= self.target
    }
}

/// Spend against `budget` in its current period.
///
/// The period is anchored on `today`, not on the budget's own start date.
pub fn budget_progress(budget: &Budget, transactions: &[Transaction], today: NaiveDate) -> BudgetProgress {
    let period_start = budget.period.start_for(today);
    let spent: Decimal = transactions
        .iter()
        .filter(|t| {
            t.kind == TransactionType::Expense
                && t.date >= period_start
                && budget
                    .category_id
                    .as_deref()
                    .is_none_or(|c| c.is_empty() || c == t.category_id)
        })
        .map(|t| t.amount)
        .sum();

    let percentage = if budget.amount > Decimal::ZERO {
        // a ratio too large for Decimal is over the cap anyway
        let ratio = spent
            .checked_div(budget.amount)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Decimal::ONE_HUNDRED, |r| r.min(Decimal::ONE_HUNDRED));
        ratio
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    } else if spent > Decimal::ZERO {
        100
    } else {
        0
    };

    BudgetProgress {
        spent,
        percentage,
        remaining: (budget.amount - spent).max(Decimal::ZERO),
        target: budget.amount,
    }
}

/// Whole calendar days from `today` until the subscription renews.
/// Negative once the renewal date has passed.
pub fn days_until_renewal(sub: &Subscription, today: NaiveDate) -> i64 {
    (sub.renewal_date - today).num_days()
}

pub fn is_renewal_soon(sub: &Subscription, today: NaiveDate) -> bool {
    (0..=RENEWAL_SOON_DAYS).contains(&days_until_renewal(sub, today))
}

/// Steps `start` forward one billing cycle at a time until it is on or after
/// `today`. Month arithmetic clamps to the last day of shorter months.
pub fn next_renewal_date(start: NaiveDate, cycle: BillingCycle, today: NaiveDate) -> NaiveDate {
    let step = cycle.months();
    let mut n = 0u32;
    let mut date = start;
    while date < today {
        n += step;
        // anchoring on `start` keeps a 31st from drifting to the 28th forever
        match start.checked_add_months(Months::new(n)) {
            Some(next) => date = next,
            None => break,
        }
    }
    date
}

/// Active subscriptions renewing soon, earliest first.
pub fn upcoming_renewals<'a>(
    subscriptions: &'a [Subscription],
    today: NaiveDate,
    limit: usize,
) -> Vec<&'a Subscription> {
    let mut soon: Vec<&Subscription> = subscriptions
        .iter()
        .filter(|s| s.is_active && is_renewal_soon(s, today))
        .collect();
    soon.sort_by_key(|s| s.renewal_date);
    soon.truncate(limit);
    soon
}

/// Newest transactions first.
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
    let mut all: Vec<&Transaction> = transactions.iter().collect();
    all.sort_by(|a, b| b.date.cmp(&a.date));
    all.truncate(limit);
    all
}

/// Transactions dated inside `range`, newest first.
pub fn transactions_in_range<'a>(transactions: &'a [Transaction], range: &DateRange) -> Vec<&'a Transaction> {
    let mut hits: Vec<&Transaction> = transactions.iter().filter(|t| range.contains(t.date)).collect();
    hits.sort_by(|a, b| b.date.cmp(&a.date));
    hits
}

/// Maps category ids to names for display.
pub struct CategoryNames<'a> {
    names: HashMap<&'a str, &'a str>,
}

impl<'a> CategoryNames<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        Self {
            names: categories.iter().map(|c| (c.id.as_str(), c.name.as_str())).collect(),
        }
    }

    /// Falls back to "Uncategorized" for dangling ids.
    pub fn resolve(&self, id: &str) -> &'a str {
        self.names.get(id).copied().unwrap_or(UNCATEGORIZED)
    }
}

/// Expense totals per category name in `range`, largest first.
pub fn spend_by_category(
    transactions: &[Transaction],
    categories: &[Category],
    range: Option<&DateRange>,
) -> Vec<(String, Decimal)> {
    let names = CategoryNames::new(categories);
    let mut agg: HashMap<&str, Decimal> = HashMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Expense && in_range(t.date, range))
    {
        *agg.entry(names.resolve(&t.category_id)).or_insert(Decimal::ZERO) += t.amount;
    }
    let mut items: Vec<(String, Decimal)> = agg.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetPeriod;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn tx(id: &str, kind: TransactionType, amount: &str, date: &str, cat: &str) -> Transaction {
        Transaction {
            id: id.into(),
            amount: dec(amount),
            description: format!("tx {id}"),
            date: d(date),
            kind,
            category_id: cat.into(),
            is_recurring: false,
            recurring_frequency: None,
            receipt_url: None,
            notes: None,
        }
    }

    fn sub(amount: &str, cycle: BillingCycle, renewal: &str, active: bool) -> Subscription {
        Subscription {
            id: format!("s-{renewal}"),
            name: "Stream".into(),
            amount: dec(amount),
            start_date: d("2023-01-01"),
            renewal_date: d(renewal),
            billing_cycle: cycle,
            category_id: "expense-subscriptions".into(),
            description: None,
            logo_url: None,
            color: None,
            is_active: active,
        }
    }

    fn budget(amount: &str, period: BudgetPeriod, category: Option<&str>) -> Budget {
        Budget {
            id: "b1".into(),
            name: "Everything".into(),
            amount: dec(amount),
            allocated_amount: None,
            spent_amount: None,
            period,
            category_id: category.map(str::to_string),
            start_date: d("2020-01-01"),
            end_date: None,
            color: None,
        }
    }

    fn january() -> DateRange {
        DateRange::new(d("2024-01-01"), d("2024-01-31"))
    }

    #[test]
    fn january_scenario_totals() {
        let txs = vec![
            tx("1", TransactionType::Income, "1000", "2024-01-10", "income-salary"),
            tx("2", TransactionType::Expense, "400", "2024-01-15", "expense-housing"),
        ];
        let subs = vec![sub("60", BillingCycle::Monthly, "2024-02-01", true)];
        let range = january();
        assert_eq!(total_income(&txs, Some(&range)), dec("1000"));
        assert_eq!(total_expenses(&txs, &subs, Some(&range)), dec("460"));
        assert_eq!(balance(&txs, &subs, Some(&range)), dec("540"));
    }

    #[test]
    fn range_filter_is_inclusive_and_matches_naive_sum() {
        let txs = vec![
            tx("1", TransactionType::Income, "10", "2023-12-31", "a"),
            tx("2", TransactionType::Income, "20", "2024-01-01", "a"),
            tx("3", TransactionType::Expense, "5.25", "2024-01-31", "b"),
            tx("4", TransactionType::Expense, "7", "2024-02-01", "b"),
            tx("5", TransactionType::Income, "3.10", "2024-01-20", "a"),
        ];
        let range = january();

        let naive_income: Decimal = txs
            .iter()
            .filter(|t| t.kind == TransactionType::Income && t.date >= range.start_date && t.date <= range.end_date)
            .map(|t| t.amount)
            .sum();
        let naive_expense: Decimal = txs
            .iter()
            .filter(|t| t.kind == TransactionType::Expense && t.date >= range.start_date && t.date <= range.end_date)
            .map(|t| t.amount)
            .sum();

        assert_eq!(
            total_income(&txs, Some(&range)) - total_expenses(&txs, &[], Some(&range)),
            naive_income - naive_expense
        );
        assert_eq!(total_income(&txs, None), dec("33.10"));
    }

    #[test]
    fn subscriptions_are_prorated_by_cycle() {
        let subs = vec![
            sub("30", BillingCycle::Quarterly, "2024-03-01", true),
            sub("120", BillingCycle::Yearly, "2024-06-01", true),
            sub("999", BillingCycle::Monthly, "2024-01-05", false),
        ];
        // Jan..Mar spans three months: 30 + 30
        let q1 = DateRange::new(d("2024-01-15"), d("2024-03-02"));
        assert_eq!(total_expenses(&[], &subs, Some(&q1)), dec("60"));
        // no range: one raw cycle each, inactive excluded
        assert_eq!(total_expenses(&[], &subs, None), dec("150"));
    }

    #[test]
    fn over_spent_budget_is_capped() {
        let today = d("2024-01-20");
        let txs = vec![
            tx("1", TransactionType::Expense, "350", "2024-01-03", "expense-food"),
            tx("2", TransactionType::Expense, "250", "2024-01-19", "expense-housing"),
            tx("3", TransactionType::Expense, "900", "2023-12-31", "expense-food"),
            tx("4", TransactionType::Income, "5000", "2024-01-05", "income-salary"),
        ];
        let b = budget("500", BudgetPeriod::Monthly, None);
        let progress = budget_progress(&b, &txs, today);
        assert_eq!(progress.spent, dec("600"));
        assert_eq!(progress.percentage, 100);
        assert_eq!(progress.remaining, Decimal::ZERO);
        assert!(progress.is_over_budget());
        assert_eq!(progress, budget_progress(&b, &txs, today));
    }

    #[test]
    fn category_budget_only_counts_its_category() {
        let today = d("2024-05-10");
        let txs = vec![
            tx("1", TransactionType::Expense, "33.333", "2024-04-02", "expense-food"),
            tx("2", TransactionType::Expense, "50", "2024-05-01", "expense-housing"),
            tx("3", TransactionType::Expense, "12", "2024-03-31", "expense-food"),
        ];
        let b = budget("200", BudgetPeriod::Quarterly, Some("expense-food"));
        let progress = budget_progress(&b, &txs, today);
        assert_eq!(progress.spent, dec("33.333"));
        // 16.6665% rounds to 17
        assert_eq!(progress.percentage, 17);
        assert_eq!(progress.remaining, dec("166.667"));
        assert!(!progress.is_over_budget());
    }

    #[test]
    fn zero_target_budget_does_not_divide() {
        let today = d("2024-05-10");
        let b = budget("0", BudgetPeriod::Yearly, None);
        assert_eq!(budget_progress(&b, &[], today).percentage, 0);
        let txs = vec![tx("1", TransactionType::Expense, "1", "2024-02-01", "x")];
        let progress = budget_progress(&b, &txs, today);
        assert_eq!(progress.percentage, 100);
        assert_eq!(progress.remaining, Decimal::ZERO);
    }

    #[test]
    fn tiny_target_budget_caps_instead_of_overflowing() {
        let today = d("2024-05-10");
        let b = budget("0.0000000000000000000001", BudgetPeriod::Monthly, None);
        let txs = vec![tx("1", TransactionType::Expense, "100000000", "2024-05-02", "x")];
        let progress = budget_progress(&b, &txs, today);
        assert_eq!(progress.percentage, 100);
        assert_eq!(progress.remaining, Decimal::ZERO);
        assert!(progress.is_over_budget());
    }

    #[test]
    fn next_renewal_keeps_start_on_or_after_today() {
        let today = d("2024-05-10");
        assert_eq!(next_renewal_date(today, BillingCycle::Monthly, today), today);
        let future = d("2099-01-01");
        assert_eq!(next_renewal_date(future, BillingCycle::Yearly, today), future);
    }

    #[test]
    fn renewal_soon_window() {
        let today = d("2024-03-10");
        assert!(is_renewal_soon(&sub("5", BillingCycle::Monthly, "2024-03-10", true), today));
        assert!(is_renewal_soon(&sub("5", BillingCycle::Monthly, "2024-03-17", true), today));
        assert!(!is_renewal_soon(&sub("5", BillingCycle::Monthly, "2024-03-18", true), today));
        assert!(!is_renewal_soon(&sub("5", BillingCycle::Monthly, "2024-03-09", true), today));
    }

    #[test]
    fn next_renewal_steps_whole_cycles() {
        let today = d("2024-03-10");
        assert_eq!(next_renewal_date(d("2024-01-15"), BillingCycle::Monthly, today), d("2024-03-15"));
        assert_eq!(next_renewal_date(d("2023-02-10"), BillingCycle::Quarterly, today), d("2024-05-10"));
        assert_eq!(next_renewal_date(d("2022-03-10"), BillingCycle::Yearly, today), d("2024-03-10"));
        assert_eq!(next_renewal_date(d("2024-06-01"), BillingCycle::Yearly, today), d("2024-06-01"));
        assert_eq!(next_renewal_date(d("2023-10-31"), BillingCycle::Monthly, today), d("2024-03-31"));
    }

    #[test]
    fn upcoming_renewals_sorted_and_limited() {
        let today = d("2024-03-10");
        let subs = vec![
            sub("1", BillingCycle::Monthly, "2024-03-15", true),
            sub("2", BillingCycle::Monthly, "2024-03-11", true),
            sub("3", BillingCycle::Monthly, "2024-03-12", false),
            sub("4", BillingCycle::Monthly, "2024-03-13", true),
            sub("5", BillingCycle::Monthly, "2024-03-10", true),
            sub("6", BillingCycle::Monthly, "2024-04-10", true),
        ];
        let dates: Vec<NaiveDate> = upcoming_renewals(&subs, today, 3).iter().map(|s| s.renewal_date).collect();
        assert_eq!(dates, vec![d("2024-03-10"), d("2024-03-11"), d("2024-03-13")]);
    }

    #[test]
    fn spend_by_category_resolves_names() {
        let cats = crate::defaults::default_categories();
        let txs = vec![
            tx("1", TransactionType::Expense, "10", "2024-01-02", "expense-food"),
            tx("2", TransactionType::Expense, "25", "2024-01-03", "gone"),
            tx("3", TransactionType::Expense, "5", "2024-01-04", "expense-food"),
            tx("4", TransactionType::Income, "100", "2024-01-04", "income-salary"),
        ];
        let rows = spend_by_category(&txs, &cats, Some(&january()));
        assert_eq!(
            rows,
            vec![
                (UNCATEGORIZED.to_string(), dec("25")),
                ("Food & Dining".to_string(), dec("15")),
            ]
        );
    }
}
