// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use csv::{QuoteStyle, WriterBuilder};

use crate::analytics::CategoryNames;
use crate::error::ValidationError;
use crate::models::{Category, DateRange, Transaction};

pub const CSV_HEADERS: [&str; 6] = ["Date", "Type", "Category", "Description", "Amount", "Notes"];

/// Reporting window picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    ThisMonth,
    LastMonth,
    ThisQuarter,
    LastQuarter,
    ThisYear,
    LastYear,
    Custom(DateRange),
}

fn first_of(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

fn last_day_before(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

impl ReportPeriod {
    /// Resolves the period to concrete dates relative to `today`.
    pub fn range(&self, today: NaiveDate) -> DateRange {
        let month_start = first_of(today.year(), today.month());
        let quarter_start = first_of(today.year(), (today.month0() / 3) * 3 + 1);
        let year = today.year();
        match self {
            ReportPeriod::ThisMonth => DateRange::new(
                month_start,
                last_day_before(month_start + Months::new(1)),
            ),
            ReportPeriod::LastMonth => DateRange::new(
                month_start - Months::new(1),
                last_day_before(month_start),
            ),
            ReportPeriod::ThisQuarter => DateRange::new(
                quarter_start,
                last_day_before(quarter_start + Months::new(3)),
            ),
            ReportPeriod::LastQuarter => DateRange::new(
                quarter_start - Months::new(3),
                last_day_before(quarter_start),
            ),
            ReportPeriod::ThisYear => DateRange::new(first_of(year, 1), last_day_before(first_of(year + 1, 1))),
            ReportPeriod::LastYear => DateRange::new(first_of(year - 1, 1), last_day_before(first_of(year, 1))),
            ReportPeriod::Custom(range) => *range,
        }
    }

    /// Token used in export file names.
    pub fn token(&self) -> &'static str {
        match self {
            ReportPeriod::ThisMonth => "thisMonth",
            ReportPeriod::LastMonth => "lastMonth",
            ReportPeriod::ThisQuarter => "thisQuarter",
            ReportPeriod::LastQuarter => "lastQuarter",
            ReportPeriod::ThisYear => "thisYear",
            ReportPeriod::LastYear => "lastYear",
            ReportPeriod::Custom(_) => "custom-period",
        }
    }

    /// Start of the year through today, the range a custom report opens with.
    pub fn default_custom(today: NaiveDate) -> ReportPeriod {
        ReportPeriod::Custom(DateRange::new(first_of(today.year(), 1), today))
    }
}

impl FromStr for ReportPeriod {
    type Err = ValidationError;

    /// Parses the named periods. `custom` needs explicit dates, so it is
    /// not accepted here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "thisMonth" | "this-month" => Ok(ReportPeriod::ThisMonth),
            "lastMonth" | "last-month" => Ok(ReportPeriod::LastMonth),
            "thisQuarter" | "this-quarter" => Ok(ReportPeriod::ThisQuarter),
            "lastQuarter" | "last-quarter" => Ok(ReportPeriod::LastQuarter),
            "thisYear" | "this-year" => Ok(ReportPeriod::ThisYear),
            "lastYear" | "last-year" => Ok(ReportPeriod::LastYear),
            _ => Err(ValidationError::UnknownVariant {
                kind: "report period",
                value: s.to_string(),
            }),
        }
    }
}

pub fn csv_file_name(period: &ReportPeriod) -> String {
    format!("transactions-{}.csv", period.token())
}

/// Short US-style date as shown in reports, e.g. `Jan 5, 2024`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Renders transactions as CSV with every cell quoted.
///
/// Rows keep the order of `transactions`. Categories that no longer exist
/// are written as "Uncategorized".
pub fn transactions_csv<'a, I>(transactions: I, categories: &[Category]) -> Result<String>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let names = CategoryNames::new(categories);
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(CSV_HEADERS)?;
    for t in transactions {
        wtr.write_record([
            display_date(t.date),
            t.kind.label().to_string(),
            names.resolve(&t.category_id).to_string(),
            t.description.clone(),
            t.amount.normalize().to_string(),
            t.notes.clone().unwrap_or_default(),
        ])?;
    }
    let bytes = wtr.into_inner().context("flush CSV writer")?;
    let mut out = String::from_utf8(bytes).context("CSV output was not UTF-8")?;
    // no newline after the last row
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn periods_resolve_relative_to_today() {
        let today = d("2024-02-14");
        assert_eq!(
            ReportPeriod::ThisMonth.range(today),
            DateRange::new(d("2024-02-01"), d("2024-02-29"))
        );
        assert_eq!(
            ReportPeriod::LastMonth.range(today),
            DateRange::new(d("2024-01-01"), d("2024-01-31"))
        );
        assert_eq!(
            ReportPeriod::ThisQuarter.range(today),
            DateRange::new(d("2024-01-01"), d("2024-03-31"))
        );
        assert_eq!(
            ReportPeriod::LastQuarter.range(today),
            DateRange::new(d("2023-10-01"), d("2023-12-31"))
        );
        assert_eq!(
            ReportPeriod::LastYear.range(today),
            DateRange::new(d("2023-01-01"), d("2023-12-31"))
        );
        assert_eq!(
            ReportPeriod::default_custom(today).range(today),
            DateRange::new(d("2024-01-01"), today)
        );
    }

    #[test]
    fn csv_quotes_every_cell_and_resolves_categories() {
        let cats = crate::defaults::default_categories();
        let txs = vec![
            Transaction {
                id: "1".into(),
                amount: "42.50".parse().unwrap(),
                description: "Groceries, weekly".into(),
                date: d("2024-01-05"),
                kind: TransactionType::Expense,
                category_id: "expense-food".into(),
                is_recurring: false,
                recurring_frequency: None,
                receipt_url: None,
                notes: Some("used \"coupon\"".into()),
            },
            Transaction {
                id: "2".into(),
                amount: "1000".parse().unwrap(),
                description: "Pay".into(),
                date: d("2024-01-31"),
                kind: TransactionType::Income,
                category_id: "deleted".into(),
                is_recurring: true,
                recurring_frequency: None,
                receipt_url: None,
                notes: None,
            },
        ];
        let out = transactions_csv(&txs, &cats).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            r#""Date","Type","Category","Description","Amount","Notes""#
        );
        assert_eq!(
            lines[1],
            r#""Jan 5, 2024","Expense","Food & Dining","Groceries, weekly","42.5","used ""coupon""""#
        );
        assert_eq!(lines[2], r#""Jan 31, 2024","Income","Uncategorized","Pay","1000","""#);
        assert_eq!(lines.len(), 3);
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn file_name_carries_period_token() {
        assert_eq!(csv_file_name(&ReportPeriod::ThisYear), "transactions-thisYear.csv");
        let custom = ReportPeriod::default_custom(d("2024-06-01"));
        assert_eq!(csv_file_name(&custom), "transactions-custom-period.csv");
    }
}
