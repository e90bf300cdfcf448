// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid color regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Capitalized form used in reports, e.g. `Income`.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(ValidationError::UnknownVariant {
                kind: "transaction type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl FromStr for RecurringFrequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RecurringFrequency::Daily),
            "weekly" => Ok(RecurringFrequency::Weekly),
            "monthly" => Ok(RecurringFrequency::Monthly),
            "yearly" => Ok(RecurringFrequency::Yearly),
            _ => Err(ValidationError::UnknownVariant {
                kind: "recurring frequency",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    /// Number of calendar months in one cycle. Also the divisor used when
    /// pro-rating a charge to a monthly figure.
    pub fn months(&self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::Yearly => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Yearly => "yearly",
        }
    }
}

impl FromStr for BillingCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(BillingCycle::Monthly),
            "quarterly" => Ok(BillingCycle::Quarterly),
            "yearly" => Ok(BillingCycle::Yearly),
            _ => Err(ValidationError::UnknownVariant {
                kind: "billing cycle",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl BudgetPeriod {
    /// First day of the window containing `today`.
    pub fn start_for(&self, today: NaiveDate) -> NaiveDate {
        let month = match self {
            BudgetPeriod::Monthly => today.month(),
            BudgetPeriod::Quarterly => (today.month0() / 3) * 3 + 1,
            BudgetPeriod::Yearly => 1,
        };
        // day 1 of an existing year/month always exists
        NaiveDate::from_ymd_opt(today.year(), month, 1).unwrap_or(today)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Quarterly => "quarterly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "quarterly" => Ok(BudgetPeriod::Quarterly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            _ => Err(ValidationError::UnknownVariant {
                kind: "budget period",
                value: s.to_string(),
            }),
        }
    }
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Calendar months touched by the range, counting both endpoint months.
    /// Inverted ranges span zero months.
    pub fn months_spanned(&self) -> u32 {
        let months = (self.end_date.year() - self.start_date.year()) * 12
            + self.end_date.month() as i32
            - self.start_date.month() as i32
            + 1;
        months.max(0) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_frequency: Option<RecurringFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A transaction before it has been given an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_frequency: Option<RecurringFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewTransaction {
    pub fn with_id(self, id: String) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            description: self.description,
            date: self.date,
            kind: self.kind,
            category_id: self.category_id,
            is_recurring: self.is_recurring,
            recurring_frequency: self.recurring_frequency,
            receipt_url: self.receipt_url,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub renewal_date: NaiveDate,
    pub billing_cycle: BillingCycle,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub name: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub renewal_date: NaiveDate,
    pub billing_cycle: BillingCycle,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewSubscription {
    pub fn with_id(self, id: String) -> Subscription {
        Subscription {
            id,
            name: self.name,
            amount: self.amount,
            start_date: self.start_date,
            renewal_date: self.renewal_date,
            billing_cycle: self.billing_cycle,
            category_id: self.category_id,
            description: self.description,
            logo_url: self.logo_url,
            color: self.color,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub name: String,
    /// Target amount for one period.
    pub amount: Decimal,
    /// Legacy field. Never read by the aggregation code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_amount: Option<Decimal>,
    /// Legacy field. Actual spend is always recomputed from transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent_amount: Option<Decimal>,
    pub period: BudgetPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub name: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent_amount: Option<Decimal>,
    pub period: BudgetPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewBudget {
    pub fn with_id(self, id: String) -> Budget {
        Budget {
            id,
            name: self.name,
            amount: self.amount,
            allocated_amount: self.allocated_amount,
            spent_amount: self.spent_amount,
            period: self.period,
            category_id: self.category_id,
            start_date: self.start_date,
            end_date: self.end_date,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub color: String,
}

impl NewCategory {
    pub fn with_id(self, id: String) -> Category {
        Category {
            id,
            name: self.name,
            kind: self.kind,
            icon: self.icon,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    Info,
    Warning,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedItemType {
    Transaction,
    Subscription,
    Budget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub severity: NotificationSeverity,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_item_type: Option<RelatedItemType>,
}

/// Checks a record before it is stored.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

fn require_positive(amount: Decimal) -> Result<(), ValidationError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount)
    }
}

fn check_transaction(description: &str, amount: Decimal, category_id: &str) -> Result<(), ValidationError> {
    require("Description", description)?;
    require_positive(amount)?;
    require("Category", category_id)
}

fn check_subscription(name: &str, amount: Decimal, category_id: &str) -> Result<(), ValidationError> {
    require("Name", name)?;
    require_positive(amount)?;
    require("Category", category_id)
}

fn check_budget(
    name: &str,
    amount: Decimal,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    require("Name", name)?;
    require_positive(amount)?;
    match end {
        Some(end) if end < start => Err(ValidationError::EndBeforeStart { start, end }),
        _ => Ok(()),
    }
}

fn check_category(name: &str, color: &str) -> Result<(), ValidationError> {
    require("Category name", name)?;
    if COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

impl Validate for Transaction {
    fn validate(&self) -> Result<(), ValidationError> {
        check_transaction(&self.description, self.amount, &self.category_id)
    }
}

impl Validate for NewTransaction {
    fn validate(&self) -> Result<(), ValidationError> {
        check_transaction(&self.description, self.amount, &self.category_id)
    }
}

impl Validate for Subscription {
    fn validate(&self) -> Result<(), ValidationError> {
        check_subscription(&self.name, self.amount, &self.category_id)
    }
}

impl Validate for NewSubscription {
    fn validate(&self) -> Result<(), ValidationError> {
        check_subscription(&self.name, self.amount, &self.category_id)
    }
}

impl Validate for Budget {
    fn validate(&self) -> Result<(), ValidationError> {
        check_budget(&self.name, self.amount, self.start_date, self.end_date)
    }
}

impl Validate for NewBudget {
    fn validate(&self) -> Result<(), ValidationError> {
        check_budget(&self.name, self.amount, self.start_date, self.end_date)
    }
}

impl Validate for Category {
    fn validate(&self) -> Result<(), ValidationError> {
        check_category(&self.name, &self.color)
    }
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<(), ValidationError> {
        check_category(&self.name, &self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn quarter_start_rounds_down_to_quarter_month() {
        assert_eq!(BudgetPeriod::Quarterly.start_for(d("2024-05-17")), d("2024-04-01"));
        assert_eq!(BudgetPeriod::Quarterly.start_for(d("2024-12-31")), d("2024-10-01"));
        assert_eq!(BudgetPeriod::Monthly.start_for(d("2024-02-29")), d("2024-02-01"));
        assert_eq!(BudgetPeriod::Yearly.start_for(d("2024-07-04")), d("2024-01-01"));
    }

    #[test]
    fn months_spanned_counts_both_endpoint_months() {
        assert_eq!(DateRange::new(d("2024-01-01"), d("2024-01-31")).months_spanned(), 1);
        assert_eq!(DateRange::new(d("2024-01-31"), d("2024-02-01")).months_spanned(), 2);
        assert_eq!(DateRange::new(d("2023-11-15"), d("2024-02-01")).months_spanned(), 4);
        assert_eq!(DateRange::new(d("2024-03-01"), d("2024-01-01")).months_spanned(), 0);
    }

    #[test]
    fn transaction_requires_positive_amount() {
        let draft = NewTransaction {
            amount: dec("0"),
            description: "Coffee".into(),
            date: d("2024-01-02"),
            kind: TransactionType::Expense,
            category_id: "expense-food".into(),
            is_recurring: false,
            recurring_frequency: None,
            receipt_url: None,
            notes: None,
        };
        assert_eq!(draft.validate(), Err(ValidationError::InvalidAmount));

        let blank = NewTransaction {
            amount: dec("3.50"),
            description: "   ".into(),
            ..draft
        };
        assert_eq!(blank.validate(), Err(ValidationError::Required("Description")));
    }

    #[test]
    fn category_color_must_be_hex() {
        let mut cat = NewCategory {
            name: "Pets".into(),
            kind: TransactionType::Expense,
            icon: None,
            color: "#abc".into(),
        };
        assert!(cat.validate().is_ok());
        cat.color = "blue".into();
        assert!(matches!(cat.validate(), Err(ValidationError::InvalidColor(_))));
    }

    #[test]
    fn transaction_deserializes_numeric_amount_and_camel_case() {
        let json = r#"{
            "id": "t1",
            "amount": 12.5,
            "description": "Lunch",
            "date": "2024-01-05",
            "type": "expense",
            "categoryId": "expense-food",
            "isRecurring": false
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, dec("12.5"));
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.category_id, "expense-food");
        assert!(tx.notes.is_none());
    }
}
