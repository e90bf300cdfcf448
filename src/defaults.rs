// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, TransactionType};

const SEED: &[(&str, &str, TransactionType, &str, &str)] = &[
    ("income-salary", "Salary", TransactionType::Income, "BriefcaseIcon", "#10b981"),
    ("income-business", "Business", TransactionType::Income, "BuildingIcon", "#059669"),
    ("income-investments", "Investments", TransactionType::Income, "TrendingUpIcon", "#047857"),
    ("income-gifts", "Gifts", TransactionType::Income, "GiftIcon", "#065f46"),
    ("income-other", "Other Income", TransactionType::Income, "PlusCircleIcon", "#064e3b"),
    ("expense-housing", "Housing", TransactionType::Expense, "HomeIcon", "#3b82f6"),
    ("expense-transportation", "Transportation", TransactionType::Expense, "CarIcon", "#2563eb"),
    ("expense-food", "Food & Dining", TransactionType::Expense, "UtensilsIcon", "#1d4ed8"),
    ("expense-utilities", "Utilities", TransactionType::Expense, "ZapIcon", "#1e40af"),
    ("expense-healthcare", "Healthcare", TransactionType::Expense, "ActivityIcon", "#1e3a8a"),
    ("expense-entertainment", "Entertainment", TransactionType::Expense, "FilmIcon", "#4f46e5"),
    ("expense-shopping", "Shopping", TransactionType::Expense, "ShoppingBagIcon", "#4338ca"),
    ("expense-subscriptions", "Subscriptions", TransactionType::Expense, "RepeatIcon", "#3730a3"),
    ("expense-other", "Other Expenses", TransactionType::Expense, "MoreHorizontalIcon", "#6366f1"),
];

/// Categories written to an empty database on first load: five income and
/// nine expense categories with stable ids.
pub fn default_categories() -> Vec<Category> {
    SEED.iter()
        .map(|(id, name, kind, icon, color)| Category {
            id: (*id).to_string(),
            name: (*name).to_string(),
            kind: *kind,
            icon: Some((*icon).to_string()),
            color: (*color).to_string(),
        })
        .collect()
}
