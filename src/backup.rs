// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Whole-state JSON backup and restore.

use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::models::{Budget, Category, Subscription, Transaction};
use crate::state::AppState;

pub const EXPORT_FILE_NAME: &str = "finance-app-data.json";

#[derive(Serialize)]
struct ExportBundle<'a> {
    transactions: &'a [Transaction],
    subscriptions: &'a [Subscription],
    budgets: &'a [Budget],
    categories: &'a [Category],
}

/// Pretty-printed JSON holding the four user collections.
pub fn export_json(state: &AppState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportBundle {
        transactions: &state.transactions,
        subscriptions: &state.subscriptions,
        budgets: &state.budgets,
        categories: &state.categories,
    })
}

/// Parsed import file. A `None` collection was absent and is left alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImportBundle {
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    pub subscriptions: Option<Vec<Subscription>>,
    #[serde(default)]
    pub budgets: Option<Vec<Budget>>,
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

impl ImportBundle {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_none()
            && self.subscriptions.is_none()
            && self.budgets.is_none()
            && self.categories.is_none()
    }
}

/// Parses an export file. Unknown keys are ignored; `null` counts as absent.
pub fn parse_import(text: &str) -> Result<ImportBundle, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(ImportError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}
