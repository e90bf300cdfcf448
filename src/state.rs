// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The application state and the only ways to change it.
//!
//! [`reduce`] is the pure transition function. [`Store`] owns the state,
//! applies actions through `reduce`, and queues a write-back of every
//! collection an action touched.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::backup::ImportBundle;
use crate::db::Collection;
use crate::error::StoreError;
use crate::models::{
    Budget, Category, NewBudget, NewCategory, NewSubscription, NewTransaction, Subscription,
    Transaction, Validate,
};
use crate::storage::Storage;
use crate::writeback::{lock, Snapshot, WriteBackWorker};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub transactions: Vec<Transaction>,
    pub subscriptions: Vec<Subscription>,
    pub budgets: Vec<Budget>,
    pub categories: Vec<Category>,
    pub is_loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            subscriptions: Vec::new(),
            budgets: Vec::new(),
            categories: Vec::new(),
            is_loading: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetTransactions(Vec<Transaction>),
    AddTransaction(Transaction),
    UpdateTransaction(Transaction),
    DeleteTransaction(String),
    SetSubscriptions(Vec<Subscription>),
    AddSubscription(Subscription),
    UpdateSubscription(Subscription),
    DeleteSubscription(String),
    SetBudgets(Vec<Budget>),
    AddBudget(Budget),
    UpdateBudget(Budget),
    DeleteBudget(String),
    SetCategories(Vec<Category>),
    AddCategory(Category),
    UpdateCategory(Category),
    DeleteCategory(String),
    SetLoading(bool),
}

impl Action {
    /// The collection this action rewrites, if any.
    pub fn collection(&self) -> Option<Collection> {
        use Action::*;
        match self {
            SetTransactions(_) | AddTransaction(_) | UpdateTransaction(_) | DeleteTransaction(_) => {
                Some(Collection::Transactions)
            }
            SetSubscriptions(_) | AddSubscription(_) | UpdateSubscription(_) | DeleteSubscription(_) => {
                Some(Collection::Subscriptions)
            }
            SetBudgets(_) | AddBudget(_) | UpdateBudget(_) | DeleteBudget(_) => Some(Collection::Budgets),
            SetCategories(_) | AddCategory(_) | UpdateCategory(_) | DeleteCategory(_) => {
                Some(Collection::Categories)
            }
            SetLoading(_) => None,
        }
    }
}

fn replace_by_id<T, F>(items: &mut [T], replacement: T, id_of: F)
where
    F: Fn(&T) -> &str,
{
    if let Some(i) = items.iter().position(|it| id_of(it) == id_of(&replacement)) {
        items[i] = replacement;
    }
}

/// Applies `action` to `state` and returns the new state.
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::SetTransactions(items) => state.transactions = items,
        Action::AddTransaction(t) => state.transactions.push(t),
        Action::UpdateTransaction(t) => replace_by_id(&mut state.transactions, t, |t| t.id.as_str()),
        Action::DeleteTransaction(id) => state.transactions.retain(|t| t.id != id),

        Action::SetSubscriptions(items) => state.subscriptions = items,
        Action::AddSubscription(s) => state.subscriptions.push(s),
        Action::UpdateSubscription(s) => replace_by_id(&mut state.subscriptions, s, |s| s.id.as_str()),
        Action::DeleteSubscription(id) => state.subscriptions.retain(|s| s.id != id),

        Action::SetBudgets(items) => state.budgets = items,
        Action::AddBudget(mut b) => {
            b.allocated_amount.get_or_insert(Decimal::ZERO);
            b.spent_amount.get_or_insert(Decimal::ZERO);
            state.budgets.push(b);
        }
        Action::UpdateBudget(mut b) => {
            if let Some(slot) = state.budgets.iter_mut().find(|old| old.id == b.id) {
                // older records may lack the legacy fields
                b.allocated_amount = b.allocated_amount.or(slot.allocated_amount).or(Some(Decimal::ZERO));
                b.spent_amount = b.spent_amount.or(slot.spent_amount).or(Some(Decimal::ZERO));
                *slot = b;
            }
        }
        Action::DeleteBudget(id) => state.budgets.retain(|b| b.id != id),

        Action::SetCategories(items) => state.categories = items,
        Action::AddCategory(c) => state.categories.push(c),
        Action::UpdateCategory(c) => replace_by_id(&mut state.categories, c, |c| c.id.as_str()),
        Action::DeleteCategory(id) => state.categories.retain(|c| c.id != id),

        Action::SetLoading(loading) => state.is_loading = loading,
    }
    state
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// How many records point at a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub transactions: usize,
    pub subscriptions: usize,
    pub budgets: usize,
}

impl CategoryUsage {
    pub fn is_unused(&self) -> bool {
        self.transactions == 0 && self.subscriptions == 0 && self.budgets == 0
    }
}

/// A record whose category id resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanRef {
    pub kind: &'static str,
    pub id: String,
    pub name: String,
    pub category_id: String,
}

/// Owns the application state for one session.
pub struct Store {
    state: AppState,
    storage: Arc<Mutex<Storage>>,
    writer: WriteBackWorker,
}

impl Store {
    /// Creates an empty store in the loading state. Call [`Store::load`]
    /// to populate it.
    pub fn new(storage: Storage, write_retries: u32) -> Self {
        let storage = Arc::new(Mutex::new(storage));
        let writer = WriteBackWorker::spawn(Arc::clone(&storage), write_retries);
        Self {
            state: AppState::default(),
            storage,
            writer,
        }
    }

    /// [`Store::new`] followed by [`Store::load`].
    pub fn open(storage: Storage, write_retries: u32) -> Self {
        let mut store = Self::new(storage, write_retries);
        store.load();
        store
    }

    /// Reads the four collections from storage in order and clears the
    /// loading flag. Loaded data is not written back.
    pub fn load(&mut self) {
        self.apply(Action::SetLoading(true));
        // pending writes must land before we read the collections back
        self.writer.flush();
        let (transactions, subscriptions, budgets, categories) = {
            let mut storage = lock(&self.storage);
            (
                storage.load_transactions(),
                storage.load_subscriptions(),
                storage.load_budgets(),
                storage.load_categories(),
            )
        };
        self.apply(Action::SetTransactions(transactions));
        self.apply(Action::SetSubscriptions(subscriptions));
        self.apply(Action::SetBudgets(budgets));
        self.apply(Action::SetCategories(categories));
        self.apply(Action::SetLoading(false));
        tracing::info!(
            transactions = self.state.transactions.len(),
            subscriptions = self.state.subscriptions.len(),
            budgets = self.state.budgets.len(),
            categories = self.state.categories.len(),
            "loaded state"
        );
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    fn apply(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Applies `action` and queues a write-back of the collection it
    /// touched.
    pub fn dispatch(&mut self, action: Action) {
        let touched = action.collection();
        self.apply(action);
        if let Some(collection) = touched {
            self.schedule(collection);
        }
    }

    fn schedule(&self, collection: Collection) {
        let snapshot = match collection {
            Collection::Transactions => Snapshot::Transactions(self.state.transactions.clone()),
            Collection::Subscriptions => Snapshot::Subscriptions(self.state.subscriptions.clone()),
            Collection::Budgets => Snapshot::Budgets(self.state.budgets.clone()),
            Collection::Categories => Snapshot::Categories(self.state.categories.clone()),
            Collection::Notifications => return,
        };
        self.writer.submit(snapshot);
    }

    pub fn add_transaction(&mut self, draft: NewTransaction) -> Result<Transaction, StoreError> {
        draft.validate()?;
        let t = draft.with_id(new_id());
        self.dispatch(Action::AddTransaction(t.clone()));
        Ok(t)
    }

    /// Replaces the transaction with the same id. Unknown ids are ignored.
    pub fn update_transaction(&mut self, t: Transaction) -> Result<(), StoreError> {
        t.validate()?;
        self.dispatch(Action::UpdateTransaction(t));
        Ok(())
    }

    pub fn delete_transaction(&mut self, id: &str) {
        self.dispatch(Action::DeleteTransaction(id.to_string()));
    }

    pub fn add_subscription(&mut self, draft: NewSubscription) -> Result<Subscription, StoreError> {
        draft.validate()?;
        let s = draft.with_id(new_id());
        self.dispatch(Action::AddSubscription(s.clone()));
        Ok(s)
    }

    pub fn update_subscription(&mut self, s: Subscription) -> Result<(), StoreError> {
        s.validate()?;
        self.dispatch(Action::UpdateSubscription(s));
        Ok(())
    }

    pub fn delete_subscription(&mut self, id: &str) {
        self.dispatch(Action::DeleteSubscription(id.to_string()));
    }

    /// Adds a budget. Missing legacy amounts are stored as zero.
    pub fn add_budget(&mut self, draft: NewBudget) -> Result<Budget, StoreError> {
        draft.validate()?;
        let mut b = draft.with_id(new_id());
        b.allocated_amount.get_or_insert(Decimal::ZERO);
        b.spent_amount.get_or_insert(Decimal::ZERO);
        self.dispatch(Action::AddBudget(b.clone()));
        Ok(b)
    }

    pub fn update_budget(&mut self, b: Budget) -> Result<(), StoreError> {
        b.validate()?;
        self.dispatch(Action::UpdateBudget(b));
        Ok(())
    }

    pub fn delete_budget(&mut self, id: &str) {
        self.dispatch(Action::DeleteBudget(id.to_string()));
    }

    pub fn add_category(&mut self, draft: NewCategory) -> Result<Category, StoreError> {
        draft.validate()?;
        let c = draft.with_id(new_id());
        self.dispatch(Action::AddCategory(c.clone()));
        Ok(c)
    }

    pub fn update_category(&mut self, c: Category) -> Result<(), StoreError> {
        c.validate()?;
        self.dispatch(Action::UpdateCategory(c));
        Ok(())
    }

    /// Removes the category without touching records that reference it.
    pub fn delete_category(&mut self, id: &str) {
        self.dispatch(Action::DeleteCategory(id.to_string()));
    }

    pub fn category_usage(&self, id: &str) -> CategoryUsage {
        CategoryUsage {
            transactions: self.state.transactions.iter().filter(|t| t.category_id == id).count(),
            subscriptions: self.state.subscriptions.iter().filter(|s| s.category_id == id).count(),
            budgets: self
                .state
                .budgets
                .iter()
                .filter(|b| b.category_id.as_deref() == Some(id))
                .count(),
        }
    }

    /// Deletes the category only when nothing references it.
    pub fn delete_category_checked(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.state.categories.iter().any(|c| c.id == id) {
            return Err(StoreError::NotFound {
                kind: "category",
                id: id.to_string(),
            });
        }
        let usage = self.category_usage(id);
        if !usage.is_unused() {
            return Err(StoreError::CategoryInUse {
                id: id.to_string(),
                transactions: usage.transactions,
                subscriptions: usage.subscriptions,
                budgets: usage.budgets,
            });
        }
        self.delete_category(id);
        Ok(())
    }

    /// Records pointing at categories that no longer exist.
    pub fn orphaned_references(&self) -> Vec<OrphanRef> {
        let known = |id: &str| self.state.categories.iter().any(|c| c.id == id);
        let mut out = Vec::new();
        for t in self.state.transactions.iter().filter(|t| !known(&t.category_id)) {
            out.push(OrphanRef {
                kind: "transaction",
                id: t.id.clone(),
                name: t.description.clone(),
                category_id: t.category_id.clone(),
            });
        }
        for s in self.state.subscriptions.iter().filter(|s| !known(&s.category_id)) {
            out.push(OrphanRef {
                kind: "subscription",
                id: s.id.clone(),
                name: s.name.clone(),
                category_id: s.category_id.clone(),
            });
        }
        for b in &self.state.budgets {
            if let Some(cat) = b.category_id.as_deref().filter(|c| !c.is_empty() && !known(c)) {
                out.push(OrphanRef {
                    kind: "budget",
                    id: b.id.clone(),
                    name: b.name.clone(),
                    category_id: cat.to_string(),
                });
            }
        }
        out
    }

    /// Replaces each collection present in `bundle` and returns which ones
    /// were replaced.
    pub fn apply_import(&mut self, bundle: ImportBundle) -> Vec<Collection> {
        let mut replaced = Vec::new();
        if let Some(items) = bundle.transactions {
            self.dispatch(Action::SetTransactions(items));
            replaced.push(Collection::Transactions);
        }
        if let Some(items) = bundle.subscriptions {
            self.dispatch(Action::SetSubscriptions(items));
            replaced.push(Collection::Subscriptions);
        }
        if let Some(items) = bundle.budgets {
            self.dispatch(Action::SetBudgets(items));
            replaced.push(Collection::Budgets);
        }
        if let Some(items) = bundle.categories {
            self.dispatch(Action::SetCategories(items));
            replaced.push(Collection::Categories);
        }
        replaced
    }

    /// Waits for queued write-backs to finish.
    pub fn flush(&self) {
        self.writer.flush();
    }

    /// Number of write-backs that failed after all retries.
    pub fn write_failures(&self) -> u64 {
        self.writer.stats().failed
    }

    pub fn last_write_error(&self) -> Option<String> {
        self.writer.stats().last_error
    }
}
