// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Whole-collection mirror of application state.
//!
//! Every collection is read in full and written in full. The `load_*` and
//! `save_*` helpers never fail: errors are logged and reads degrade to an
//! empty collection. Callers that need to know about failures use
//! [`Storage::try_load_all`] and [`Storage::try_save_all`].

use rusqlite::{params, Connection};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::db::{self, Collection};
use crate::defaults::default_categories;
use crate::error::DbError;
use crate::models::{Budget, Category, Notification, Subscription, Transaction};

/// A record that lives in one of the mirrored collections.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
}

impl Record for Transaction {
    const COLLECTION: Collection = Collection::Transactions;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Subscription {
    const COLLECTION: Collection = Collection::Subscriptions;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Budget {
    const COLLECTION: Collection = Collection::Budgets;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Category {
    const COLLECTION: Collection = Collection::Categories;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Notification {
    const COLLECTION: Collection = Collection::Notifications;

    fn id(&self) -> &str {
        &self.id
    }
}

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Ok(Self::new(db::open_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Reads every record in `T`'s collection, in insertion order.
    pub fn try_load_all<T: Record>(&self) -> Result<Vec<T>, DbError> {
        let collection = T::COLLECTION.table();
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, data FROM {collection} ORDER BY rowid"))?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;

        let mut out = Vec::new();
        for row in rows {
            let (id, data) = row?;
            let record = serde_json::from_str(&data).map_err(|source| DbError::Decode {
                collection,
                id,
                source,
            })?;
            out.push(record);
        }
        Ok(out)
    }

    /// Replaces the collection with `items`: clear, then insert all, inside
    /// one transaction. Readers see either the old or the new contents.
    pub fn try_save_all<T: Record>(&mut self, items: &[T]) -> Result<(), DbError> {
        let collection = T::COLLECTION.table();
        let tx = self.conn.transaction()?;
        tx.execute(&format!("DELETE FROM {collection}"), [])?;
        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {collection}(id, data) VALUES (?1, ?2)"))?;
            for item in items {
                let data = serde_json::to_string(item)
                    .map_err(|source| DbError::Encode { collection, source })?;
                stmt.execute(params![item.id(), data])?;
            }
        }
        tx.commit()?;
        tracing::debug!(collection, count = items.len(), "saved collection");
        Ok(())
    }

    /// Like [`Storage::try_load_all`], but failures are logged and read as
    /// an empty collection.
    pub fn load_all<T: Record>(&self) -> Vec<T> {
        match self.try_load_all() {
            Ok(items) => items,
            Err(err) => {
                tracing::error!(collection = T::COLLECTION.table(), error = %err, "failed to load collection");
                Vec::new()
            }
        }
    }

    /// Like [`Storage::try_save_all`], but failures are logged and dropped.
    pub fn save_all<T: Record>(&mut self, items: &[T]) {
        if let Err(err) = self.try_save_all(items) {
            tracing::error!(collection = T::COLLECTION.table(), error = %err, "failed to save collection");
        }
    }

    pub fn load_transactions(&self) -> Vec<Transaction> {
        self.load_all()
    }

    pub fn save_transactions(&mut self, items: &[Transaction]) {
        self.save_all(items)
    }

    pub fn load_subscriptions(&self) -> Vec<Subscription> {
        self.load_all()
    }

    pub fn save_subscriptions(&mut self, items: &[Subscription]) {
        self.save_all(items)
    }

    pub fn load_budgets(&self) -> Vec<Budget> {
        self.load_all()
    }

    pub fn save_budgets(&mut self, items: &[Budget]) {
        self.save_all(items)
    }

    /// Loads categories, seeding and persisting the defaults when the
    /// collection is empty.
    ///
    /// A failed read is not treated as empty, so it never overwrites the
    /// stored categories with the seed.
    pub fn load_categories(&mut self) -> Vec<Category> {
        let categories: Vec<Category> = match self.try_load_all() {
            Ok(items) => items,
            Err(err) => {
                tracing::error!(collection = "categories", error = %err, "failed to load collection");
                return Vec::new();
            }
        };
        if !categories.is_empty() {
            return categories;
        }
        let seeded = default_categories();
        tracing::info!(count = seeded.len(), "seeding default categories");
        self.save_categories(&seeded);
        seeded
    }

    pub fn save_categories(&mut self, items: &[Category]) {
        self.save_all(items)
    }

    pub fn load_notifications(&self) -> Vec<Notification> {
        self.load_all()
    }

    pub fn save_notifications(&mut self, items: &[Notification]) {
        self.save_all(items)
    }
}
