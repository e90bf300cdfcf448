// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::DbError;

/// Named record collections mirrored to the database, one table each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Transactions,
    Subscriptions,
    Budgets,
    Categories,
    Notifications,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Transactions,
        Collection::Subscriptions,
        Collection::Budgets,
        Collection::Categories,
        Collection::Notifications,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Collection::Transactions => "transactions",
            Collection::Subscriptions => "subscriptions",
            Collection::Budgets => "budgets",
            Collection::Categories => "categories",
            Collection::Notifications => "notifications",
        }
    }
}

struct Migration {
    version: i64,
    sql: &'static str,
}

// Records are stored whole as JSON in `data`. Generated columns expose the
// fields worth indexing without a second copy of the value.
const MAIN_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: r#"
    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        date TEXT GENERATED ALWAYS AS (json_extract(data, '$.date')) VIRTUAL,
        type TEXT GENERATED ALWAYS AS (json_extract(data, '$.type')) VIRTUAL,
        category_id TEXT GENERATED ALWAYS AS (json_extract(data, '$.categoryId')) VIRTUAL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_type ON transactions(type);
    CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

    CREATE TABLE IF NOT EXISTS subscriptions(
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        renewal_date TEXT GENERATED ALWAYS AS (json_extract(data, '$.renewalDate')) VIRTUAL
    );
    CREATE INDEX IF NOT EXISTS idx_subscriptions_renewal ON subscriptions(renewal_date);

    CREATE TABLE IF NOT EXISTS budgets(
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        period TEXT GENERATED ALWAYS AS (json_extract(data, '$.period')) VIRTUAL
    );
    CREATE INDEX IF NOT EXISTS idx_budgets_period ON budgets(period);

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        type TEXT GENERATED ALWAYS AS (json_extract(data, '$.type')) VIRTUAL
    );
    CREATE INDEX IF NOT EXISTS idx_categories_type ON categories(type);

    CREATE TABLE IF NOT EXISTS notifications(
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        date TEXT GENERATED ALWAYS AS (json_extract(data, '$.date')) VIRTUAL,
        is_read INTEGER GENERATED ALWAYS AS (json_extract(data, '$.isRead')) VIRTUAL
    );
    CREATE INDEX IF NOT EXISTS idx_notifications_date ON notifications(date);
    CREATE INDEX IF NOT EXISTS idx_notifications_read ON notifications(is_read);
    "#,
}];

const RECEIPT_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: r#"
    CREATE TABLE IF NOT EXISTS receipts(
        key TEXT PRIMARY KEY,
        data_url TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
}];

/// Schema version of the collections database written by this build.
pub fn schema_version() -> i64 {
    MAIN_MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Opens the collections database at `path`, creating it if needed.
pub fn open_or_init(path: &Path) -> Result<Connection, DbError> {
    let mut conn = open_file(path)?;
    apply_migrations(&mut conn, MAIN_MIGRATIONS)?;
    tracing::info!(path = %path.display(), version = schema_version(), "opened database");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection, DbError> {
    let mut conn = Connection::open_in_memory()?;
    apply_migrations(&mut conn, MAIN_MIGRATIONS)?;
    Ok(conn)
}

/// Opens the receipt blob database. It is a separate file from the
/// collections so large images never bloat collection rewrites.
pub fn open_receipts(path: &Path) -> Result<Connection, DbError> {
    let mut conn = open_file(path)?;
    apply_migrations(&mut conn, RECEIPT_MIGRATIONS)?;
    tracing::info!(path = %path.display(), "opened receipt store");
    Ok(conn)
}

pub fn open_receipts_in_memory() -> Result<Connection, DbError> {
    let mut conn = Connection::open_in_memory()?;
    apply_migrations(&mut conn, RECEIPT_MIGRATIONS)?;
    Ok(conn)
}

fn open_file(path: &Path) -> Result<Connection, DbError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| DbError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;
    }
    let conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

fn apply_migrations(conn: &mut Connection, migrations: &[Migration]) -> Result<(), DbError> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let latest = migrations.last().map_or(0, |m| m.version);
    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for m in migrations.iter().filter(|m| m.version > current) {
        tx.execute_batch(m.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", m.version))?;
    }
    tx.commit()?;
    tracing::debug!(from = current, to = latest, "applied schema migrations");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_has_every_collection_table() {
        let conn = open_in_memory().unwrap();
        for c in Collection::ALL {
            let n: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [c.table()],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(n, 1, "missing table {}", c.table());
        }
        let v: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0)).unwrap();
        assert_eq!(v, schema_version());
    }

    #[test]
    fn newer_schema_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        let err = apply_migrations(&mut conn, MAIN_MIGRATIONS).unwrap_err();
        assert!(matches!(
            err,
            DbError::UnsupportedSchemaVersion { db_version: 99, .. }
        ));
    }

    #[test]
    fn generated_columns_index_json_fields() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO transactions(id, data) VALUES ('t1', ?1)",
            [r#"{"id":"t1","date":"2024-01-02","type":"expense","categoryId":"expense-food"}"#],
        )
        .unwrap();
        let (date, kind, cat): (String, String, String) = conn
            .query_row("SELECT date, type, category_id FROM transactions", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!((date.as_str(), kind.as_str(), cat.as_str()), ("2024-01-02", "expense", "expense-food"));
    }
}
