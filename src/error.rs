// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types shared by the library. The CLI wraps these in `anyhow`.

use chrono::NaiveDate;

/// A record failed validation and must not be stored.
///
/// Messages are phrased for the person entering the data, since they are
/// shown verbatim by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("{0} is required")]
    Required(&'static str),

    /// Amounts must be strictly positive.
    #[error("Please enter a valid amount (must be greater than zero)")]
    InvalidAmount,

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("invalid color '{0}', expected #rgb or #rrggbb")]
    InvalidColor(String),

    /// A string did not name any variant of an enumerated field.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Failures opening or migrating the embedded database.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("failed to create data dir {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: i64,
        latest_supported: i64,
    },

    #[error("could not encode record for {collection}: {source}")]
    Encode {
        collection: &'static str,
        source: serde_json::Error,
    },

    #[error("could not decode record {id} in {collection}: {source}")]
    Decode {
        collection: &'static str,
        id: String,
        source: serde_json::Error,
    },
}

/// Errors surfaced to the caller when storing receipt images.
///
/// Unlike collection writes these are not swallowed: the person uploading a
/// receipt needs to know it was not kept.
#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    #[error("Error reading file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("File too large ({size} characters, limit {limit}). Please choose a smaller image.")]
    TooLarge { size: usize, limit: usize },

    #[error("Storage is full. Try clearing some data or using smaller images.")]
    StorageFull,

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for ReceiptError {
    fn from(err: rusqlite::Error) -> Self {
        if is_disk_full(&err) {
            ReceiptError::StorageFull
        } else {
            ReceiptError::Db(DbError::Sqlite(err))
        }
    }
}

pub(crate) fn is_disk_full(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::DiskFull
    )
}

/// A bulk import file could not be used. Nothing is replaced in that case.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Error importing data. Please check the file format: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Error importing data: the file must contain a JSON object")]
    NotAnObject,
}

/// Errors raised by [`crate::state::Store`] operations that refuse to act.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(
        "category '{id}' is still used by {transactions} transaction(s), {subscriptions} subscription(s) and {budgets} budget(s)"
    )]
    CategoryInUse {
        id: String,
        transactions: usize,
        subscriptions: usize,
        budgets: usize,
    },

    #[error("no {kind} with id '{id}'")]
    NotFound { kind: &'static str, id: String },
}
