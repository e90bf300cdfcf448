// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! String-keyed store for receipt images, kept as base64 data URLs.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::{DEFAULT_RECEIPT_LIMIT, DEFAULT_RECEIPT_QUOTA};
use crate::db;
use crate::error::{DbError, ReceiptError};

pub const KEY_PREFIX: &str = "receipt_";

pub struct ReceiptStore {
    conn: Connection,
    limit: usize,
    quota: usize,
}

impl ReceiptStore {
    pub fn new(conn: Connection, limit: usize, quota: usize) -> Self {
        Self { conn, limit, quota }
    }

    pub fn open(path: &Path, limit: usize, quota: usize) -> Result<Self, DbError> {
        Ok(Self::new(db::open_receipts(path)?, limit, quota))
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Ok(Self::new(
            db::open_receipts_in_memory()?,
            DEFAULT_RECEIPT_LIMIT,
            DEFAULT_RECEIPT_QUOTA,
        ))
    }

    /// Reads the file at `path`, stores it and returns its key.
    pub fn store_file(&self, path: &Path) -> Result<String, ReceiptError> {
        let bytes = fs::read(path).map_err(|source| ReceiptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "receipt".to_string());
        self.store(&name, &bytes)
    }

    /// Stores `bytes` under a key derived from the current time and
    /// `file_name`.
    pub fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, ReceiptError> {
        let data_url = to_data_url(file_name, bytes);
        if data_url.len() > self.limit {
            return Err(ReceiptError::TooLarge {
                size: data_url.len(),
                limit: self.limit,
            });
        }

        let used: i64 = self.conn.query_row(
            "SELECT IFNULL(SUM(LENGTH(data_url)), 0) FROM receipts",
            [],
            |r| r.get(0),
        )?;
        if used as usize + data_url.len() > self.quota {
            tracing::warn!(used, quota = self.quota, "receipt store is full");
            return Err(ReceiptError::StorageFull);
        }

        let key = self.unused_key(file_name)?;
        self.conn.execute(
            "INSERT INTO receipts(key, data_url) VALUES (?1, ?2)",
            params![key, data_url],
        )?;
        tracing::info!(%key, size = data_url.len(), "stored receipt");
        Ok(key)
    }

    // Two uploads of the same name inside one millisecond would collide;
    // bump the timestamp until the key is free.
    fn unused_key(&self, file_name: &str) -> Result<String, ReceiptError> {
        let mut ts = Utc::now().timestamp_millis();
        loop {
            let key = format!("{KEY_PREFIX}{ts}_{file_name}");
            if self.retrieve(&key)?.is_none() {
                return Ok(key);
            }
            ts += 1;
        }
    }

    pub fn retrieve(&self, key: &str) -> Result<Option<String>, ReceiptError> {
        let v = self
            .conn
            .query_row("SELECT data_url FROM receipts WHERE key=?1", params![key], |r| r.get(0))
            .optional()?;
        Ok(v)
    }

    /// Removes the entry. Unknown keys are ignored.
    pub fn delete(&self, key: &str) -> Result<(), ReceiptError> {
        self.conn.execute("DELETE FROM receipts WHERE key=?1", params![key])?;
        Ok(())
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

pub fn to_data_url(file_name: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(file_name), STANDARD.encode(bytes))
}

/// Decodes a data URL produced by [`to_data_url`].
pub fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let (_, payload) = data_url.split_once(";base64,")?;
    STANDARD.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_round_trips_bytes() {
        let url = to_data_url("scan.PNG", b"\x89PNG fake");
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), b"\x89PNG fake");
    }

    #[test]
    fn keys_are_unique_for_same_name() {
        let store = ReceiptStore::open_in_memory().unwrap();
        let a = store.store("r.jpg", b"a").unwrap();
        let b = store.store("r.jpg", b"b").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with(KEY_PREFIX) && a.ends_with("_r.jpg"));
    }
}
