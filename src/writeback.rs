// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Background persistence of collection snapshots.
//!
//! The store hands each changed collection to a single worker thread and
//! returns immediately. The worker writes snapshots in submission order,
//! keeps only the newest pending snapshot per collection, and retries a
//! failed write a bounded number of times before recording the failure.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::db::Collection;
use crate::error::DbError;
use crate::models::{Budget, Category, Subscription, Transaction};
use crate::storage::Storage;

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Full contents of one collection at the moment it changed.
#[derive(Debug, Clone)]
pub enum Snapshot {
    Transactions(Vec<Transaction>),
    Subscriptions(Vec<Subscription>),
    Budgets(Vec<Budget>),
    Categories(Vec<Category>),
}

impl Snapshot {
    pub fn collection(&self) -> Collection {
        match self {
            Snapshot::Transactions(_) => Collection::Transactions,
            Snapshot::Subscriptions(_) => Collection::Subscriptions,
            Snapshot::Budgets(_) => Collection::Budgets,
            Snapshot::Categories(_) => Collection::Categories,
        }
    }

    fn write(&self, storage: &mut Storage) -> Result<(), DbError> {
        match self {
            Snapshot::Transactions(items) => storage.try_save_all(items),
            Snapshot::Subscriptions(items) => storage.try_save_all(items),
            Snapshot::Budgets(items) => storage.try_save_all(items),
            Snapshot::Categories(items) => storage.try_save_all(items),
        }
    }
}

enum Job {
    Write(Snapshot),
    Flush(Sender<()>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub written: u64,
    pub failed: u64,
    pub last_error: Option<String>,
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // a panic mid-write leaves the data usable; the next save replaces it
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct WriteBackWorker {
    jobs: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
    stats: Arc<Mutex<WriteStats>>,
}

impl WriteBackWorker {
    pub fn spawn(storage: Arc<Mutex<Storage>>, retries: u32) -> Self {
        let (jobs, rx) = mpsc::channel();
        let stats = Arc::new(Mutex::new(WriteStats::default()));
        let worker_stats = Arc::clone(&stats);
        let handle = thread::Builder::new()
            .name("pennywise-writeback".into())
            .spawn(move || run(rx, storage, retries, worker_stats));
        let handle = match handle {
            Ok(h) => Some(h),
            Err(err) => {
                tracing::error!(error = %err, "could not start write-back thread; changes will not be saved");
                None
            }
        };
        Self {
            jobs: Some(jobs),
            handle,
            stats,
        }
    }

    /// Queues `snapshot` for writing. Never blocks.
    pub fn submit(&self, snapshot: Snapshot) {
        let sent = self
            .jobs
            .as_ref()
            .is_some_and(|jobs| jobs.send(Job::Write(snapshot)).is_ok());
        if !sent {
            tracing::error!("write-back worker is gone; dropping snapshot");
            let mut stats = lock(&self.stats);
            stats.failed += 1;
            stats.last_error = Some("write-back worker is not running".to_string());
        }
    }

    /// Blocks until every snapshot submitted so far has been written or has
    /// exhausted its retries.
    pub fn flush(&self) {
        let Some(jobs) = self.jobs.as_ref() else {
            return;
        };
        let (done_tx, done_rx) = mpsc::channel();
        if jobs.send(Job::Flush(done_tx)).is_ok() {
            // an error means the worker exited, so nothing is pending
            let _ = done_rx.recv();
        }
    }

    pub fn stats(&self) -> WriteStats {
        lock(&self.stats).clone()
    }
}

impl Drop for WriteBackWorker {
    fn drop(&mut self) {
        // closing the channel lets the worker drain and exit
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("write-back thread panicked");
            }
        }
    }
}

fn run(rx: Receiver<Job>, storage: Arc<Mutex<Storage>>, retries: u32, stats: Arc<Mutex<WriteStats>>) {
    while let Ok(first) = rx.recv() {
        let mut pending: Vec<Snapshot> = Vec::new();
        let mut waiters: Vec<Sender<()>> = Vec::new();

        let mut next = Some(first);
        while let Some(job) = next {
            match job {
                Job::Write(snapshot) => {
                    match pending.iter_mut().find(|p| p.collection() == snapshot.collection()) {
                        Some(older) => *older = snapshot,
                        None => pending.push(snapshot),
                    }
                }
                Job::Flush(done) => waiters.push(done),
            }
            next = rx.try_recv().ok();
        }

        for snapshot in &pending {
            write_with_retry(snapshot, &storage, retries, &stats);
        }
        for done in waiters {
            let _ = done.send(());
        }
    }
    tracing::debug!("write-back worker stopped");
}

fn write_with_retry(snapshot: &Snapshot, storage: &Mutex<Storage>, retries: u32, stats: &Mutex<WriteStats>) {
    let collection = snapshot.collection().table();
    let mut attempt = 0;
    loop {
        let result = snapshot.write(&mut lock(storage));
        match result {
            Ok(()) => {
                lock(stats).written += 1;
                return;
            }
            Err(err) if attempt < retries => {
                attempt += 1;
                tracing::warn!(collection, attempt, error = %err, "write-back failed, retrying");
                thread::sleep(RETRY_BACKOFF * attempt);
            }
            Err(err) => {
                tracing::error!(collection, attempts = attempt + 1, error = %err, "write-back failed");
                let mut s = lock(stats);
                s.failed += 1;
                s.last_error = Some(format!("{collection}: {err}"));
                return;
            }
        }
    }
}
