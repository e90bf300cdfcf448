// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analytics;
pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod receipts;
pub mod report;
pub mod state;
pub mod storage;
pub mod utils;
pub mod writeback;
