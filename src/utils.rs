// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::models::DateRange;
use crate::report::ReportPeriod;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parses one of the model enums, keeping its message.
pub fn parse_enum<T>(s: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(s.parse::<T>()?)
}

pub fn opt_date(m: &clap::ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    m.get_one::<String>(name).map(|s| parse_date(s)).transpose()
}

pub fn opt_decimal(m: &clap::ArgMatches, name: &str) -> Result<Option<Decimal>> {
    m.get_one::<String>(name).map(|s| parse_decimal(s)).transpose()
}

pub fn opt_string(m: &clap::ArgMatches, name: &str) -> Option<String> {
    m.get_one::<String>(name).map(|s| s.to_string())
}

/// Reads `--period` or `--from/--to`. Returns `None` when neither is given.
pub fn period_from_args(m: &clap::ArgMatches, today: NaiveDate) -> Result<Option<ReportPeriod>> {
    if let Some(p) = m.get_one::<String>("period") {
        return Ok(Some(parse_enum(p)?));
    }
    match (opt_date(m, "from")?, opt_date(m, "to")?) {
        (None, None) => Ok(None),
        (from, to) => {
            let default = ReportPeriod::default_custom(today).range(today);
            Ok(Some(ReportPeriod::Custom(DateRange::new(
                from.unwrap_or(default.start_date),
                to.unwrap_or(default.end_date),
            ))))
        }
    }
}

/// `out` when it names a file, `out/default_name` when it is a directory,
/// `default_name` in the working directory when absent.
pub fn output_path(out: Option<&String>, default_name: &str) -> PathBuf {
    match out {
        Some(p) if Path::new(p).is_dir() => Path::new(p).join(default_name),
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(default_name),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
