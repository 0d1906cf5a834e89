// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::FinsightError;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Reads a required clap argument, turning absence into an error.
pub fn required<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    sub.get_one::<String>(name)
        .with_context(|| format!("Missing required argument '--{}'", name))
}

/// Calendar date of `raw` as seen in `offset`.
///
/// Timestamps carrying their own offset are converted into `offset`; naive
/// dates and datetimes are taken to already be local to it.
pub fn local_date(raw: &str, offset: &FixedOffset) -> Result<NaiveDate, FinsightError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(offset).date_naive());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| FinsightError::InvalidDate(raw.to_string()))
}

/// Validates a user supplied timestamp and returns it trimmed, ready to store.
pub fn parse_date(s: &str) -> Result<String, FinsightError> {
    let utc = Utc.fix();
    local_date(s, &utc)?;
    Ok(s.trim().to_string())
}

/// Today in `offset`, formatted `YYYY-MM-DD`.
pub fn today(offset: &FixedOffset) -> String {
    Utc::now().with_timezone(offset).format("%Y-%m-%d").to_string()
}

/// First day of a `YYYY-MM` month.
pub fn parse_month(s: &str) -> Result<NaiveDate, FinsightError> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .map_err(|_| FinsightError::InvalidMonth(s.to_string()))
}

pub fn parse_decimal(s: &str) -> Result<Decimal, FinsightError> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| FinsightError::InvalidAmount(s.to_string()))
}

/// Parses an amount that must be strictly positive.
pub fn parse_amount(s: &str) -> Result<Decimal, FinsightError> {
    let d = parse_decimal(s)?;
    if d <= Decimal::ZERO {
        return Err(FinsightError::InvalidAmount(s.to_string()));
    }
    Ok(d)
}

/// Parses `+HH:MM`, `-HH:MM`, `+HHMM`, `Z` or `UTC`.
pub fn parse_offset(s: &str) -> Result<FixedOffset, FinsightError> {
    let t = s.trim();
    if t.eq_ignore_ascii_case("z") || t.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    let err = || FinsightError::InvalidOffset(s.to_string());
    let (sign, rest) = match t.as_bytes().first() {
        Some(b'+') => (1, &t[1..]),
        Some(b'-') => (-1, &t[1..]),
        _ => return Err(err()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| err())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| err())?;
    if hours > 23 || minutes > 59 {
        return Err(err());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(err)
}

/// One decimal place, midpoint away from zero.
pub fn round1(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100` to one decimal, 0 when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round1(part / whole * Decimal::ONE_HUNDRED)
}

pub fn fmt_money(d: &Decimal, symbol: &str) -> String {
    let r = d.round_dp(2);
    if r.is_sign_negative() && !r.is_zero() {
        format!("-{}{:.2}", symbol, r.abs())
    } else {
        format!("{}{:.2}", symbol, r.abs())
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
        // If v is an array, stream each element; else stream single line
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
