// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistent settings kept in the `settings` table.

use chrono::{FixedOffset, Offset, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::analytics::{AnalyticsConfig, DEFAULT_TOP_LIMIT};
use crate::error::{FinsightError, Result};
use crate::utils::parse_offset;

pub const KEY_UTC_OFFSET: &str = "utc_offset";
pub const KEY_TOP_LIMIT: &str = "top_limit";
pub const KEY_CURRENCY_SYMBOL: &str = "currency_symbol";

pub const KNOWN_KEYS: [&str; 3] = [KEY_UTC_OFFSET, KEY_TOP_LIMIT, KEY_CURRENCY_SYMBOL];

const DEFAULT_UTC_OFFSET: &str = "+00:00";
const DEFAULT_CURRENCY_SYMBOL: &str = "$";

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    #[serde(serialize_with = "serialize_offset")]
    pub utc_offset: FixedOffset,
    pub top_limit: usize,
    pub currency_symbol: String,
}

fn serialize_offset<S: serde::Serializer>(
    o: &FixedOffset,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&o.to_string())
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            utc_offset: Utc.fix(),
            top_limit: DEFAULT_TOP_LIMIT,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Settings::default();
        if let Some(v) = get(conn, KEY_UTC_OFFSET)? {
            s.utc_offset = parse_offset(&v)?;
        }
        if let Some(v) = get(conn, KEY_TOP_LIMIT)? {
            s.top_limit = parse_limit(&v)?;
        }
        if let Some(v) = get(conn, KEY_CURRENCY_SYMBOL)? {
            s.currency_symbol = v;
        }
        Ok(s)
    }

    pub fn analytics(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            utc_offset: self.utc_offset,
            top_limit: self.top_limit,
        }
    }

    pub fn money(&self, d: &rust_decimal::Decimal) -> String {
        crate::utils::fmt_money(d, &self.currency_symbol)
    }
}

fn parse_limit(v: &str) -> Result<usize> {
    match v.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(FinsightError::InvalidSetting {
            key: KEY_TOP_LIMIT.to_string(),
            value: v.to_string(),
        }),
    }
}

pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

/// Validates `value` for `key` before writing it.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        KEY_UTC_OFFSET => {
            parse_offset(value)?;
        }
        KEY_TOP_LIMIT => {
            parse_limit(value)?;
        }
        KEY_CURRENCY_SYMBOL => {}
        other => return Err(FinsightError::UnknownSetting(other.to_string())),
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn default_value(key: &str) -> Option<String> {
    match key {
        KEY_UTC_OFFSET => Some(DEFAULT_UTC_OFFSET.to_string()),
        KEY_TOP_LIMIT => Some(DEFAULT_TOP_LIMIT.to_string()),
        KEY_CURRENCY_SYMBOL => Some(DEFAULT_CURRENCY_SYMBOL.to_string()),
        _ => None,
    }
}
