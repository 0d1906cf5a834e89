// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, KNOWN_KEYS};
use crate::error::FinsightError;
use crate::utils::{maybe_print_json, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Serialize)]
struct SettingRow {
    key: &'static str,
    value: String,
    is_default: bool,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = required(sub, "key")?.trim();
            let value = match config::get(conn, key)? {
                Some(v) => v,
                None => config::default_value(key)
                    .ok_or_else(|| FinsightError::UnknownSetting(key.to_string()))?,
            };
            println!("{}", value);
        }
        Some(("set", sub)) => {
            let key = required(sub, "key")?.trim();
            let value = required(sub, "value")?;
            config::set(conn, key, value)?;
            println!("Set {} = {}", key, value.trim());
        }
        Some(("list", sub)) => {
            let mut data = Vec::new();
            for key in KNOWN_KEYS {
                let stored = config::get(conn, key)?;
                data.push(SettingRow {
                    key,
                    is_default: stored.is_none(),
                    value: stored.or_else(|| config::default_value(key)).unwrap_or_default(),
                });
            }
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|r| {
                        let src = if r.is_default { "default" } else { "set" };
                        vec![r.key.to_string(), r.value, src.to_string()]
                    })
                    .collect();
                println!("{}", pretty_table(&["Key", "Value", "Source"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
