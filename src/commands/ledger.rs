// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::session::Session;
use crate::store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = store::ledger(conn, session, sub.get_one::<usize>("limit").copied())?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let settings = Settings::load(conn)?;
        let rows = data
            .iter()
            .map(|e| {
                vec![
                    e.date.clone(),
                    e.kind.to_string(),
                    e.id.to_string(),
                    e.label.clone(),
                    e.category.clone(),
                    settings.money(&e.amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Kind", "ID", "Label", "Category", "Amount"], rows)
        );
    }
    Ok(())
}
