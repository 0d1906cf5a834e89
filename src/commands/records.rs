// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::models::{NewRecord, RecordKind, RecordPatch, StoredRecord, DEFAULT_CATEGORY};
use crate::session::Session;
use crate::store::{self, RecordFilter};
use crate::utils::{maybe_print_json, parse_amount, pretty_table, required};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, kind, sub)?,
        Some(("list", sub)) => list(conn, session, kind, sub)?,
        Some(("edit", sub)) => edit(conn, session, kind, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("Missing --id")?;
            store::delete_record(conn, session, kind, id)?;
            println!("Deleted {} {}", kind, id);
        }
        _ => {}
    }
    Ok(())
}

fn opt(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name).map(|s| s.trim().to_string())
}

fn add(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let settings = Settings::load(conn)?;
    let amount_raw = required(sub, "amount")?;
    let rec = NewRecord {
        label: required(sub, "label")?.trim().to_string(),
        amount: parse_amount(amount_raw)
            .with_context(|| format!("Invalid {} amount '{}'", kind, amount_raw))?,
        category: opt(sub, "category"),
        date: opt(sub, "date"),
        notes: opt(sub, "notes"),
    };
    let id = store::add_record(conn, session, kind, &rec, &settings.utc_offset)?;
    println!(
        "Recorded {} #{}: {} '{}'",
        kind,
        id,
        settings.money(&rec.amount),
        rec.label
    );
    Ok(())
}

fn edit(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("Missing --id")?;
    let amount = match opt(sub, "amount") {
        Some(a) => Some(parse_amount(&a)?),
        None => None,
    };
    let patch = RecordPatch {
        label: opt(sub, "label"),
        amount,
        category: opt(sub, "category"),
        date: opt(sub, "date"),
        notes: opt(sub, "notes"),
    };
    if patch.is_empty() {
        println!("Nothing to change for {} {}", kind, id);
        return Ok(());
    }
    store::update_record(conn, session, kind, id, &patch)?;
    println!("Updated {} {}", kind, id);
    Ok(())
}

pub fn filter_from(sub: &clap::ArgMatches, settings: &Settings) -> RecordFilter {
    RecordFilter {
        month: opt(sub, "month"),
        category: opt(sub, "category"),
        limit: sub.get_one::<usize>("limit").copied(),
        utc_offset: Some(settings.utc_offset),
    }
}

fn list(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let settings = Settings::load(conn)?;
    let data = store::list_records(conn, session, kind, &filter_from(sub, &settings))?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let header = match kind {
            RecordKind::Income => "Source",
            _ => "Title",
        };
        let rows = data.iter().map(|r| row(r, &settings)).collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", header, "Category", "Amount", "Notes"], rows)
        );
    }
    Ok(())
}

fn row(r: &StoredRecord, settings: &Settings) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.date.clone(),
        r.label.clone(),
        r.category.clone().unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        settings.money(&r.amount),
        r.notes.clone().unwrap_or_default(),
    ]
}
