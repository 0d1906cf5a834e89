// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{RecordKind, StoredRecord};
use crate::session::Session;
use crate::store::{self, RecordFilter};
use crate::utils::required;
use anyhow::{anyhow, Result};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("records", sub)) => {
            let fmt = required(sub, "format")?.to_lowercase();
            let out = required(sub, "out")?;
            let n = export_records(conn, session, &fmt, out)?;
            println!("Exported {} record(s) to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes every income and expense of the user, oldest first.
pub fn export_records(
    conn: &Connection,
    session: &Session,
    fmt: &str,
    out: &str,
) -> Result<usize> {
    let all = RecordFilter::default();
    let mut records: Vec<StoredRecord> =
        store::list_records(conn, session, RecordKind::Income, &all)?;
    records.extend(store::list_records(conn, session, RecordKind::Expense, &all)?);
    records.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["kind", "date", "label", "amount", "category", "notes"])?;
            for r in &records {
                wtr.write_record([
                    r.kind.as_str(),
                    r.date.as_str(),
                    r.label.as_str(),
                    r.amount.to_string().as_str(),
                    r.category.as_deref().unwrap_or_default(),
                    r.notes.as_deref().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = records
                .iter()
                .map(|r| {
                    json!({
                        "kind": r.kind, "date": r.date, "label": r.label, "amount": r.amount,
                        "category": r.category, "notes": r.notes
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    Ok(records.len())
}
