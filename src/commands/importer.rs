// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::models::{NewRecord, RecordKind};
use crate::session::Session;
use crate::store;
use crate::utils::{parse_amount, parse_date, required};
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("records", sub)) => {
            let kind = match sub.get_one::<String>("kind") {
                Some(k) => Some(k.parse::<RecordKind>()?),
                None => None,
            };
            let path = required(sub, "path")?.trim();
            let n = import_records(conn, session, kind, path)?;
            println!("Imported {} record(s) from {}", n, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Column positions taken from the header row.
struct Columns {
    kind: Option<usize>,
    date: Option<usize>,
    label: usize,
    amount: usize,
    category: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        Ok(Columns {
            kind: find("kind"),
            date: find("date"),
            label: find("label")
                .or_else(|| find("source"))
                .or_else(|| find("title"))
                .context("CSV header needs a 'label' column")?,
            amount: find("amount").context("CSV header needs an 'amount' column")?,
            category: find("category"),
            notes: find("notes"),
        })
    }
}

fn check_cash(kind: RecordKind) -> Result<RecordKind> {
    match kind {
        RecordKind::Investment => Err(anyhow!("Only income and expense records can be imported")),
        _ => Ok(kind),
    }
}

/// Loads rows by header name (`kind,date,label,amount,category,notes`, the
/// layout `export records` writes). A `kind` cell decides the row's kind;
/// otherwise `default_kind` does. All rows land or none do.
pub fn import_records(
    conn: &mut Connection,
    session: &Session,
    default_kind: Option<RecordKind>,
    path: &str,
) -> Result<usize> {
    let default_kind = default_kind.map(check_cash).transpose()?;
    let settings = Settings::load(conn)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;
    let cols = Columns::from_headers(rdr.headers()?)?;

    let tx = conn.transaction()?;
    let mut count = 0;
    for (i, result) in rdr.records().enumerate() {
        let line = i + 2;
        let rec = result?;
        let field = |idx: Option<usize>| {
            idx.and_then(|i| rec.get(i))
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        let kind = match field(cols.kind) {
            Some(k) => k
                .parse::<RecordKind>()
                .map_err(anyhow::Error::from)
                .and_then(check_cash)
                .with_context(|| format!("line {}", line))?,
            None => default_kind
                .with_context(|| format!("line {}: no kind column value and no --kind", line))?,
        };
        let date = match field(cols.date) {
            Some(d) => Some(parse_date(&d).with_context(|| format!("line {}", line))?),
            None => None,
        };
        let amount_raw = field(Some(cols.amount)).unwrap_or_default();
        let amount = parse_amount(&amount_raw)
            .with_context(|| format!("Invalid amount '{}' on line {}", amount_raw, line))?;

        let new = NewRecord {
            label: field(Some(cols.label)).unwrap_or_default(),
            amount,
            category: field(cols.category),
            date,
            notes: field(cols.notes),
        };
        store::add_record(&tx, session, kind, &new, &settings.utc_offset)
            .with_context(|| format!("line {}", line))?;
        count += 1;
    }
    tx.commit()?;
    info!(user = %session.user, count, path, "imported records");
    Ok(count)
}
