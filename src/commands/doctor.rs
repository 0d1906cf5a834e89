// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{compute_monthly_series, find_amount_issues, DataIssue};
use crate::config::Settings;
use crate::session::Session;
use crate::store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

/// Rows the analytics cannot read (non-numeric amounts), would correct
/// (negative amounts) or leave out of the monthly series (unreadable dates).
pub fn find_issues(conn: &Connection, session: &Session) -> Result<Vec<DataIssue>> {
    let settings = Settings::load(conn)?;
    let input = store::load_for_analytics(conn, session)?;
    let mut issues = input.issues;
    issues.extend(find_amount_issues(&input.incomes, &input.expenses));
    issues.extend(
        compute_monthly_series(&input.incomes, &input.expenses, &settings.utc_offset).skipped,
    );
    Ok(issues)
}

pub fn handle(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let issues = find_issues(conn, session)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &issues)? {
        return Ok(());
    }
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .iter()
            .map(|i| {
                vec![
                    i.kind.to_string(),
                    match i.id {
                        Some(id) => format!("id {}", id),
                        None => format!("#{}", i.index + 1),
                    },
                    format!("{:?}", i.issue),
                    i.detail.clone(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Kind", "Record", "Issue", "Detail"], rows));
    }
    Ok(())
}
