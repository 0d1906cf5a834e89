// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::models::{InvestmentPatch, NewInvestment, RecordKind};
use crate::portfolio::summarize_investments;
use crate::session::Session;
use crate::store;
use crate::utils::{maybe_print_json, parse_amount, parse_decimal, pretty_table, required};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("edit", sub)) => edit(conn, session, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("Missing --id")?;
            store::delete_record(conn, session, RecordKind::Investment, id)?;
            println!("Deleted investment {}", id);
        }
        Some(("summary", sub)) => summary(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn opt(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name).map(|s| s.trim().to_string())
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let invested_raw = required(sub, "amount_invested")?;
    let current_raw = required(sub, "current_value")?;
    let inv = NewInvestment {
        asset_type: required(sub, "asset_type")?.trim().to_string(),
        symbol: opt(sub, "symbol"),
        amount_invested: parse_amount(invested_raw)
            .with_context(|| format!("Invalid invested amount '{}'", invested_raw))?,
        current_value: parse_decimal(current_raw)
            .with_context(|| format!("Invalid current value '{}'", current_raw))?,
        date: opt(sub, "date"),
        notes: opt(sub, "notes"),
    };
    let id = store::add_investment(conn, session, &inv, &settings.utc_offset)?;
    println!(
        "Recorded investment #{}: {} in {}",
        id,
        settings.money(&inv.amount_invested),
        inv.asset_type
    );
    Ok(())
}

fn edit(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("Missing --id")?;
    let patch = InvestmentPatch {
        asset_type: opt(sub, "asset_type"),
        symbol: opt(sub, "symbol"),
        amount_invested: opt(sub, "amount_invested")
            .map(|s| parse_amount(&s))
            .transpose()?,
        current_value: opt(sub, "current_value")
            .map(|s| parse_decimal(&s))
            .transpose()?,
        date: opt(sub, "date"),
        notes: opt(sub, "notes"),
    };
    store::update_investment(conn, session, id, &patch)?;
    println!("Updated investment {}", id);
    Ok(())
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = store::list_investments(conn, session, sub.get_one::<usize>("limit").copied())?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let settings = Settings::load(conn)?;
        let rows = data
            .iter()
            .map(|i| {
                vec![
                    i.id.to_string(),
                    i.date.clone(),
                    i.asset_type.clone(),
                    i.symbol.clone().unwrap_or_default(),
                    settings.money(&i.amount_invested),
                    settings.money(&i.current_value),
                    settings.money(&(i.current_value - i.amount_invested)),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Symbol", "Invested", "Value", "Gain"],
                rows
            )
        );
    }
    Ok(())
}

fn summary(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let investments = store::list_investments(conn, session, None)?;
    let s = summarize_investments(&investments);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let settings = Settings::load(conn)?;
    let mut rows: Vec<Vec<String>> = s
        .by_asset_type
        .iter()
        .map(|r| {
            vec![
                r.asset_type.clone(),
                r.positions.to_string(),
                settings.money(&r.invested),
                settings.money(&r.current_value),
                settings.money(&r.gain),
            ]
        })
        .collect();
    rows.push(vec![
        "TOTAL".into(),
        investments.len().to_string(),
        settings.money(&s.total_invested),
        settings.money(&s.total_current_value),
        format!("{} ({}%)", settings.money(&s.gain), s.gain_pct),
    ]);
    println!(
        "{}",
        pretty_table(&["Asset type", "Positions", "Invested", "Value", "Gain"], rows)
    );
    Ok(())
}
