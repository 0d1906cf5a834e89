// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{
    aggregate, compute_category_totals, compute_headline_totals, compute_monthly_series,
    rank_top_categories, AnalyticsConfig, AnalyticsReport, CategoryTotals, DataIssue,
    HeadlineTotals, MonthlySeries, RankedCategory,
};
use crate::config::Settings;
use crate::session::Session;
use crate::store;
use crate::utils::{maybe_print_json, parse_offset, percent_of, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

const OVERSPENDING_WARNING: &str =
    "⚠ Overspending: your total expenses are higher than your total income!";

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, session, &settings, sub)?,
        Some(("categories", sub)) => categories(conn, session, &settings, sub)?,
        Some(("monthly", sub)) => monthly(conn, session, &settings, sub)?,
        Some(("top", sub)) => top(conn, session, &settings, sub)?,
        Some(("all", sub)) => all(conn, session, &settings, sub)?,
        _ => {}
    }
    Ok(())
}

/// Settings with any per-invocation overrides from `sub` applied.
fn analytics_config(settings: &Settings, sub: &clap::ArgMatches) -> Result<AnalyticsConfig> {
    let mut cfg = settings.analytics();
    if let Ok(Some(raw)) = sub.try_get_one::<String>("utc_offset") {
        cfg.utc_offset = parse_offset(raw)?;
    }
    if let Ok(Some(limit)) = sub.try_get_one::<usize>("limit") {
        cfg.top_limit = *limit;
    }
    Ok(cfg)
}

fn print_left_out(issues: &[DataIssue]) {
    if !issues.is_empty() {
        println!(
            "{} record(s) left out: unreadable amount (see `finsight doctor`)",
            issues.len()
        );
    }
}

fn print_overspending(totals: &HeadlineTotals) {
    if totals.is_overspending() {
        println!("{}", OVERSPENDING_WARNING);
    }
}

fn summary(
    conn: &Connection,
    session: &Session,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let input = store::load_for_analytics(conn, session)?;
    let totals = compute_headline_totals(&input.incomes, &input.expenses);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        return Ok(());
    }
    print_summary(&totals, settings);
    print_left_out(&input.issues);
    Ok(())
}

fn print_summary(totals: &HeadlineTotals, settings: &Settings) {
    print_overspending(totals);
    let rows = vec![
        vec!["Total income".into(), settings.money(&totals.total_income)],
        vec!["Total expense".into(), settings.money(&totals.total_expense)],
        vec!["Total savings".into(), settings.money(&totals.total_savings)],
        vec!["Savings rate".into(), format!("{:.1}%", totals.savings_rate)],
        vec!["Income spent".into(), format!("{:.1}%", totals.spent_share)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
}

fn categories(
    conn: &Connection,
    session: &Session,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let input = store::load_for_analytics(conn, session)?;
    let totals = compute_category_totals(&input.expenses);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        return Ok(());
    }
    print_categories(&totals, settings);
    print_left_out(&input.issues);
    Ok(())
}

fn print_categories(totals: &CategoryTotals, settings: &Settings) {
    let total = totals.total();
    let rows = totals
        .sorted_desc()
        .into_iter()
        .map(|e| {
            vec![
                e.category.clone(),
                settings.money(&e.amount),
                format!("{:.1}%", percent_of(e.amount, total)),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
}

fn monthly(
    conn: &Connection,
    session: &Session,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let cfg = analytics_config(settings, sub)?;
    let input = store::load_for_analytics(conn, session)?;
    let series = compute_monthly_series(&input.incomes, &input.expenses, &cfg.utc_offset);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &series)? {
        return Ok(());
    }
    print_monthly(&series, settings);
    print_left_out(&input.issues);
    if !series.skipped.is_empty() {
        println!(
            "{} record(s) left out: unreadable date (see `finsight doctor`)",
            series.skipped.len()
        );
    }
    Ok(())
}

fn print_monthly(series: &MonthlySeries, settings: &Settings) {
    let rows = (0..series.len())
        .map(|i| {
            vec![
                series.labels[i].clone(),
                settings.money(&series.income[i]),
                settings.money(&series.expense[i]),
                settings.money(&series.savings[i]),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Savings"], rows)
    );
}

fn top(
    conn: &Connection,
    session: &Session,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let cfg = analytics_config(settings, sub)?;
    let input = store::load_for_analytics(conn, session)?;
    let totals = compute_headline_totals(&input.incomes, &input.expenses);
    let ranked = rank_top_categories(
        &compute_category_totals(&input.expenses),
        totals.total_expense,
        totals.total_income,
        cfg.top_limit,
    );
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &ranked)? {
        return Ok(());
    }
    print_top(&ranked, settings);
    print_left_out(&input.issues);
    Ok(())
}

fn print_top(ranked: &[RankedCategory], settings: &Settings) {
    let rows = ranked
        .iter()
        .enumerate()
        .map(|(i, r)| {
            vec![
                format!("#{}", i + 1),
                r.category.clone(),
                settings.money(&r.amount),
                format!("{:.1}%", r.percentage),
                if r.overspend {
                    "⚠ Overspending".to_string()
                } else {
                    String::new()
                },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Rank", "Category", "Spent", "Share", "Flag"], rows)
    );
}

fn all(
    conn: &Connection,
    session: &Session,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let cfg = analytics_config(settings, sub)?;
    let input = store::load_for_analytics(conn, session)?;
    let mut report: AnalyticsReport = aggregate(&input.incomes, &input.expenses, &cfg);
    report.issues.extend(input.issues);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    print_summary(&report.totals, settings);
    print_monthly(&report.monthly, settings);
    print_top(&report.top_categories, settings);
    if !report.issues.is_empty() {
        println!(
            "{} data issue(s) found (see `finsight doctor`)",
            report.issues.len()
        );
    }
    Ok(())
}
