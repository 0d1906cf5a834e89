// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::builder::RangedU64ValueParser;
use clap::{value_parser, Arg, ArgAction, Command};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

fn limit_arg(help: &'static str) -> Arg {
    Arg::new("limit")
        .long("limit")
        .value_parser(value_parser!(usize))
        .help(help)
}

/// `--limit` for rankings; same rule as the `top_limit` setting.
fn top_limit_arg(help: &'static str) -> Arg {
    Arg::new("limit")
        .long("limit")
        .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
        .help(help)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

/// `income` and `expense` share one shape; only the label flag differs.
fn cash_command(name: &'static str, about: &'static str, label: &'static str) -> Command {
    let label_arg = |required: bool| {
        Arg::new("label")
            .long(label)
            .required(required)
            .help("What the money was for / where it came from")
    };
    Command::new(name)
        .about(about)
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record a new entry")
                .arg(label_arg(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("YYYY-MM-DD or RFC 3339 timestamp (default: today)"),
                )
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("list")
                .about("List entries, newest first")
                .arg(
                    Arg::new("month")
                        .long("month")
                        .help("YYYY-MM, in the configured utc_offset"),
                )
                .arg(Arg::new("category").long("category"))
                .arg(limit_arg("Show at most N entries"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("edit")
                .about("Change fields of an entry")
                .arg(id_arg())
                .arg(label_arg(false))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(Command::new("rm").about("Delete an entry").arg(id_arg()))
}

fn invest_command() -> Command {
    Command::new("invest")
        .about("Track investments")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("asset_type").long("asset-type").required(true))
                .arg(Arg::new("symbol").long("symbol"))
                .arg(
                    Arg::new("amount_invested")
                        .long("amount-invested")
                        .required(true),
                )
                .arg(Arg::new("current_value").long("current-value").required(true))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("list")
                .arg(limit_arg("Show at most N investments"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(Arg::new("asset_type").long("asset-type"))
                .arg(Arg::new("symbol").long("symbol"))
                .arg(Arg::new("amount_invested").long("amount-invested"))
                .arg(Arg::new("current_value").long("current-value"))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(
            Command::new("summary")
                .about("Invested vs current value, by asset type")
                .args(json_args()),
        )
}

fn report_command() -> Command {
    let offset_arg = || {
        Arg::new("utc_offset")
            .long("utc-offset")
            .allow_hyphen_values(true)
            .help("Month boundaries in this offset, e.g. +05:30 (default: config)")
    };
    Command::new("report")
        .about("Analytics over incomes and expenses")
        .subcommand_required(true)
        .subcommand(
            Command::new("summary")
                .about("Totals, savings and savings rate")
                .args(json_args()),
        )
        .subcommand(
            Command::new("categories")
                .about("Expense totals per category")
                .args(json_args()),
        )
        .subcommand(
            Command::new("monthly")
                .about("Income, expense and savings per month")
                .arg(offset_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("top")
                .about("Largest expense categories")
                .arg(top_limit_arg("Number of categories (default: config)"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("all")
                .about("Every report at once")
                .arg(top_limit_arg("Number of top categories (default: config)"))
                .arg(offset_arg())
                .args(json_args()),
        )
}

pub fn build_cli() -> Command {
    Command::new("finsight")
        .version(clap::crate_version!())
        .about("Personal income, expense and investment tracker")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Path to the SQLite database (default: platform data dir)"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .env("FINSIGHT_USER")
                .global(true)
                .help("Whose records to work with"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging (RUST_LOG takes precedence)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(cash_command("income", "Record incomes", "source"))
        .subcommand(cash_command("expense", "Record expenses", "title"))
        .subcommand(invest_command())
        .subcommand(
            Command::new("ledger")
                .about("All records, newest first")
                .arg(limit_arg("Show at most N entries"))
                .args(json_args()),
        )
        .subcommand(report_command())
        .subcommand(
            Command::new("import")
                .subcommand_required(true)
                .subcommand(
                    Command::new("records")
                        .about("Import incomes or expenses from CSV")
                        .long_about(
                            "Import incomes or expenses from a CSV with a header row naming \
                             kind,date,label,amount,category,notes (kind, date, category and \
                             notes optional). Files written by `export records` load as is.",
                        )
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .help("income|expense, for rows without a kind column"),
                        )
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .subcommand_required(true)
                .subcommand(
                    Command::new("records")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Report records the analytics had to correct or skip")
                .args(json_args()),
        )
        .subcommand(
            Command::new("config")
                .subcommand_required(true)
                .subcommand(Command::new("get").arg(Arg::new("key").long("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(
                            Arg::new("value")
                                .long("value")
                                .required(true)
                                .allow_hyphen_values(true),
                        ),
                )
                .subcommand(Command::new("list").args(json_args())),
        )
}
