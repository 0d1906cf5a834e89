// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finsight::models::RecordKind;
use finsight::session::{Session, DEFAULT_USER};
use finsight::{cli, commands, db};

fn init_logging(verbose: bool) {
    // RUST_LOG > --verbose > warn
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    init_logging(matches.get_flag("verbose"));

    let db_override = matches.get_one::<String>("db").map(PathBuf::from);
    let session = Session::new(
        matches
            .get_one::<String>("user")
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER),
    );
    let mut conn = db::open_or_init(db_override.as_deref())?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!(
                "Database initialized at {}",
                db::db_path(db_override.as_deref())?.display()
            );
        }
        Some(("income", sub)) => {
            commands::records::handle(&conn, &session, RecordKind::Income, sub)?
        }
        Some(("expense", sub)) => {
            commands::records::handle(&conn, &session, RecordKind::Expense, sub)?
        }
        Some(("invest", sub)) => commands::investments::handle(&conn, &session, sub)?,
        Some(("ledger", sub)) => commands::ledger::handle(&conn, &session, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, &session, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, &session, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &session, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, &session, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
