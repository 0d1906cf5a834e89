// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finsight::analytics::IssueKind;
use finsight::commands::{doctor, exporter, importer, records, reports, settings};
use finsight::config::{self, Settings};
use finsight::models::{RecordKind, StoredRecord};
use finsight::session::Session;
use finsight::store::{self, RecordFilter};
use finsight::{cli, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

/// Matches of the innermost group, e.g. `income` for `finsight income add ...`.
fn group_matches(args: &[&str]) -> clap::ArgMatches {
    let matches = cli::build_cli().get_matches_from(args.iter().copied());
    let (_, sub) = matches.subcommand().expect("subcommand");
    sub.clone()
}

fn run_records(conn: &Connection, session: &Session, kind: RecordKind, args: &[&str]) {
    records::handle(conn, session, kind, &group_matches(args)).unwrap();
}

fn list_all(conn: &Connection, s: &Session, kind: RecordKind) -> Vec<StoredRecord> {
    store::list_records(conn, s, kind, &RecordFilter::default()).unwrap()
}

#[test]
fn income_add_through_cli_trims_inputs() {
    let conn = setup();
    let s = Session::default();
    run_records(
        &conn,
        &s,
        RecordKind::Income,
        &[
            "finsight", "income", "add",
            "--source", " Salary ",
            "--amount", " 2500.00 ",
            "--date", " 2024-05-01 ",
            "--category", " Job ",
        ],
    );
    let rows = list_all(&conn, &s, RecordKind::Income);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "Salary");
    assert_eq!(rows[0].amount, dec!(2500.00));
    assert_eq!(rows[0].date, "2024-05-01");
    assert_eq!(rows[0].category.as_deref(), Some("Job"));
}

#[test]
fn expense_edit_and_rm_through_cli() {
    let conn = setup();
    let s = Session::default();
    run_records(
        &conn,
        &s,
        RecordKind::Expense,
        &[
            "finsight", "expense", "add",
            "--title", "Taxi",
            "--amount", "18",
            "--date", "2024-05-02",
        ],
    );
    let id = list_all(&conn, &s, RecordKind::Expense)[0].id.to_string();

    run_records(
        &conn,
        &s,
        RecordKind::Expense,
        &["finsight", "expense", "edit", "--id", &id, "--category", "Transport"],
    );
    let rows = list_all(&conn, &s, RecordKind::Expense);
    assert_eq!(rows[0].category.as_deref(), Some("Transport"));
    assert_eq!(rows[0].amount, dec!(18));

    run_records(&conn, &s, RecordKind::Expense, &["finsight", "expense", "rm", "--id", &id]);
    assert!(list_all(&conn, &s, RecordKind::Expense).is_empty());
}

#[test]
fn cli_rejects_non_numeric_amount() {
    let conn = setup();
    let sub = group_matches(&[
        "finsight", "expense", "add", "--title", "Tea", "--amount", "abc",
    ]);
    assert!(records::handle(&conn, &Session::default(), RecordKind::Expense, &sub).is_err());
    assert!(list_all(&conn, &Session::default(), RecordKind::Expense).is_empty());
}

#[test]
fn import_records_from_csv() {
    let mut conn = setup();
    let s = Session::new("dana");
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "date,label,amount,category,notes\n\
         2024-01-20, Groceries ,300,Food,\n\
         2024-02-01,Market,200,Food,weekly\n\
         ,Snack,2.5,,"
    )
    .unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let n = importer::import_records(&mut conn, &s, Some(RecordKind::Expense), &path).unwrap();
    assert_eq!(n, 3);

    let rows = list_all(&conn, &s, RecordKind::Expense);
    assert!(rows.iter().any(|r| r.label == "Groceries"));

    let input = store::load_for_analytics(&conn, &s).unwrap();
    let cats = finsight::analytics::compute_category_totals(&input.expenses);
    assert_eq!(cats.get("Food"), Some(dec!(500)));
    assert_eq!(cats.get("Uncategorized"), Some(dec!(2.5)));
}

#[test]
fn import_is_all_or_nothing() {
    let mut conn = setup();
    let s = Session::default();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "date,label,amount,category,notes\n2024-01-20,Job,300,,\n2024-01-21,Job,oops,,"
    )
    .unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let err =
        importer::import_records(&mut conn, &s, Some(RecordKind::Income), &path).unwrap_err();
    assert!(format!("{:#}", err).contains("line 3"));
    assert!(list_all(&conn, &s, RecordKind::Income).is_empty());
}

#[test]
fn export_records_writes_json_oldest_first() {
    let conn = setup();
    let s = Session::default();
    run_records(
        &conn,
        &s,
        RecordKind::Expense,
        &[
            "finsight", "expense", "add",
            "--title", "Rent",
            "--amount", "700",
            "--date", "2024-03-01",
            "--category", "Housing",
        ],
    );
    run_records(
        &conn,
        &s,
        RecordKind::Income,
        &[
            "finsight", "income", "add",
            "--source", "Job",
            "--amount", "1000.50",
            "--date", "2024-02-28",
        ],
    );

    let dir = tempdir().unwrap();
    let out = dir.path().join("export.json");
    let out_str = out.to_string_lossy().to_string();
    let sub = group_matches(&[
        "finsight", "export", "records", "--format", "json", "--out", &out_str,
    ]);
    exporter::handle(&conn, &s, &sub).unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([
            {
                "kind": "income",
                "date": "2024-02-28",
                "label": "Job",
                "amount": "1000.50",
                "category": null,
                "notes": null
            },
            {
                "kind": "expense",
                "date": "2024-03-01",
                "label": "Rent",
                "amount": "700",
                "category": "Housing",
                "notes": null
            }
        ])
    );
}

#[test]
fn export_rejects_unknown_format() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("x.xml");
    let res = exporter::export_records(&conn, &Session::default(), "xml", out.to_str().unwrap());
    assert!(res.is_err());
}

#[test]
fn config_set_validates_and_feeds_settings() {
    let conn = setup();
    assert!(config::set(&conn, "utc_offset", "+25:00").is_err());
    assert!(config::set(&conn, "top_limit", "0").is_err());
    assert!(config::set(&conn, "colour", "red").is_err());

    let sub = group_matches(&[
        "finsight", "config", "set", "--key", "utc_offset", "--value", "-05:00",
    ]);
    settings::handle(&conn, &sub).unwrap();
    config::set(&conn, "top_limit", "3").unwrap();
    config::set(&conn, "currency_symbol", "₹").unwrap();

    let s = Settings::load(&conn).unwrap();
    assert_eq!(s.utc_offset.local_minus_utc(), -5 * 3600);
    assert_eq!(s.top_limit, 3);
    assert_eq!(s.money(&dec!(-12.5)), "-₹12.50");
    assert_eq!(s.analytics().top_limit, 3);
}

#[test]
fn reports_run_over_stored_records() {
    let conn = setup();
    let s = Session::default();
    run_records(
        &conn,
        &s,
        RecordKind::Income,
        &[
            "finsight", "income", "add",
            "--source", "Job",
            "--amount", "500",
            "--date", "2024-04-01",
        ],
    );
    run_records(
        &conn,
        &s,
        RecordKind::Expense,
        &[
            "finsight", "expense", "add",
            "--title", "Rent",
            "--amount", "600",
            "--date", "2024-04-02",
            "--category", "Rent",
        ],
    );

    let runs: [&[&str]; 5] = [
        &["finsight", "report", "summary"],
        &["finsight", "report", "categories", "--json"],
        &["finsight", "report", "monthly", "--utc-offset", "+05:30"],
        &["finsight", "report", "top", "--limit", "1", "--jsonl"],
        &["finsight", "report", "all"],
    ];
    for args in runs {
        reports::handle(&conn, &s, &group_matches(args)).unwrap();
    }

    let sub = group_matches(&["finsight", "report", "monthly", "--utc-offset", "noon"]);
    assert!(reports::handle(&conn, &s, &sub).is_err());
}

#[test]
fn doctor_lists_negative_amounts_and_bad_dates() {
    let conn = setup();
    let s = Session::default();
    conn.execute(
        "INSERT INTO expenses(user, title, amount, category, date) \
         VALUES ('default','Refund','-20','Food','2024-01-05')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO incomes(user, source, amount, category, date) \
         VALUES ('default','Job','100',NULL,'05/01/2024')",
        [],
    )
    .unwrap();

    let issues = doctor::find_issues(&conn, &s).unwrap();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].issue, IssueKind::NegativeAmount);
    assert_eq!(issues[0].kind, RecordKind::Expense);
    assert_eq!(issues[1].issue, IssueKind::UnparseableDate);
    assert_eq!(issues[1].kind, RecordKind::Income);

    let other = Session::new("someone-else");
    assert!(doctor::find_issues(&conn, &other).unwrap().is_empty());
}

#[test]
fn reports_and_doctor_survive_an_unreadable_amount() {
    let conn = setup();
    let s = Session::default();
    for sql in [
        "INSERT INTO incomes(user, source, amount, date) \
         VALUES ('default','Job','1000','2024-01-15')",
        "INSERT INTO expenses(user, title, amount, category, date) \
         VALUES ('default','Groceries','abc','Food','2024-01-20')",
        "INSERT INTO expenses(user, title, amount, category, date) \
         VALUES ('default','Rent','300','Rent','2024-01-02')",
    ] {
        conn.execute(sql, []).unwrap();
    }

    for report in ["summary", "categories", "monthly", "top", "all"] {
        let sub = group_matches(&["finsight", "report", report]);
        reports::handle(&conn, &s, &sub).unwrap();
    }

    let issues = doctor::find_issues(&conn, &s).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].issue, IssueKind::InvalidAmount);
    assert_eq!(issues[0].kind, RecordKind::Expense);
    assert_eq!(issues[0].id, Some(1));
    doctor::handle(&conn, &s, &group_matches(&["finsight", "doctor", "--json"])).unwrap();
}

#[test]
fn exported_csv_imports_back() {
    let mut conn = setup();
    let s = Session::new("erin");
    store::add_record(
        &conn,
        &s,
        RecordKind::Expense,
        &finsight::models::NewRecord {
            label: "Rent".into(),
            amount: dec!(700),
            category: Some("Housing".into()),
            date: Some("2024-03-01".into()),
            notes: Some("March".into()),
        },
        &Settings::default().utc_offset,
    )
    .unwrap();
    run_records(
        &conn,
        &s,
        RecordKind::Income,
        &[
            "finsight", "income", "add",
            "--source", "Job",
            "--amount", "1000.50",
            "--date", "2024-02-28",
        ],
    );

    let dir = tempdir().unwrap();
    let out = dir.path().join("records.csv");
    let out_str = out.to_str().unwrap();
    assert_eq!(exporter::export_records(&conn, &s, "csv", out_str).unwrap(), 2);

    let copy = Session::new("erin-copy");
    let n = importer::import_records(&mut conn, &copy, None, out_str).unwrap();
    assert_eq!(n, 2);

    let incomes = list_all(&conn, &copy, RecordKind::Income);
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].label, "Job");
    assert_eq!(incomes[0].amount, dec!(1000.50));
    let expenses = list_all(&conn, &copy, RecordKind::Expense);
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].category.as_deref(), Some("Housing"));
    assert_eq!(expenses[0].notes.as_deref(), Some("March"));
    assert_eq!(expenses[0].date, "2024-03-01");
}

#[test]
fn import_without_kind_needs_a_kind_column() {
    let mut conn = setup();
    let s = Session::default();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,label,amount\n2024-01-20,Job,300").unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let err = importer::import_records(&mut conn, &s, None, &path).unwrap_err();
    assert!(format!("{:#}", err).contains("line 2"));
    assert!(importer::import_records(&mut conn, &s, Some(RecordKind::Investment), &path).is_err());
    assert!(list_all(&conn, &s, RecordKind::Income).is_empty());
}

#[test]
fn report_limit_must_be_positive() {
    for report in ["top", "all"] {
        let zero = ["finsight", "report", report, "--limit", "0"];
        assert!(cli::build_cli().try_get_matches_from(zero).is_err());
        let two = ["finsight", "report", report, "--limit", "2"];
        assert!(cli::build_cli().try_get_matches_from(two).is_ok());
    }
    // Listings keep accepting any count.
    let list = ["finsight", "income", "list", "--limit", "0"];
    assert!(cli::build_cli().try_get_matches_from(list).is_ok());
}
