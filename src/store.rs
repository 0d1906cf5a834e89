// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user persistence of incomes, expenses and investments.

use chrono::{FixedOffset, Offset, Utc};
use rusqlite::{params, params_from_iter, Connection, ToSql};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::analytics::{DataIssue, IssueKind, MonthKey};
use crate::error::{FinsightError, Result};
use crate::models::{
    FinancialRecord, Investment, InvestmentPatch, LedgerEntry, NewInvestment, NewRecord,
    RecordKind, RecordPatch, StoredRecord, DEFAULT_CATEGORY,
};
use crate::session::Session;
use crate::utils::{local_date, parse_date, parse_month, today};

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// `YYYY-MM`, matched against each date as seen in `utc_offset`.
    pub month: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    /// Calendar for `month`; UTC when unset.
    pub utc_offset: Option<FixedOffset>,
}

/// Incomes and expenses of one user, ready for the analytics functions,
/// plus the rows that could not be turned into records.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsInput {
    pub incomes: Vec<FinancialRecord>,
    pub expenses: Vec<FinancialRecord>,
    pub issues: Vec<DataIssue>,
}

/// A row as stored, amount still unparsed.
struct RawRecord {
    id: i64,
    label: String,
    amount: String,
    category: Option<String>,
    date: String,
    notes: Option<String>,
}

impl RawRecord {
    fn into_stored(self, kind: RecordKind) -> Result<StoredRecord> {
        Ok(StoredRecord {
            id: self.id,
            kind,
            amount: stored_decimal(&self.amount)?,
            label: self.label,
            category: self.category,
            date: self.date,
            notes: self.notes,
        })
    }
}

fn cash_kind(kind: RecordKind) -> Result<RecordKind> {
    match kind {
        RecordKind::Income | RecordKind::Expense => Ok(kind),
        RecordKind::Investment => Err(FinsightError::UnknownKind(kind.to_string())),
    }
}

fn missing_label(kind: RecordKind) -> FinsightError {
    match kind {
        RecordKind::Income => FinsightError::MissingField("Source"),
        RecordKind::Expense => FinsightError::MissingField("Title"),
        RecordKind::Investment => FinsightError::MissingField("Asset type"),
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn stored_decimal(raw: &str) -> Result<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| FinsightError::InvalidAmount(raw.to_string()))
}

fn resolve_date(date: Option<&str>, offset: &FixedOffset) -> Result<String> {
    match non_blank(date) {
        Some(d) => parse_date(&d),
        None => Ok(today(offset)),
    }
}

pub fn add_record(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    rec: &NewRecord,
    offset: &FixedOffset,
) -> Result<i64> {
    let kind = cash_kind(kind)?;
    let label = non_blank(Some(&rec.label)).ok_or_else(|| missing_label(kind))?;
    if rec.amount <= Decimal::ZERO {
        return Err(missing_label(kind));
    }
    let date = resolve_date(rec.date.as_deref(), offset)?;
    let sql = format!(
        "INSERT INTO {}(user, {}, amount, category, date, notes) VALUES (?1,?2,?3,?4,?5,?6)",
        kind.table(),
        kind.label_field()
    );
    conn.execute(
        &sql,
        params![
            session.user,
            label,
            rec.amount.to_string(),
            non_blank(rec.category.as_deref()),
            date,
            non_blank(rec.notes.as_deref()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(user = %session.user, %kind, id, "record added");
    Ok(id)
}

pub fn list_records(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    filter: &RecordFilter,
) -> Result<Vec<StoredRecord>> {
    let kind = cash_kind(kind)?;
    select_records(conn, session, kind, filter)?
        .into_iter()
        .map(|r| r.into_stored(kind))
        .collect()
}

fn select_records(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    filter: &RecordFilter,
) -> Result<Vec<RawRecord>> {
    let month = match &filter.month {
        Some(m) => Some(MonthKey::of(parse_month(m)?)),
        None => None,
    };
    let mut sql = format!(
        "SELECT id, {}, amount, category, date, notes FROM {} WHERE user=?",
        kind.label_field(),
        kind.table()
    );
    let mut params_vec: Vec<String> = vec![session.user.clone()];

    if let Some(cat) = &filter.category {
        if cat.trim() == DEFAULT_CATEGORY {
            sql.push_str(" AND (category IS NULL OR trim(category)='' OR category=?)");
        } else {
            sql.push_str(" AND category=?");
        }
        params_vec.push(cat.trim().to_string());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    // The month of a row depends on the offset, so with a month filter the
    // limit is applied after filtering below.
    if let (Some(limit), None) = (filter.limit, month) {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(RawRecord {
            id: r.get(0)?,
            label: r.get(1)?,
            amount: r.get(2)?,
            category: r.get(3)?,
            date: r.get(4)?,
            notes: r.get(5)?,
        });
    }

    if let Some(month) = month {
        let offset = filter.utc_offset.unwrap_or_else(|| Utc.fix());
        data.retain(|r| local_date(&r.date, &offset).is_ok_and(|d| MonthKey::of(d) == month));
        if let Some(limit) = filter.limit {
            data.truncate(limit);
        }
    }
    Ok(data)
}

pub fn update_record(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    id: i64,
    patch: &RecordPatch,
) -> Result<()> {
    let kind = cash_kind(kind)?;
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Option<String>> = Vec::new();

    if let Some(label) = &patch.label {
        let label = non_blank(Some(label)).ok_or_else(|| missing_label(kind))?;
        sets.push(format!("{}=?", kind.label_field()));
        values.push(Some(label));
    }
    if let Some(amount) = patch.amount {
        if amount <= Decimal::ZERO {
            return Err(FinsightError::InvalidAmount(amount.to_string()));
        }
        sets.push("amount=?".into());
        values.push(Some(amount.to_string()));
    }
    if let Some(cat) = &patch.category {
        sets.push("category=?".into());
        values.push(non_blank(Some(cat)));
    }
    if let Some(date) = &patch.date {
        sets.push("date=?".into());
        values.push(Some(parse_date(date)?));
    }
    if let Some(notes) = &patch.notes {
        sets.push("notes=?".into());
        values.push(non_blank(Some(notes)));
    }

    exec_update(conn, session, kind, id, sets, values)
}

fn exec_update(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    id: i64,
    sets: Vec<String>,
    values: Vec<Option<String>>,
) -> Result<()> {
    if sets.is_empty() {
        // Nothing to change, but the id must still exist.
        let found: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id=?1 AND user=?2", kind.table()),
            params![id, session.user],
            |r| r.get(0),
        )?;
        if found == 0 {
            return Err(FinsightError::NotFound { kind, id });
        }
        return Ok(());
    }
    let sql = format!(
        "UPDATE {} SET {} WHERE id=? AND user=?",
        kind.table(),
        sets.join(", ")
    );
    let mut bound: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
    bound.push(&id);
    bound.push(&session.user);
    let changed = conn.execute(&sql, bound.as_slice())?;
    if changed == 0 {
        return Err(FinsightError::NotFound { kind, id });
    }
    info!(user = %session.user, %kind, id, "record updated");
    Ok(())
}

pub fn delete_record(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    id: i64,
) -> Result<()> {
    let changed = conn.execute(
        &format!("DELETE FROM {} WHERE id=?1 AND user=?2", kind.table()),
        params![id, session.user],
    )?;
    if changed == 0 {
        return Err(FinsightError::NotFound { kind, id });
    }
    info!(user = %session.user, %kind, id, "record deleted");
    Ok(())
}

/// Every income and expense of the session user. A row whose amount does
/// not parse is left out and reported as [`IssueKind::InvalidAmount`].
pub fn load_for_analytics(conn: &Connection, session: &Session) -> Result<AnalyticsInput> {
    let all = RecordFilter::default();
    let mut input = AnalyticsInput::default();
    for kind in [RecordKind::Income, RecordKind::Expense] {
        let mut records = Vec::new();
        for (index, raw) in select_records(conn, session, kind, &all)?.into_iter().enumerate() {
            let id = raw.id;
            match raw.into_stored(kind) {
                Ok(stored) => records.push(FinancialRecord::from(&stored)),
                Err(e) => {
                    warn!(user = %session.user, %kind, id, "unreadable record skipped");
                    input.issues.push(DataIssue {
                        kind,
                        index,
                        id: Some(id),
                        issue: IssueKind::InvalidAmount,
                        detail: format!("{}, record left out", e),
                    });
                }
            }
        }
        match kind {
            RecordKind::Income => input.incomes = records,
            _ => input.expenses = records,
        }
    }
    Ok(input)
}

pub fn add_investment(
    conn: &Connection,
    session: &Session,
    inv: &NewInvestment,
    offset: &FixedOffset,
) -> Result<i64> {
    let asset_type = non_blank(Some(&inv.asset_type))
        .ok_or_else(|| missing_label(RecordKind::Investment))?;
    if inv.amount_invested <= Decimal::ZERO || inv.current_value < Decimal::ZERO {
        return Err(missing_label(RecordKind::Investment));
    }
    let date = resolve_date(inv.date.as_deref(), offset)?;
    conn.execute(
        "INSERT INTO investments
             (user, asset_type, symbol, amount_invested, current_value, date, notes)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            session.user,
            asset_type,
            non_blank(inv.symbol.as_deref()).map(|s| s.to_uppercase()),
            inv.amount_invested.to_string(),
            inv.current_value.to_string(),
            date,
            non_blank(inv.notes.as_deref()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(user = %session.user, kind = %RecordKind::Investment, id, "record added");
    Ok(id)
}

pub fn list_investments(
    conn: &Connection,
    session: &Session,
    limit: Option<usize>,
) -> Result<Vec<Investment>> {
    let mut stmt = conn.prepare(
        "SELECT id, asset_type, symbol, amount_invested, current_value, date, notes
         FROM investments WHERE user=?1 ORDER BY date DESC, id DESC LIMIT ?2",
    )?;
    // SQLite treats a negative LIMIT as unbounded.
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut rows = stmt.query(params![session.user, limit])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let invested: String = r.get(3)?;
        let current: String = r.get(4)?;
        data.push(Investment {
            id: r.get(0)?,
            asset_type: r.get(1)?,
            symbol: r.get(2)?,
            amount_invested: stored_decimal(&invested)?,
            current_value: stored_decimal(&current)?,
            date: r.get(5)?,
            notes: r.get(6)?,
        });
    }
    Ok(data)
}

pub fn update_investment(
    conn: &Connection,
    session: &Session,
    id: i64,
    patch: &InvestmentPatch,
) -> Result<()> {
    let kind = RecordKind::Investment;
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Option<String>> = Vec::new();

    if let Some(t) = &patch.asset_type {
        let t = non_blank(Some(t)).ok_or_else(|| missing_label(kind))?;
        sets.push("asset_type=?".into());
        values.push(Some(t));
    }
    if let Some(sym) = &patch.symbol {
        sets.push("symbol=?".into());
        values.push(non_blank(Some(sym)).map(|s| s.to_uppercase()));
    }
    if let Some(a) = patch.amount_invested {
        if a <= Decimal::ZERO {
            return Err(FinsightError::InvalidAmount(a.to_string()));
        }
        sets.push("amount_invested=?".into());
        values.push(Some(a.to_string()));
    }
    if let Some(v) = patch.current_value {
        if v < Decimal::ZERO {
            return Err(FinsightError::InvalidAmount(v.to_string()));
        }
        sets.push("current_value=?".into());
        values.push(Some(v.to_string()));
    }
    if let Some(date) = &patch.date {
        sets.push("date=?".into());
        values.push(Some(parse_date(date)?));
    }
    if let Some(notes) = &patch.notes {
        sets.push("notes=?".into());
        values.push(non_blank(Some(notes)));
    }

    exec_update(conn, session, kind, id, sets, values)
}

/// Incomes, expenses and investments of the user in one date-descending list.
pub fn ledger(
    conn: &Connection,
    session: &Session,
    limit: Option<usize>,
) -> Result<Vec<LedgerEntry>> {
    let mut stmt = conn.prepare(
        "SELECT 'income', id, date, source, category, amount FROM incomes WHERE user=?1
         UNION ALL
         SELECT 'expense', id, date, title, category, amount FROM expenses WHERE user=?1
         UNION ALL
         SELECT 'investment', id, date, asset_type, symbol, amount_invested
           FROM investments WHERE user=?1
         ORDER BY 3 DESC, 2 DESC
         LIMIT ?2",
    )?;
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut rows = stmt.query(params![session.user, limit])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let kind_s: String = r.get(0)?;
        let kind: RecordKind = kind_s.parse()?;
        let category: Option<String> = r.get(4)?;
        let amount: String = r.get(5)?;
        data.push(LedgerEntry {
            kind,
            id: r.get(1)?,
            date: r.get(2)?,
            label: r.get(3)?,
            category: match kind {
                RecordKind::Investment => category.unwrap_or_default(),
                _ => non_blank(category.as_deref())
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            },
            amount: stored_decimal(&amount)?,
        });
    }
    Ok(data)
}
