// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregation of income and expense records into chart-ready summaries.
//!
//! Every function here is pure: it reads the slices it is given and returns
//! a fresh value. Data-quality problems never abort a computation; they are
//! returned as [`DataIssue`]s next to the partial results.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, FixedOffset, NaiveDate, Offset, Utc};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::models::{FinancialRecord, RecordKind};
use crate::utils::{local_date, percent_of};

pub const DEFAULT_TOP_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct AnalyticsConfig {
    /// Offset whose calendar decides which month a timestamp falls in.
    pub utc_offset: FixedOffset,
    pub top_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            utc_offset: Utc.fix(),
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NegativeAmount,
    UnparseableDate,
    /// Stored amount is not a number; the record never reaches a sum.
    InvalidAmount,
}

/// A record the aggregator had to correct or leave out of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataIssue {
    pub kind: RecordKind,
    /// Position of the record in the slice it came from.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub issue: IssueKind,
    pub detail: String,
}

/// Amount used in every sum. Negative amounts count as zero.
fn effective_amount(r: &FinancialRecord) -> Decimal {
    r.amount.max(Decimal::ZERO)
}

fn sum_amounts(records: &[FinancialRecord]) -> Decimal {
    records.iter().map(effective_amount).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

/// Expense sums keyed by category, remembering first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    entries: Vec<CategoryTotal>,
    index: HashMap<String, usize>,
}

impl CategoryTotals {
    pub fn add(&mut self, category: &str, amount: Decimal) {
        match self.index.get(category) {
            Some(&i) => self.entries[i].amount += amount,
            None => {
                self.index.insert(category.to_string(), self.entries.len());
                self.entries.push(CategoryTotal {
                    category: category.to_string(),
                    amount,
                });
            }
        }
    }

    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.index.get(category).map(|&i| self.entries[i].amount)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.entries.iter()
    }

    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// Entries by descending amount; equal amounts keep first-seen order.
    pub fn sorted_desc(&self) -> Vec<&CategoryTotal> {
        let mut v: Vec<&CategoryTotal> = self.entries.iter().collect();
        v.sort_by(|a, b| b.amount.cmp(&a.amount));
        v
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for e in &self.entries {
            map.serialize_entry(&e.category, &e.amount)?;
        }
        map.end()
    }
}

pub fn compute_category_totals(expenses: &[FinancialRecord]) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for e in expenses {
        totals.add(e.category_or_default(), effective_amount(e));
    }
    totals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// `YYYY-MM`.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Short English month and year, e.g. `Jan 2024`.
    pub fn label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(d) => d.format("%b %Y").to_string(),
            None => self.key(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthBucket {
    pub income: Decimal,
    pub expense: Decimal,
}

impl MonthBucket {
    pub fn savings(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Per-month sums in ascending month order. All vectors share one index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlySeries {
    pub keys: Vec<String>,
    pub labels: Vec<String>,
    pub income: Vec<Decimal>,
    pub expense: Vec<Decimal>,
    pub savings: Vec<Decimal>,
    /// Records left out because their date could not be read.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<DataIssue>,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

pub fn compute_monthly_series(
    incomes: &[FinancialRecord],
    expenses: &[FinancialRecord],
    offset: &FixedOffset,
) -> MonthlySeries {
    let mut buckets: BTreeMap<MonthKey, MonthBucket> = BTreeMap::new();
    let mut skipped = Vec::new();

    for (kind, records) in [(RecordKind::Income, incomes), (RecordKind::Expense, expenses)] {
        for (index, r) in records.iter().enumerate() {
            let date = match local_date(&r.date, offset) {
                Ok(d) => d,
                Err(e) => {
                    skipped.push(DataIssue {
                        kind,
                        index,
                        id: r.id,
                        issue: IssueKind::UnparseableDate,
                        detail: e.to_string(),
                    });
                    continue;
                }
            };
            let bucket = buckets.entry(MonthKey::of(date)).or_default();
            match kind {
                RecordKind::Income => bucket.income += effective_amount(r),
                _ => bucket.expense += effective_amount(r),
            }
        }
    }

    let mut series = MonthlySeries {
        skipped,
        ..MonthlySeries::default()
    };
    for (month, bucket) in buckets {
        series.keys.push(month.key());
        series.labels.push(month.label());
        series.income.push(bucket.income);
        series.expense.push(bucket.expense);
        series.savings.push(bucket.savings());
    }
    series
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCategory {
    pub category: String,
    pub amount: Decimal,
    /// Share of total expense, one decimal.
    pub percentage: Decimal,
    /// The category alone exceeds total income.
    pub overspend: bool,
}

pub fn rank_top_categories(
    totals: &CategoryTotals,
    total_expense: Decimal,
    total_income: Decimal,
    limit: usize,
) -> Vec<RankedCategory> {
    totals
        .sorted_desc()
        .into_iter()
        .take(limit)
        .map(|e| RankedCategory {
            category: e.category.clone(),
            amount: e.amount,
            percentage: percent_of(e.amount, total_expense),
            overspend: e.amount > total_income,
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadlineTotals {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub total_savings: Decimal,
    /// Savings as a share of income, one decimal.
    pub savings_rate: Decimal,
    /// Expense as a share of income, one decimal.
    pub spent_share: Decimal,
}

impl HeadlineTotals {
    pub fn is_overspending(&self) -> bool {
        self.total_expense > self.total_income
    }
}

pub fn compute_headline_totals(
    incomes: &[FinancialRecord],
    expenses: &[FinancialRecord],
) -> HeadlineTotals {
    let total_income = sum_amounts(incomes);
    let total_expense = sum_amounts(expenses);
    let total_savings = total_income - total_expense;
    HeadlineTotals {
        total_income,
        total_expense,
        total_savings,
        savings_rate: percent_of(total_savings, total_income),
        spent_share: percent_of(total_expense, total_income),
    }
}

/// Negative amounts, which every sum above treats as zero.
pub fn find_amount_issues(
    incomes: &[FinancialRecord],
    expenses: &[FinancialRecord],
) -> Vec<DataIssue> {
    let mut issues = Vec::new();
    for (kind, records) in [(RecordKind::Income, incomes), (RecordKind::Expense, expenses)] {
        for (index, r) in records.iter().enumerate() {
            if r.amount.is_sign_negative() && !r.amount.is_zero() {
                issues.push(DataIssue {
                    kind,
                    index,
                    id: r.id,
                    issue: IssueKind::NegativeAmount,
                    detail: format!("amount {} counted as 0", r.amount),
                });
            }
        }
    }
    issues
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub totals: HeadlineTotals,
    pub overspending: bool,
    pub category_totals: CategoryTotals,
    pub monthly: MonthlySeries,
    pub top_categories: Vec<RankedCategory>,
    pub issues: Vec<DataIssue>,
}

/// Runs all four aggregations over one snapshot of records.
pub fn aggregate(
    incomes: &[FinancialRecord],
    expenses: &[FinancialRecord],
    config: &AnalyticsConfig,
) -> AnalyticsReport {
    let totals = compute_headline_totals(incomes, expenses);
    let category_totals = compute_category_totals(expenses);
    let mut monthly = compute_monthly_series(incomes, expenses, &config.utc_offset);
    let top_categories = rank_top_categories(
        &category_totals,
        totals.total_expense,
        totals.total_income,
        config.top_limit,
    );

    let mut issues = find_amount_issues(incomes, expenses);
    issues.extend(std::mem::take(&mut monthly.skipped));
    for i in &issues {
        warn!(kind = %i.kind, index = i.index, id = ?i.id, issue = ?i.issue, "{}", i.detail);
    }
    debug!(
        incomes = incomes.len(),
        expenses = expenses.len(),
        months = monthly.len(),
        categories = category_totals.len(),
        issues = issues.len(),
        "aggregated records"
    );

    AnalyticsReport {
        overspending: totals.is_overspending(),
        totals,
        category_totals,
        monthly,
        top_categories,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rec(amount: Decimal, category: Option<&str>, date: &str) -> FinancialRecord {
        FinancialRecord::new(amount, category, date)
    }

    #[test]
    fn blank_category_falls_back_to_default() {
        let expenses = vec![
            rec(dec!(10), None, "2024-01-01"),
            rec(dec!(5), Some("  "), "2024-01-02"),
        ];
        let totals = compute_category_totals(&expenses);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals.get("Uncategorized"), Some(dec!(15)));
    }

    #[test]
    fn category_totals_serialize_as_ordered_map() {
        let expenses = vec![
            rec(dec!(1.50), Some("Rent"), "2024-01-01"),
            rec(dec!(2), Some("Food"), "2024-01-02"),
        ];
        let v = serde_json::to_string(&compute_category_totals(&expenses)).unwrap();
        assert_eq!(v, r#"{"Rent":"1.50","Food":"2"}"#);
    }

    #[test]
    fn sorted_desc_keeps_first_seen_order_on_ties() {
        let mut t = CategoryTotals::default();
        t.add("B", dec!(10));
        t.add("A", dec!(10));
        t.add("C", dec!(20));
        let names: Vec<&str> = t.sorted_desc().iter().map(|e| e.category.as_str()).collect();
        assert_eq!(names, ["C", "B", "A"]);
    }

    #[test]
    fn month_label_and_key_are_zero_padded() {
        let k = MonthKey { year: 2024, month: 3 };
        assert_eq!(k.key(), "2024-03");
        assert_eq!(k.label(), "Mar 2024");
    }

    #[test]
    fn negative_amount_is_zero_in_every_sum() {
        let incomes = vec![rec(dec!(100), None, "2024-01-01")];
        let expenses = vec![
            rec(dec!(-40), Some("Food"), "2024-01-02"),
            rec(dec!(30), Some("Food"), "2024-01-03"),
        ];
        let report = aggregate(&incomes, &expenses, &AnalyticsConfig::default());
        assert_eq!(report.totals.total_expense, dec!(30));
        assert_eq!(report.category_totals.get("Food"), Some(dec!(30)));
        assert_eq!(report.monthly.expense, vec![dec!(30)]);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].issue, IssueKind::NegativeAmount);
        assert_eq!(report.issues[0].kind, RecordKind::Expense);
        assert_eq!(report.issues[0].index, 0);
    }
}
