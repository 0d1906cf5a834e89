// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinsightError;

/// Category used for incomes and expenses stored without one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
    Investment,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
            RecordKind::Investment => "investment",
        }
    }

    /// Name of the descriptive column: `source` for incomes, `title` for expenses.
    pub fn label_field(&self) -> &'static str {
        match self {
            RecordKind::Income => "source",
            RecordKind::Expense => "title",
            RecordKind::Investment => "asset_type",
        }
    }

    pub(crate) fn table(&self) -> &'static str {
        match self {
            RecordKind::Income => "incomes",
            RecordKind::Expense => "expenses",
            RecordKind::Investment => "investments",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = FinsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "incomes" => Ok(RecordKind::Income),
            "expense" | "expenses" => Ok(RecordKind::Expense),
            "investment" | "investments" | "invest" => Ok(RecordKind::Investment),
            other => Err(FinsightError::UnknownKind(other.to_string())),
        }
    }
}

/// The shape the analytics layer consumes: one income or expense entry.
///
/// `date` is kept as the raw timestamp text so that unparseable values can
/// be reported per record instead of failing a whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// Row id when the record came from the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: String,
    pub notes: Option<String>,
}

impl FinancialRecord {
    pub fn new(amount: Decimal, category: Option<&str>, date: &str) -> Self {
        FinancialRecord {
            id: None,
            amount,
            category: category.map(str::to_string),
            date: date.to_string(),
            notes: None,
        }
    }

    /// Category name with blanks folded into [`DEFAULT_CATEGORY`].
    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }
}

/// An income or expense row as persisted for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    pub kind: RecordKind,
    pub label: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: String,
    pub notes: Option<String>,
}

impl From<&StoredRecord> for FinancialRecord {
    fn from(r: &StoredRecord) -> Self {
        FinancialRecord {
            id: Some(r.id),
            amount: r.amount,
            category: r.category.clone(),
            date: r.date.clone(),
            notes: r.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub label: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub label: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,
    pub asset_type: String,
    pub symbol: Option<String>,
    pub amount_invested: Decimal,
    pub current_value: Decimal,
    pub date: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewInvestment {
    pub asset_type: String,
    pub symbol: Option<String>,
    pub amount_invested: Decimal,
    pub current_value: Decimal,
    pub date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InvestmentPatch {
    pub asset_type: Option<String>,
    pub symbol: Option<String>,
    pub amount_invested: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub date: Option<String>,
    pub notes: Option<String>,
}

/// One line of the unified ledger across all record kinds.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub kind: RecordKind,
    pub id: i64,
    pub date: String,
    pub label: String,
    pub category: String,
    pub amount: Decimal,
}
