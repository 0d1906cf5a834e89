// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Domain errors raised by the store and the parse helpers.

use thiserror::Error;

use crate::models::RecordKind;

#[derive(Error, Debug)]
pub enum FinsightError {
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Invalid UTC offset '{0}', expected +HH:MM or -HH:MM")]
    InvalidOffset(String),

    #[error("Unknown record kind '{0}' (use income|expense|investment)")]
    UnknownKind(String),

    #[error("{0} and amount required")]
    MissingField(&'static str),

    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: i64 },

    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("Invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, FinsightError>;
