//! Query modules for the sales dashboard SDK.
//!
//! Each module provides a query struct that borrows from a [`Connection`](crate::connection::Connection)
//! and turns the raw VARCHAR sheet rows into typed records. Rows that cannot be
//! converted are skipped and reported as [`RowDiagnostic`]s.

pub mod products;
pub mod transactions;

pub use products::ProductQuery;
pub use transactions::TransactionQuery;

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{Connection, ROW_NUMBER_COLUMN};
use crate::error::{DashboardError, Result};
use crate::models::RowDiagnostic;

/// Typed rows loaded from a sheet plus the rows that had to be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RowDiagnostic>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Row = HashMap<String, Value>;

/// Fail with a configuration error if `view` lacks any of `required`.
fn require_columns(conn: &Connection, view: &str, required: &[&str]) -> Result<()> {
    let present = conn.columns(view)?;
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|c| !present.iter().any(|p| p == c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::Config(format!(
            "{} sheet is missing column(s): {}",
            view,
            missing.join(", ")
        )))
    }
}

fn row_number(row: &Row, fallback: usize) -> usize {
    row.get(ROW_NUMBER_COLUMN)
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(fallback)
}

/// Trimmed cell text, `None` for NULL or blank cells.
fn cell<'r>(row: &'r Row, column: &str) -> Option<&'r str> {
    row.get(column)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn diagnostic(row: usize, column: &str, value: Option<&str>, reason: impl Into<String>) -> RowDiagnostic {
    RowDiagnostic {
        row,
        column: column.to_string(),
        value: value.map(str::to_string),
        reason: reason.into(),
    }
}

fn required_cell<'r>(row: &'r Row, row_no: usize, column: &str) -> std::result::Result<&'r str, RowDiagnostic> {
    cell(row, column).ok_or_else(|| diagnostic(row_no, column, None, "value is missing"))
}

/// Convert every row with `convert`, splitting successes from diagnostics.
fn collect_rows<T>(
    view: &str,
    rows: Vec<Row>,
    convert: impl Fn(usize, &Row) -> std::result::Result<T, RowDiagnostic>,
) -> Loaded<T> {
    let mut loaded = Loaded {
        records: Vec::with_capacity(rows.len()),
        rejected: Vec::new(),
    };
    for (i, row) in rows.iter().enumerate() {
        let row_no = row_number(row, i + 1);
        match convert(row_no, row) {
            Ok(record) => loaded.records.push(record),
            Err(diag) => {
                tracing::warn!(view, %diag, "skipping sheet row");
                loaded.rejected.push(diag);
            }
        }
    }
    loaded
}

/// Parse a whole number, accepting a zero fractional part (`"3.0"`) as
/// spreadsheets often export counts that way.
pub fn parse_integer(s: &str) -> Option<i64> {
    let value: Decimal = s.trim().parse().ok()?;
    if value.fract().is_zero() {
        value.to_i64()
    } else {
        None
    }
}

/// Parse a currency amount; plain decimal or scientific notation.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    s.parse()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

/// Parse a `%Y-%m-%d` date, discarding any trailing time of day
/// (`2024-01-05 13:45:00`, `2024-01-05T13:45:00`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = s.split(|c: char| c == ' ' || c == 'T').next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
