use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Status: Customer tier attached to each transaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Basic,
    Premium,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Basic => "basic",
            Status::Premium => "premium",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Status::Basic),
            "premium" => Ok(Status::Premium),
            other => Err(DashboardError::InvalidArgument(format!(
                "unknown customer status: {:?}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// YearMonth: Monthly bucket key, written as `YYYY-MM`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Build a key, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(DashboardError::InvalidArgument(format!(
                "month must be 1-12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Whether `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DashboardError::InvalidArgument(format!("expected YYYY-MM, got {:?}", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = DashboardError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// TransactionRecord: One row of the transactions sheet
// ---------------------------------------------------------------------------

/// A single sale as loaded from the spreadsheet.
///
/// `date` is optional and `quantity` is signed so that malformed source rows
/// can still be represented; the aggregator rejects them with a diagnostic
/// instead of summing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: Option<NaiveDate>,
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub amount: Decimal,
    pub status: Status,
}

impl TransactionRecord {
    pub fn new(
        date: NaiveDate,
        user_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: i64,
        amount: Decimal,
        status: Status,
    ) -> Self {
        Self {
            date: Some(date),
            user_id: user_id.into(),
            product_id: product_id.into(),
            quantity,
            amount,
            status,
        }
    }

    pub fn year_month(&self) -> Option<YearMonth> {
        self.date.map(YearMonth::from_date)
    }
}

// ---------------------------------------------------------------------------
// RowDiagnostic: A spreadsheet row that could not be parsed into a record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiagnostic {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub column: String,
    pub value: Option<String>,
    pub reason: String,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "row {} column {} ({:?}): {}", self.row, self.column, v, self.reason),
            None => write!(f, "row {} column {}: {}", self.row, self.column, self.reason),
        }
    }
}
