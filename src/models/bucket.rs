use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::transaction::{TransactionRecord, YearMonth};

// ---------------------------------------------------------------------------
// PercentChange: Percent delta, or the sentinel for a zero prior total
// ---------------------------------------------------------------------------

/// Percent change against the previous bucket.
///
/// `Undefined` means the previous total was zero while the current one is
/// not, so no finite percentage exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentChange {
    Defined(Decimal),
    Undefined,
}

impl PercentChange {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            PercentChange::Defined(v) => Some(*v),
            PercentChange::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, PercentChange::Undefined)
    }
}

// ---------------------------------------------------------------------------
// DeltaDirection: Sign of a period-over-period change
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaDirection {
    Increase,
    Decrease,
    NoChange,
    /// No previous bucket to compare against.
    Unknown,
}

// ---------------------------------------------------------------------------
// DailyBucket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub total_quantity: i64,
    pub total_amount: Decimal,
}

// ---------------------------------------------------------------------------
// MonthlyBucket
// ---------------------------------------------------------------------------

/// Monthly total with change against the preceding month present in the data.
///
/// Both deltas are `None` for the first bucket of a series. A zero delta is a
/// real value and is never used to stand in for "no previous month".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub year_month: YearMonth,
    pub total_amount: Decimal,
    pub delta_amount: Option<Decimal>,
    pub delta_pct: Option<PercentChange>,
}

impl MonthlyBucket {
    pub fn direction(&self) -> DeltaDirection {
        match self.delta_amount {
            None => DeltaDirection::Unknown,
            Some(d) if d > Decimal::ZERO => DeltaDirection::Increase,
            Some(d) if d < Decimal::ZERO => DeltaDirection::Decrease,
            Some(_) => DeltaDirection::NoChange,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordDiagnostic: A record excluded from aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingDate,
    NegativeQuantity(i64),
    /// Adding the record would overflow its bucket's totals.
    Overflow,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingDate => f.write_str("missing date"),
            RejectReason::NegativeQuantity(q) => write!(f, "negative quantity {}", q),
            RejectReason::Overflow => f.write_str("bucket total overflow"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDiagnostic {
    /// Position of the record in the input slice.
    pub index: usize,
    pub record: TransactionRecord,
    pub reason: RejectReason,
}

// ---------------------------------------------------------------------------
// DailySeries / MonthlySeries: Aggregation results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySeries {
    pub buckets: Vec<DailyBucket>,
    pub diagnostics: Vec<RecordDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub buckets: Vec<MonthlyBucket>,
    pub diagnostics: Vec<RecordDiagnostic>,
}

impl MonthlySeries {
    pub fn months(&self) -> Vec<YearMonth> {
        self.buckets.iter().map(|b| b.year_month).collect()
    }
}
