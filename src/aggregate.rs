//! Time-bucketed aggregation of transaction records.
//!
//! Every function here is a pure transform: the same input slice always
//! produces the same output, nothing is cached, and nothing is mutated.
//! Records with a missing date or a negative quantity are excluded from the
//! sums and reported as [`RecordDiagnostic`]s rather than aborting the run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{DashboardError, Result};
use crate::models::{
    DailyBucket, DailySeries, MonthlyBucket, MonthlySeries, PercentChange, RecordDiagnostic,
    RejectReason, TransactionRecord, YearMonth,
};

/// Group records by calendar date and sum quantity and amount per day.
///
/// Returns [`DashboardError::EmptyInput`] when `records` is empty. If every
/// record is malformed the result has no buckets and one diagnostic per record.
pub fn aggregate_daily(records: &[TransactionRecord]) -> Result<DailySeries> {
    if records.is_empty() {
        return Err(DashboardError::EmptyInput);
    }

    let (valid, mut diagnostics) = validate(records);

    let mut by_day: BTreeMap<NaiveDate, (i64, Decimal)> = BTreeMap::new();
    for (index, date, record) in valid {
        let totals = by_day.entry(date).or_insert((0, Decimal::ZERO));
        match (
            totals.0.checked_add(record.quantity),
            totals.1.checked_add(record.amount),
        ) {
            (Some(quantity), Some(amount)) => *totals = (quantity, amount),
            _ => diagnostics.push(overflow(index, record)),
        }
    }
    diagnostics.sort_by_key(|d| d.index);

    let buckets = by_day
        .into_iter()
        .map(|(date, (total_quantity, total_amount))| DailyBucket {
            date,
            total_quantity,
            total_amount,
        })
        .collect();

    Ok(DailySeries {
        buckets,
        diagnostics,
    })
}

/// Group records by year-month, sum amount, and derive deltas against the
/// preceding month present in the data.
///
/// The first bucket's `delta_amount` and `delta_pct` are `None`. A record
/// whose amount would overflow its month's total is excluded with
/// [`RejectReason::Overflow`].
pub fn aggregate_monthly(records: &[TransactionRecord]) -> Result<MonthlySeries> {
    if records.is_empty() {
        return Err(DashboardError::EmptyInput);
    }

    let (valid, mut diagnostics) = validate(records);

    let mut by_month: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for (index, date, record) in valid {
        let total = by_month
            .entry(YearMonth::from_date(date))
            .or_insert(Decimal::ZERO);
        match total.checked_add(record.amount) {
            Some(sum) => *total = sum,
            None => diagnostics.push(overflow(index, record)),
        }
    }
    diagnostics.sort_by_key(|d| d.index);

    let mut buckets: Vec<MonthlyBucket> = Vec::with_capacity(by_month.len());
    let mut prev: Option<Decimal> = None;
    for (year_month, total_amount) in by_month {
        let (delta_amount, delta_pct) = match prev {
            None => (None, None),
            Some(p) => (
                total_amount.checked_sub(p),
                Some(percent_change(p, total_amount)),
            ),
        };
        buckets.push(MonthlyBucket {
            year_month,
            total_amount,
            delta_amount,
            delta_pct,
        });
        prev = Some(total_amount);
    }

    Ok(MonthlySeries {
        buckets,
        diagnostics,
    })
}

/// Find the bucket for `year_month`.
///
/// Absence is reported as [`DashboardError::NotFound`]; callers should treat
/// it as "no data for this period".
pub fn select_month(monthly: &[MonthlyBucket], year_month: YearMonth) -> Result<&MonthlyBucket> {
    monthly
        .iter()
        .find(|b| b.year_month == year_month)
        .ok_or_else(|| DashboardError::NotFound(format!("no monthly data for {}", year_month)))
}

impl MonthlySeries {
    /// Shorthand for [`select_month`] over this series' buckets.
    pub fn select(&self, year_month: YearMonth) -> Result<&MonthlyBucket> {
        select_month(&self.buckets, year_month)
    }
}

/// Percent change from `prev` to `curr`.
///
/// 0 -> 0 is `Defined(0)`; 0 -> non-zero is `Undefined`. A ratio too large
/// for `Decimal` is also `Undefined`.
pub fn percent_change(prev: Decimal, curr: Decimal) -> PercentChange {
    if prev.is_zero() {
        return if curr.is_zero() {
            PercentChange::Defined(Decimal::ZERO)
        } else {
            PercentChange::Undefined
        };
    }
    curr.checked_sub(prev)
        .and_then(|delta| delta.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|scaled| scaled.checked_div(prev))
        .map_or(PercentChange::Undefined, PercentChange::Defined)
}

/// Why a record cannot be summed, if it cannot.
pub(crate) fn reject_reason(record: &TransactionRecord) -> Option<RejectReason> {
    match record.date {
        None => Some(RejectReason::MissingDate),
        Some(_) if record.quantity < 0 => Some(RejectReason::NegativeQuantity(record.quantity)),
        Some(_) => None,
    }
}

fn overflow(index: usize, record: &TransactionRecord) -> RecordDiagnostic {
    tracing::warn!(index, user_id = %record.user_id, "transaction overflows bucket total");
    RecordDiagnostic {
        index,
        record: record.clone(),
        reason: RejectReason::Overflow,
    }
}

/// Split records into (index, date, record) triples fit for summing and
/// diagnostics for the rest.
fn validate(
    records: &[TransactionRecord],
) -> (Vec<(usize, NaiveDate, &TransactionRecord)>, Vec<RecordDiagnostic>) {
    let mut valid = Vec::with_capacity(records.len());
    let mut diagnostics = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match (record.date, reject_reason(record)) {
            (Some(date), None) => valid.push((index, date, record)),
            (_, reason) => {
                let reason = reason.unwrap_or(RejectReason::MissingDate);
                tracing::warn!(index, user_id = %record.user_id, %reason, "excluding transaction from aggregation");
                diagnostics.push(RecordDiagnostic {
                    index,
                    record: record.clone(),
                    reason,
                });
            }
        }
    }

    (valid, diagnostics)
}
