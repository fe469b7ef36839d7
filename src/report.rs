//! One-month dashboard snapshot composed from the aggregator and breakdowns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate_daily, aggregate_monthly};
use crate::breakdown::{customer_distribution, filter_month, month_total, product_performance};
use crate::error::Result;
use crate::models::{
    CustomerTotal, DailyBucket, MonthlyBucket, ProductSales, RecordDiagnostic, TransactionRecord,
    YearMonth,
};

/// Everything the dashboard shows for a selected month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthReport {
    pub year_month: YearMonth,
    pub total_amount: Decimal,
    /// The month's bucket, deltas computed against the whole input.
    pub monthly: MonthlyBucket,
    pub daily: Vec<DailyBucket>,
    pub products: Vec<ProductSales>,
    pub customers: Vec<CustomerTotal>,
    /// Records excluded anywhere in the input, not just this month.
    pub diagnostics: Vec<RecordDiagnostic>,
}

/// Build the report for `year_month` from the full record set.
///
/// Fails with `EmptyInput` on empty input and `NotFound` when the month has
/// no valid records.
pub fn build_month_report(
    records: &[TransactionRecord],
    year_month: YearMonth,
) -> Result<MonthReport> {
    let monthly = aggregate_monthly(records)?;
    let bucket = monthly.select(year_month)?.clone();

    let in_month = filter_month(records, year_month);
    let daily = aggregate_daily(&in_month)?;

    Ok(MonthReport {
        year_month,
        total_amount: month_total(records, year_month),
        monthly: bucket,
        daily: daily.buckets,
        products: product_performance(&in_month),
        customers: customer_distribution(&in_month),
        diagnostics: monthly.diagnostics,
    })
}
