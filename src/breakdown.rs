//! Per-period breakdowns shown next to the monthly figures.
//!
//! Like the aggregator these are pure functions over record slices. Records
//! the aggregator would reject (missing date, negative quantity) are skipped
//! silently here, as are records that would overflow a running total; run
//! [`aggregate_monthly`](crate::aggregate::aggregate_monthly) to get the
//! diagnostics for them.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::aggregate::reject_reason;
use crate::models::{
    CustomerTotal, ProductAvailability, ProductRecord, ProductSales, Status, TransactionRecord,
    YearMonth,
};

fn valid(records: &[TransactionRecord]) -> impl Iterator<Item = &TransactionRecord> {
    records.iter().filter(|r| reject_reason(r).is_none())
}

/// Distinct months in the order they first appear in `records`.
pub fn months(records: &[TransactionRecord]) -> Vec<YearMonth> {
    let mut seen = HashSet::new();
    valid(records)
        .filter_map(|r| r.year_month())
        .filter(|ym| seen.insert(*ym))
        .collect()
}

/// Records dated inside `year_month`.
pub fn filter_month(records: &[TransactionRecord], year_month: YearMonth) -> Vec<TransactionRecord> {
    valid(records)
        .filter(|r| r.year_month() == Some(year_month))
        .cloned()
        .collect()
}

/// Total transaction amount inside `year_month`; zero when there is none.
pub fn month_total(records: &[TransactionRecord], year_month: YearMonth) -> Decimal {
    valid(records)
        .filter(|r| r.year_month() == Some(year_month))
        .fold(Decimal::ZERO, |total, r| {
            total.checked_add(r.amount).unwrap_or(total)
        })
}

/// Spend per (customer, status), highest spend first.
///
/// Each distinct customer gets a 1-based rank in that order; a customer that
/// appears under both statuses keeps the rank of their first (larger) entry.
pub fn customer_distribution(records: &[TransactionRecord]) -> Vec<CustomerTotal> {
    let mut totals: HashMap<(&str, Status), (i64, Decimal)> = HashMap::new();
    for r in valid(records) {
        let entry = totals
            .entry((r.user_id.as_str(), r.status))
            .or_insert((0, Decimal::ZERO));
        if let (Some(quantity), Some(amount)) =
            (entry.0.checked_add(r.quantity), entry.1.checked_add(r.amount))
        {
            *entry = (quantity, amount);
        }
    }

    let mut rows: Vec<_> = totals.into_iter().collect();
    rows.sort_by(|((ua, sa), (_, aa)), ((ub, sb), (_, ab))| {
        ab.cmp(aa).then_with(|| ua.cmp(ub)).then_with(|| sa.cmp(sb))
    });

    let mut ranks: HashMap<&str, usize> = HashMap::new();
    rows.into_iter()
        .map(|((user_id, status), (total_quantity, total_amount))| {
            let next = ranks.len() + 1;
            let rank = *ranks.entry(user_id).or_insert(next);
            CustomerTotal {
                rank,
                user_id: user_id.to_string(),
                status,
                total_quantity,
                total_amount,
            }
        })
        .collect()
}

/// Units sold per product, best seller first (ties broken by product id).
pub fn product_performance(records: &[TransactionRecord]) -> Vec<ProductSales> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for r in valid(records) {
        let total = totals.entry(r.product_id.as_str()).or_insert(0);
        *total = total.checked_add(r.quantity).unwrap_or(*total);
    }

    let mut out: Vec<ProductSales> = totals
        .into_iter()
        .map(|(product_id, total_quantity)| ProductSales {
            product_id: product_id.to_string(),
            total_quantity,
        })
        .collect();
    out.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    out
}

/// Warehouse stock against restock threshold, in sheet order.
pub fn product_availability(products: &[ProductRecord]) -> Vec<ProductAvailability> {
    products
        .iter()
        .map(|p| ProductAvailability {
            product_id: p.product_id.clone(),
            in_stock: p.in_stock,
            restock_threshold: p.restock_threshold,
            needs_restock: p.in_stock <= p.restock_threshold,
        })
        .collect()
}
