//! Smoke test against a live published spreadsheet.
//!
//! Needs `SHEET_ID`, `SHEET_TRANSAKSI` and `SHEET_PRODUK` in the environment
//! or a `.env` file. Run with:
//! ```sh
//! cargo test --test smoke_test -- --ignored --nocapture
//! ```

use sales_dashboard_sdk::{DashboardClient, ReportMemo, SheetConfig};

#[test]
#[ignore]
fn live_sheet_end_to_end() {
    let sheets = SheetConfig::from_env().expect("sheet config in environment");
    let tmp = tempfile::tempdir().unwrap();
    let client = DashboardClient::builder()
        .sheets(sheets)
        .cache_dir(tmp.path())
        .build()
        .unwrap();

    let loaded = client.load_transactions().unwrap();
    eprintln!(
        "loaded {} transactions, {} rows skipped",
        loaded.records.len(),
        loaded.rejected.len()
    );
    for diag in &loaded.rejected {
        eprintln!("  skipped {}", diag);
    }
    assert!(!loaded.records.is_empty());

    let monthly = client.monthly().unwrap();
    for b in &monthly.buckets {
        eprintln!(
            "  {} total={} delta={:?} pct={:?} {:?}",
            b.year_month,
            b.total_amount,
            b.delta_amount,
            b.delta_pct,
            b.direction()
        );
    }
    assert!(monthly.buckets.windows(2).all(|w| w[0].year_month < w[1].year_month));
    assert!(monthly.buckets[0].delta_amount.is_none());

    let memo = ReportMemo::default();
    for month in client.months().unwrap() {
        let report = memo.get_or_build(&loaded.records, month).unwrap();
        eprintln!(
            "  {}: {} days, {} products, {} customers",
            month,
            report.daily.len(),
            report.products.len(),
            report.customers.len()
        );
    }

    let availability = client.product_availability().unwrap();
    eprintln!("  {} products in stock sheet", availability.len());
}
