//! Sheet loading through DuckDB: typed records, row diagnostics, filters.

mod common;

use common::{date, setup_sample_db, write_csv_and_register};
use rust_decimal_macros::dec;
use sales_dashboard_sdk::aggregate_monthly;
use sales_dashboard_sdk::models::{PercentChange, RejectReason, Status, YearMonth};
use sales_dashboard_sdk::queries::{ProductQuery, TransactionQuery};
use sales_dashboard_sdk::DashboardError;

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

// ---------------------------------------------------------------------------
// TransactionQuery
// ---------------------------------------------------------------------------

#[test]
fn all_loads_valid_rows_in_sheet_order() {
    let (conn, _tmp) = setup_sample_db();
    let loaded = TransactionQuery::new(&conn).all().unwrap();

    assert_eq!(loaded.records.len(), 6);
    let first = &loaded.records[0];
    assert_eq!(first.date, Some(date("2024-01-05")));
    assert_eq!(first.user_id, "u-01");
    assert_eq!(first.product_id, "a");
    assert_eq!(first.quantity, 2);
    assert_eq!(first.amount, dec!(100));
    assert_eq!(first.status, Status::Basic);

    assert_eq!(loaded.records[1].status, Status::Premium);
}

#[test]
fn all_discards_time_of_day() {
    let (conn, _tmp) = setup_sample_db();
    let loaded = TransactionQuery::new(&conn).all().unwrap();
    let with_time = &loaded.records[3];
    assert_eq!(with_time.user_id, "u-03");
    assert_eq!(with_time.date, Some(date("2024-02-10")));
    assert_eq!(with_time.amount, dec!(20.5));
    assert_eq!(with_time.status, Status::Premium);
}

#[test]
fn all_reports_unparseable_rows() {
    let (conn, _tmp) = setup_sample_db();
    let loaded = TransactionQuery::new(&conn).all().unwrap();

    let rejected: Vec<_> = loaded
        .rejected
        .iter()
        .map(|d| (d.row, d.column.as_str()))
        .collect();
    assert_eq!(
        rejected,
        vec![(5, "USER_ID"), (6, "DATE"), (9, "STATUS")]
    );
    assert_eq!(loaded.rejected[1].value.as_deref(), Some("not-a-date"));
    assert_eq!(loaded.rejected[2].value.as_deref(), Some("gold"));
}

#[test]
fn blank_date_and_negative_quantity_reach_the_aggregator() {
    let (conn, _tmp) = setup_sample_db();
    let loaded = TransactionQuery::new(&conn).all().unwrap();

    let undated = &loaded.records[4];
    assert_eq!(undated.user_id, "u-05");
    assert_eq!(undated.date, None);
    assert_eq!(loaded.records[5].quantity, -1);

    let monthly = aggregate_monthly(&loaded.records).unwrap();
    let reasons: Vec<_> = monthly.diagnostics.iter().map(|d| d.reason.clone()).collect();
    assert_eq!(
        reasons,
        vec![RejectReason::MissingDate, RejectReason::NegativeQuantity(-1)]
    );

    assert_eq!(monthly.buckets.len(), 2);
    assert_eq!(monthly.buckets[0].total_amount, dec!(150));
    assert_eq!(monthly.buckets[1].total_amount, dec!(320.5));
    assert_eq!(monthly.buckets[1].delta_amount, Some(dec!(170.5)));
    assert!(matches!(
        monthly.buckets[1].delta_pct,
        Some(PercentChange::Defined(p)) if p > dec!(113.66) && p < dec!(113.67)
    ));
}

#[test]
fn for_month_filters_on_date_prefix() {
    let (conn, _tmp) = setup_sample_db();
    let query = TransactionQuery::new(&conn);

    let jan = query.for_month(ym("2024-01")).unwrap();
    assert_eq!(jan.records.len(), 2);
    assert!(jan.rejected.is_empty());

    let feb = query.for_month(ym("2024-02")).unwrap();
    assert_eq!(feb.records.len(), 3);
    assert_eq!(feb.rejected.len(), 2);

    let mar = query.for_month(ym("2024-03")).unwrap();
    assert!(mar.records.is_empty());
}

#[test]
fn for_user_matches_trimmed_id() {
    let (conn, _tmp) = setup_sample_db();
    let loaded = TransactionQuery::new(&conn).for_user(" u-01 ").unwrap();
    assert_eq!(loaded.records.len(), 2);
    assert!(loaded.records.iter().all(|r| r.user_id == "u-01"));
}

#[test]
fn count_includes_malformed_rows() {
    let (conn, _tmp) = setup_sample_db();
    assert_eq!(TransactionQuery::new(&conn).count().unwrap(), 9);
}

#[test]
fn missing_column_is_config_error() {
    let (conn, _tmp) = setup_sample_db();
    write_csv_and_register(&conn, "transactions", "DATE,USER_ID\n2024-01-01,u-01\n");
    let err = TransactionQuery::new(&conn).all().unwrap_err();
    match err {
        DashboardError::Config(msg) => {
            assert!(msg.contains("PRODUCT_ID"));
            assert!(msg.contains("NILAI_TRANSAKSI"));
        }
        other => panic!("expected Config error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// ProductQuery
// ---------------------------------------------------------------------------

#[test]
fn list_loads_products_and_rejects_bad_stock() {
    let (conn, _tmp) = setup_sample_db();
    let loaded = ProductQuery::new(&conn).list().unwrap();
    let ids: Vec<_> = loaded.records.iter().map(|p| p.product_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(loaded.rejected.len(), 1);
    assert_eq!(loaded.rejected[0].row, 4);
    assert_eq!(loaded.rejected[0].column, "JUMLAH_DIGUDANG");
}

#[test]
fn get_returns_single_product() {
    let (conn, _tmp) = setup_sample_db();
    let product = ProductQuery::new(&conn).get("b").unwrap();
    assert_eq!(product.in_stock, 5);
    assert_eq!(product.restock_threshold, 10);
}

#[test]
fn get_unknown_product_is_not_found() {
    let (conn, _tmp) = setup_sample_db();
    assert!(matches!(
        ProductQuery::new(&conn).get("zzz"),
        Err(DashboardError::NotFound(_))
    ));
}

#[test]
fn get_malformed_product_is_invalid() {
    let (conn, _tmp) = setup_sample_db();
    assert!(matches!(
        ProductQuery::new(&conn).get("d"),
        Err(DashboardError::InvalidArgument(_))
    ));
}

#[test]
fn get_many_filters_by_id() {
    let (conn, _tmp) = setup_sample_db();
    let loaded = ProductQuery::new(&conn).get_many(&["a", "c"]).unwrap();
    assert_eq!(loaded.records.len(), 2);
    let none = ProductQuery::new(&conn).get_many(&[]).unwrap();
    assert!(none.records.is_empty());
}

#[test]
fn availability_flags_products_at_or_below_threshold() {
    let (conn, _tmp) = setup_sample_db();
    let availability = ProductQuery::new(&conn).availability().unwrap();
    let flags: Vec<_> = availability
        .iter()
        .map(|p| (p.product_id.as_str(), p.needs_restock))
        .collect();
    assert_eq!(flags, vec![("a", false), ("b", true), ("c", true)]);
}
