//! Shared test fixtures for the sales dashboard SDK integration tests.
//!
//! Provides record builders for the pure analytics tests and
//! `setup_sample_db()`, which creates an in-memory DuckDB connection with
//! small `transactions` and `products` tables loaded from CSV temp files.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sales_dashboard_sdk::models::{Status, TransactionRecord};
use sales_dashboard_sdk::{CacheManager, Connection};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A valid basic-tier transaction.
pub fn tx(day: &str, user: &str, product: &str, quantity: i64, amount: Decimal) -> TransactionRecord {
    TransactionRecord::new(date(day), user, product, quantity, amount, Status::Basic)
}

pub fn premium(day: &str, user: &str, product: &str, quantity: i64, amount: Decimal) -> TransactionRecord {
    TransactionRecord::new(date(day), user, product, quantity, amount, Status::Premium)
}

/// Amount-only transaction for monthly scenarios.
pub fn sale(day: &str, amount: Decimal) -> TransactionRecord {
    tx(day, "u-01", "a", 1, amount)
}

pub const TRANSACTIONS_CSV: &str = "\
DATE,USER_ID,PRODUCT_ID,QUANTITY,NILAI_TRANSAKSI,STATUS
2024-01-05,u-01,a,2,100,basic
2024-01-20,u-02,b,1,50,premium
2024-02-10,u-01,c,3,300,basic
2024-02-10 14:30:00,u-03,a,1,20.5,Premium
2024-02-11,,b,1,10,basic
not-a-date,u-04,b,1,10,basic
,u-05,d,1,10,basic
2024-02-12,u-06,e,-1,10,basic
2024-02-13,u-07,e,1,10,gold
";

pub const PRODUCTS_CSV: &str = "\
PRODUCT_ID,JUMLAH_DIGUDANG,HARUS_RESTOCK_BILA_JUMLAH_GUDANG_TERSISA
a,40,10
b,5,10
c,10,10
d,abc,5
";

/// Create a `Connection` backed by a temporary offline cache directory with
/// the sample transactions and products registered as DuckDB tables.
///
/// The caller must keep the returned `TempDir` alive for the duration of
/// the test.
pub fn setup_sample_db() -> (Connection, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(
        Some(tmp_dir.path().to_path_buf()),
        None,
        true,
        Duration::from_secs(30),
    )
    .unwrap();
    let conn = Connection::new(cache).unwrap();

    write_csv_and_register(&conn, "transactions", TRANSACTIONS_CSV);
    write_csv_and_register(&conn, "products", PRODUCTS_CSV);

    (conn, tmp_dir)
}

/// Write CSV text to a temp file and register it as a DuckDB table.
pub fn write_csv_and_register(conn: &Connection, table_name: &str, csv: &str) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(csv.as_bytes()).unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_table_from_csv(table_name, path).unwrap();
    // The table is materialised, so dropping the temp file here is fine.
}
