//! Unit tests for the SqlBuilder query construction.

use sales_dashboard_sdk::sql_builder::quote_ident;
use sales_dashboard_sdk::SqlBuilder;

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("transactions").build();
    assert_eq!(sql, "SELECT *\nFROM transactions");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("transactions")
        .select(&["\"DATE\"", "\"QUANTITY\""])
        .build();
    assert!(sql.starts_with("SELECT \"DATE\", \"QUANTITY\"\n"));
}

#[test]
fn where_eq_adds_equality_with_param() {
    let (sql, params) = SqlBuilder::new("products")
        .where_eq("\"PRODUCT_ID\"", "a")
        .build();
    assert!(sql.contains("WHERE \"PRODUCT_ID\" = ?"));
    assert_eq!(params, vec!["a"]);
}

#[test]
fn where_in_adds_in_clause() {
    let (sql, params) = SqlBuilder::new("products")
        .where_in("id", &["a", "b", "c"])
        .build();
    assert!(sql.contains("id IN (?, ?, ?)"));
    assert_eq!(params, vec!["a", "b", "c"]);
}

#[test]
fn where_in_empty_produces_false() {
    let (sql, params) = SqlBuilder::new("products").where_in("id", &[]).build();
    assert!(sql.contains("WHERE FALSE"));
    assert!(params.is_empty());
}

#[test]
fn where_clauses_are_and_joined_with_params_in_order() {
    let (sql, params) = SqlBuilder::new("transactions")
        .where_clause("TRIM(\"DATE\") LIKE ?", &["2024-02-%"])
        .where_eq("\"STATUS\"", "premium")
        .build();
    assert!(sql.contains("WHERE TRIM(\"DATE\") LIKE ? AND \"STATUS\" = ?"));
    assert_eq!(params, vec!["2024-02-%", "premium"]);
}

#[test]
fn order_and_limit_come_last() {
    let (sql, _) = SqlBuilder::new("transactions")
        .order_by(&["\"__ROW\" ASC"])
        .limit(10)
        .build();
    assert!(sql.ends_with("ORDER BY \"__ROW\" ASC\nLIMIT 10"));
}

#[test]
fn quote_ident_escapes_quotes() {
    assert_eq!(quote_ident("DATE"), "\"DATE\"");
    assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
}
