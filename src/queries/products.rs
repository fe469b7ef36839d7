//! Product stock queries against the DuckDB `products` view.

use crate::breakdown::product_availability;
use crate::connection::{Connection, ROW_NUMBER_COLUMN};
use crate::error::{DashboardError, Result};
use crate::models::{ProductAvailability, ProductRecord, RowDiagnostic};
use crate::sql_builder::{quote_ident, SqlBuilder};

use super::{collect_rows, diagnostic, parse_integer, require_columns, required_cell, Loaded, Row};

pub const COL_PRODUCT_ID: &str = "PRODUCT_ID";
pub const COL_IN_STOCK: &str = "JUMLAH_DIGUDANG";
pub const COL_RESTOCK_THRESHOLD: &str = "HARUS_RESTOCK_BILA_JUMLAH_GUDANG_TERSISA";

const VIEW: &str = "products";
const COLUMNS: [&str; 3] = [COL_PRODUCT_ID, COL_IN_STOCK, COL_RESTOCK_THRESHOLD];

// ---------------------------------------------------------------------------
// ProductQuery
// ---------------------------------------------------------------------------

/// Query interface for the product stock sheet.
pub struct ProductQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ProductQuery<'a> {
    /// Create a new `ProductQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load every product in sheet order.
    pub fn list(&self) -> Result<Loaded<ProductRecord>> {
        self.load(SqlBuilder::new(VIEW))
    }

    /// Load a single product by id.
    pub fn get(&self, product_id: &str) -> Result<ProductRecord> {
        let column = format!("TRIM({})", quote_ident(COL_PRODUCT_ID));
        let mut qb = SqlBuilder::new(VIEW);
        qb.where_eq(&column, product_id.trim()).limit(1);
        let loaded = self.load(qb)?;
        if let Some(diag) = loaded.rejected.into_iter().next() {
            return Err(DashboardError::InvalidArgument(format!(
                "product {}: {}",
                product_id, diag
            )));
        }
        loaded
            .records
            .into_iter()
            .next()
            .ok_or_else(|| DashboardError::NotFound(format!("product {}", product_id)))
    }

    /// Load products whose id is in `product_ids`.
    pub fn get_many(&self, product_ids: &[&str]) -> Result<Loaded<ProductRecord>> {
        let column = format!("TRIM({})", quote_ident(COL_PRODUCT_ID));
        let mut qb = SqlBuilder::new(VIEW);
        qb.where_in(&column, product_ids);
        self.load(qb)
    }

    /// Stock against restock threshold for every valid product row.
    pub fn availability(&self) -> Result<Vec<ProductAvailability>> {
        let loaded = self.list()?;
        Ok(product_availability(&loaded.records))
    }

    fn load(&self, mut qb: SqlBuilder) -> Result<Loaded<ProductRecord>> {
        self.conn.ensure_views(&[VIEW])?;
        require_columns(self.conn, VIEW, &COLUMNS)?;

        let order = format!("{} ASC", quote_ident(ROW_NUMBER_COLUMN));
        let (sql, params) = qb.order_by(&[order.as_str()]).build();
        let rows = self.conn.execute(&sql, &params)?;
        Ok(collect_rows(VIEW, rows, row_to_product))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_product(row_no: usize, row: &Row) -> std::result::Result<ProductRecord, RowDiagnostic> {
    let product_id = required_cell(row, row_no, COL_PRODUCT_ID)?;

    let raw = required_cell(row, row_no, COL_IN_STOCK)?;
    let in_stock = parse_integer(raw)
        .ok_or_else(|| diagnostic(row_no, COL_IN_STOCK, Some(raw), "expected a whole number"))?;

    let raw = required_cell(row, row_no, COL_RESTOCK_THRESHOLD)?;
    let restock_threshold = parse_integer(raw).ok_or_else(|| {
        diagnostic(row_no, COL_RESTOCK_THRESHOLD, Some(raw), "expected a whole number")
    })?;

    Ok(ProductRecord {
        product_id: product_id.to_string(),
        in_stock,
        restock_threshold,
    })
}
