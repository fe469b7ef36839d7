//! Transaction queries against the DuckDB `transactions` view.

use crate::connection::{Connection, ROW_NUMBER_COLUMN};
use crate::error::Result;
use crate::models::{RowDiagnostic, Status, TransactionRecord, YearMonth};
use crate::sql_builder::{quote_ident, SqlBuilder};

use super::{
    cell, collect_rows, diagnostic, parse_amount, parse_date, parse_integer, require_columns,
    required_cell, Loaded, Row,
};

pub const COL_DATE: &str = "DATE";
pub const COL_USER_ID: &str = "USER_ID";
pub const COL_PRODUCT_ID: &str = "PRODUCT_ID";
pub const COL_QUANTITY: &str = "QUANTITY";
pub const COL_AMOUNT: &str = "NILAI_TRANSAKSI";
pub const COL_STATUS: &str = "STATUS";

const VIEW: &str = "transactions";
const COLUMNS: [&str; 6] = [
    COL_DATE,
    COL_USER_ID,
    COL_PRODUCT_ID,
    COL_QUANTITY,
    COL_AMOUNT,
    COL_STATUS,
];

// ---------------------------------------------------------------------------
// TransactionQuery
// ---------------------------------------------------------------------------

/// Query interface for the transactions sheet.
pub struct TransactionQuery<'a> {
    conn: &'a Connection,
}

impl<'a> TransactionQuery<'a> {
    /// Create a new `TransactionQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load every transaction in sheet order.
    pub fn all(&self) -> Result<Loaded<TransactionRecord>> {
        self.load(SqlBuilder::new(VIEW))
    }

    /// Load transactions whose `DATE` text starts with the given month.
    ///
    /// Rows with an unparseable or missing date never match.
    pub fn for_month(&self, year_month: YearMonth) -> Result<Loaded<TransactionRecord>> {
        let prefix = format!("{}-%", year_month);
        let condition = format!("TRIM({}) LIKE ?", quote_ident(COL_DATE));
        let mut qb = SqlBuilder::new(VIEW);
        qb.where_clause(&condition, &[prefix.as_str()]);
        self.load(qb)
    }

    /// Load all transactions made by one customer.
    pub fn for_user(&self, user_id: &str) -> Result<Loaded<TransactionRecord>> {
        let column = format!("TRIM({})", quote_ident(COL_USER_ID));
        let mut qb = SqlBuilder::new(VIEW);
        qb.where_eq(&column, user_id.trim());
        self.load(qb)
    }

    /// Number of data rows in the sheet, malformed ones included.
    pub fn count(&self) -> Result<i64> {
        self.conn.ensure_views(&[VIEW])?;
        let (sql, params) = SqlBuilder::new(VIEW).select(&["COUNT(*)"]).build();
        let value = self.conn.execute_scalar(&sql, &params)?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    fn load(&self, mut qb: SqlBuilder) -> Result<Loaded<TransactionRecord>> {
        self.conn.ensure_views(&[VIEW])?;
        require_columns(self.conn, VIEW, &COLUMNS)?;

        let order = format!("{} ASC", quote_ident(ROW_NUMBER_COLUMN));
        let (sql, params) = qb.order_by(&[order.as_str()]).build();
        let rows = self.conn.execute(&sql, &params)?;

        let loaded = collect_rows(VIEW, rows, row_to_transaction);
        tracing::debug!(
            loaded = loaded.records.len(),
            rejected = loaded.rejected.len(),
            "loaded transactions"
        );
        Ok(loaded)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert one sheet row into a record.
///
/// A blank date is kept as `None` and a negative quantity is kept as is, so
/// the aggregator can report them; anything unparseable is rejected here.
fn row_to_transaction(row_no: usize, row: &Row) -> std::result::Result<TransactionRecord, RowDiagnostic> {
    let date = match cell(row, COL_DATE) {
        None => None,
        Some(raw) => Some(
            parse_date(raw)
                .ok_or_else(|| diagnostic(row_no, COL_DATE, Some(raw), "expected YYYY-MM-DD"))?,
        ),
    };

    let user_id = required_cell(row, row_no, COL_USER_ID)?;
    let product_id = required_cell(row, row_no, COL_PRODUCT_ID)?;

    let raw = required_cell(row, row_no, COL_QUANTITY)?;
    let quantity = parse_integer(raw)
        .ok_or_else(|| diagnostic(row_no, COL_QUANTITY, Some(raw), "expected a whole number"))?;

    let raw = required_cell(row, row_no, COL_AMOUNT)?;
    let amount = parse_amount(raw)
        .ok_or_else(|| diagnostic(row_no, COL_AMOUNT, Some(raw), "expected a decimal amount"))?;

    let raw = required_cell(row, row_no, COL_STATUS)?;
    let status: Status = raw
        .parse()
        .map_err(|_| diagnostic(row_no, COL_STATUS, Some(raw), "expected basic or premium"))?;

    Ok(TransactionRecord {
        date,
        user_id: user_id.to_string(),
        product_id: product_id.to_string(),
        quantity,
        amount,
        status,
    })
}
