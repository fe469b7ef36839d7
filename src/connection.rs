//! DuckDB connection wrapper with view registration and query execution.
//!
//! Cached sheet exports are exposed as views over `read_csv`. Every column is
//! read as VARCHAR so that type conversion, and the per-row diagnostics that
//! come with it, happen in Rust rather than failing the whole scan.

use crate::cache::CacheManager;
use crate::error::{DashboardError, Result};
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Wraps a DuckDB connection and registers cached CSV exports as views.
pub struct Connection {
    conn: DuckDbConnection,
    /// The cache manager used to download/locate sheet exports.
    pub cache: RefCell<CacheManager>,
    registered_views: RefCell<HashSet<String>>,
    /// Tables loaded from local CSVs; they outlive [`Connection::reset_views`].
    local_tables: RefCell<HashSet<String>>,
}

impl Connection {
    /// Create a connection backed by the given cache.
    ///
    /// Opens an in-memory DuckDB database.
    pub fn new(cache: CacheManager) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            cache: RefCell::new(cache),
            registered_views: RefCell::new(HashSet::new()),
            local_tables: RefCell::new(HashSet::new()),
        })
    }

    /// Ensure one or more views are registered, downloading data if needed.
    pub fn ensure_views(&self, views: &[&str]) -> Result<()> {
        for name in views {
            if !self.is_registered(name) {
                self.ensure_view(name)?;
            }
        }
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the query has run
        let (column_names, column_count) = {
            let stmt = rows_result.as_ref().ok_or_else(|| {
                DashboardError::InvalidArgument("query produced no statement".into())
            })?;
            let names: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect();
            (names, stmt.column_count())
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_count);
            for (i, col_name) in column_names.iter().enumerate() {
                let value = convert_value_ref(row.get_ref(i)?);
                map.insert(col_name.clone(), value);
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            let value = convert_value_ref(row.get_ref(0)?);
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    /// Column names of a registered view or table, in declaration order.
    pub fn columns(&self, name: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT column_name FROM (DESCRIBE {})", name))?;
        let mut rows = stmt.query([])?;
        let mut cols = Vec::new();
        while let Some(row) = rows.next()? {
            let col: String = row.get(0)?;
            cols.push(col);
        }
        Ok(cols)
    }

    /// Create a DuckDB table from a CSV file with a header row.
    ///
    /// Columns are read as VARCHAR, matching the views created for cached
    /// sheet exports. Used to load local exports and test fixtures.
    pub fn register_table_from_csv(&self, table_name: &str, csv_path: &str) -> Result<()> {
        let path_fwd = csv_path.replace('\\', "/");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT * FROM {}",
            table_name,
            table_name,
            read_csv_expr(&path_fwd)
        ))?;
        self.registered_views.borrow_mut().remove(table_name);
        self.local_tables.borrow_mut().insert(table_name.to_string());
        Ok(())
    }

    /// Return a list of all registered view and table names.
    pub fn views(&self) -> Vec<String> {
        let views = self.registered_views.borrow();
        let tables = self.local_tables.borrow();
        views.union(&tables).cloned().collect()
    }

    /// Forget views over cached exports so they are re-created on next access.
    ///
    /// Tables from [`register_table_from_csv`](Self::register_table_from_csv)
    /// are kept.
    pub fn reset_views(&self) {
        self.registered_views.borrow_mut().clear();
    }

    fn is_registered(&self, name: &str) -> bool {
        self.local_tables.borrow().contains(name) || self.registered_views.borrow().contains(name)
    }

    /// Lazily register a cached sheet export as a DuckDB view.
    fn ensure_view(&self, view_name: &str) -> Result<()> {
        if self.is_registered(view_name) {
            return Ok(());
        }

        let path = self.cache.borrow_mut().ensure_csv(view_name)?;
        let path_str = path.to_string_lossy().replace('\\', "/");

        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM {}",
            view_name,
            read_csv_expr(&path_str)
        ))?;
        self.registered_views.borrow_mut().insert(view_name.to_string());
        tracing::debug!(view = view_name, path = %path_str, "registered view");

        Ok(())
    }
}

/// Column holding the 1-based data row number of every sheet row.
pub const ROW_NUMBER_COLUMN: &str = "__ROW";

/// `SELECT` body numbering rows in file order ahead of the sheet's own columns.
fn read_csv_expr(path: &str) -> String {
    format!(
        "(SELECT row_number() OVER () AS \"{}\", * \
         FROM read_csv('{}', header = true, all_varchar = true))",
        ROW_NUMBER_COLUMN,
        path.replace('\'', "''")
    )
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        _ => serde_json::Value::Null,
    }
}
