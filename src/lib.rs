//! Sales dashboard SDK for Rust.
//!
//! Loads transaction and product rows from a published spreadsheet, caches
//! the CSV exports locally, and queries them in-process via DuckDB. The
//! analytics core ([`aggregate`]) turns transaction records into daily and
//! monthly buckets with period-over-period deltas; it is pure and can be used
//! on its own with records from any source.
//!
//! # Quick start
//!
//! ```no_run
//! use sales_dashboard_sdk::{DashboardClient, SheetConfig};
//!
//! let client = DashboardClient::builder()
//!     .sheets(SheetConfig::from_env().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let monthly = client.monthly().unwrap();
//! for bucket in &monthly.buckets {
//!     println!("{} {} {:?}", bucket.year_month, bucket.total_amount, bucket.delta_pct);
//! }
//!
//! let report = client.month_report("2024-02".parse().unwrap()).unwrap();
//! ```

pub mod aggregate;
#[cfg(feature = "async")]
pub mod async_client;
pub mod breakdown;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod memo;
pub mod models;
pub mod queries;
pub mod report;
pub mod sql_builder;

pub use aggregate::{aggregate_daily, aggregate_monthly, select_month};
#[cfg(feature = "async")]
pub use async_client::AsyncDashboardClient;
pub use cache::CacheManager;
pub use config::SheetConfig;
pub use connection::Connection;
pub use error::{DashboardError, Result};
pub use memo::ReportMemo;
pub use report::{build_month_report, MonthReport};
pub use sql_builder::SqlBuilder;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use models::{DailySeries, MonthlySeries, ProductAvailability, YearMonth};
use queries::Loaded;

// ---------------------------------------------------------------------------
// DashboardClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`DashboardClient`].
///
/// Use [`DashboardClient::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](DashboardClientBuilder::build).
pub struct DashboardClientBuilder {
    sheets: Option<SheetConfig>,
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    max_age: Option<Duration>,
}

impl Default for DashboardClientBuilder {
    fn default() -> Self {
        Self {
            sheets: None,
            cache_dir: None,
            offline: false,
            timeout: Duration::from_secs(60),
            max_age: Some(Duration::from_secs(15 * 60)),
        }
    }
}

impl DashboardClientBuilder {
    /// Set the spreadsheet to download from.
    ///
    /// Required unless the client runs offline against already-cached exports.
    pub fn sheets(mut self, sheets: SheetConfig) -> Self {
        self.sheets = Some(sheets);
        self
    }

    /// Set a custom cache directory.
    ///
    /// If not set, the platform-appropriate default cache directory is used
    /// (e.g. `~/.cache/sales-dashboard-sdk` on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Set the HTTP request timeout for sheet downloads. Defaults to 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Re-download cached exports older than this. Defaults to 15 minutes;
    /// `None` keeps cached files until [`DashboardClient::clear_cache`].
    pub fn max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Build the client, initializing the cache and DuckDB connection.
    ///
    /// Nothing is downloaded here; exports are fetched lazily on first query.
    pub fn build(self) -> Result<DashboardClient> {
        if self.sheets.is_none() && !self.offline {
            return Err(DashboardError::Config(
                "a SheetConfig is required unless offline mode is enabled".into(),
            ));
        }
        let cache = CacheManager::new(self.cache_dir, self.sheets, self.offline, self.timeout)?
            .with_max_age(self.max_age);
        let conn = Connection::new(cache)?;
        Ok(DashboardClient { conn })
    }
}

// ---------------------------------------------------------------------------
// DashboardClient
// ---------------------------------------------------------------------------

/// The main entry point for the sales dashboard SDK.
///
/// Wraps a [`Connection`] (which owns the [`CacheManager`] and DuckDB database)
/// and exposes sheet queries plus the aggregates built on top of them. Every
/// aggregate call reloads the sheet and recomputes from scratch; wrap calls in
/// a [`ReportMemo`] if the caller needs memoization.
pub struct DashboardClient {
    conn: Connection,
}

impl DashboardClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> DashboardClientBuilder {
        DashboardClientBuilder::default()
    }

    /// Wrap an existing connection, e.g. one with tables registered from local CSVs.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the transactions sheet.
    pub fn transactions(&self) -> queries::TransactionQuery<'_> {
        queries::TransactionQuery::new(&self.conn)
    }

    /// Access the product stock sheet.
    pub fn products(&self) -> queries::ProductQuery<'_> {
        queries::ProductQuery::new(&self.conn)
    }

    // -- Aggregates --------------------------------------------------------

    /// Daily quantity and amount totals over every transaction.
    ///
    /// Rows the loader had to skip are logged; records the aggregator
    /// excludes are returned in `diagnostics`.
    pub fn daily(&self) -> Result<DailySeries> {
        let loaded = self.transactions().all()?;
        aggregate_daily(&loaded.records)
    }

    /// Monthly totals with deltas over every transaction.
    pub fn monthly(&self) -> Result<MonthlySeries> {
        let loaded = self.transactions().all()?;
        aggregate_monthly(&loaded.records)
    }

    /// Months present in the sheet, in order of first appearance.
    pub fn months(&self) -> Result<Vec<YearMonth>> {
        let loaded = self.transactions().all()?;
        Ok(breakdown::months(&loaded.records))
    }

    /// Full report for one month.
    pub fn month_report(&self, year_month: YearMonth) -> Result<MonthReport> {
        let loaded = self.transactions().all()?;
        build_month_report(&loaded.records, year_month)
    }

    /// Stock against restock threshold for every product.
    pub fn product_availability(&self) -> Result<Vec<ProductAvailability>> {
        self.products().availability()
    }

    /// Load every transaction, keeping the skipped-row diagnostics.
    pub fn load_transactions(&self) -> Result<Loaded<models::TransactionRecord>> {
        self.transactions().all()
    }

    // -- Metadata and utility methods --------------------------------------

    /// Return the list of currently registered DuckDB view names.
    pub fn views(&self) -> Vec<String> {
        self.conn.views()
    }

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// # Arguments
    ///
    /// * `query` - SQL string with `?` positional placeholders.
    /// * `params` - Parameter values corresponding to the placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Re-register views whose cached export has gone stale.
    ///
    /// Returns `true` if any view was reset (the next query re-downloads),
    /// `false` if everything is fresh or the client is offline.
    pub fn refresh(&self) -> Result<bool> {
        let cache = self.conn.cache.borrow();
        if cache.offline {
            return Ok(false);
        }
        let mut stale = false;
        for view in config::csv_files().keys() {
            let path = cache.csv_path(view)?;
            // A missing export is fetched on first use; nothing to reset.
            if path.exists() && cache.is_stale(&path) {
                stale = true;
            }
        }
        drop(cache);
        if stale {
            self.conn.reset_views();
            tracing::info!("sheet exports are stale; views reset");
        }
        Ok(stale)
    }

    /// Remove cached exports and reset views.
    pub fn clear_cache(&self) -> Result<()> {
        self.conn.cache.borrow().clear()?;
        self.conn.reset_views();
        Ok(())
    }

    /// Consume the client and release all resources.
    pub fn close(self) {
        self.conn.cache.borrow_mut().close();
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for DashboardClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut views = self.conn.views();
        views.sort();
        let cache = self.conn.cache.borrow();
        write!(
            f,
            "DashboardClient(cache_dir={}, views=[{}], offline={})",
            cache.cache_dir.display(),
            views.join(", "),
            cache.offline
        )
    }
}
