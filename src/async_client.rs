//! Async wrapper around [`DashboardClient`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all client operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! sheet downloads and DuckDB queries run.
//!
//! # Example
//!
//! ```no_run
//! use sales_dashboard_sdk::{AsyncDashboardClient, SheetConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AsyncDashboardClient::builder()
//!         .sheets(SheetConfig::from_env().unwrap())
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let monthly = client.monthly().await.unwrap();
//!     let report = client.run(|c| c.month_report("2024-02".parse()?)).await.unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{DashboardError, Result};
use crate::models::{MonthlySeries, YearMonth};
use crate::report::MonthReport;
use crate::{DashboardClient, SheetConfig};

// ---------------------------------------------------------------------------
// AsyncDashboardClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncDashboardClient`].
#[derive(Default)]
pub struct AsyncDashboardClientBuilder {
    sheets: Option<SheetConfig>,
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Option<Duration>,
    max_age: Option<Option<Duration>>,
}

impl AsyncDashboardClientBuilder {
    /// Set the spreadsheet to download from.
    pub fn sheets(mut self, sheets: SheetConfig) -> Self {
        self.sheets = Some(sheets);
        self
    }

    /// Set a custom cache directory.
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Set the HTTP request timeout for sheet downloads.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Re-download cached exports older than this; `None` disables expiry.
    pub fn max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Build the async client.
    ///
    /// Initialization runs on the blocking thread pool so it won't block
    /// the async event loop.
    pub async fn build(self) -> Result<AsyncDashboardClient> {
        tokio::task::spawn_blocking(move || {
            let mut builder = DashboardClient::builder().offline(self.offline);
            if let Some(sheets) = self.sheets {
                builder = builder.sheets(sheets);
            }
            if let Some(dir) = self.cache_dir {
                builder = builder.cache_dir(dir);
            }
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(max_age) = self.max_age {
                builder = builder.max_age(max_age);
            }
            let client = builder.build()?;
            Ok(AsyncDashboardClient::from_client(client))
        })
        .await
        .map_err(|e| DashboardError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncDashboardClient
// ---------------------------------------------------------------------------

/// Async wrapper around [`DashboardClient`].
///
/// The underlying client is protected by a [`Mutex`] since it uses `RefCell`
/// internally; operations are serialised.
pub struct AsyncDashboardClient {
    inner: Arc<Mutex<DashboardClient>>,
}

impl AsyncDashboardClient {
    /// Create a new builder for configuring the async client.
    pub fn builder() -> AsyncDashboardClientBuilder {
        AsyncDashboardClientBuilder::default()
    }

    /// Wrap an already-built client.
    pub fn from_client(client: DashboardClient) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    /// Run a sync client operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DashboardClient) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = client
                .lock()
                .map_err(|_| DashboardError::InvalidArgument("client lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| DashboardError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Monthly totals with deltas.
    pub async fn monthly(&self) -> Result<MonthlySeries> {
        self.run(|c| c.monthly()).await
    }

    /// Full report for one month.
    pub async fn month_report(&self, year_month: YearMonth) -> Result<MonthReport> {
        self.run(move |c| c.month_report(year_month)).await
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |c| c.sql(&query, &params)).await
    }

    /// Re-register views whose cached export has gone stale.
    pub async fn refresh(&self) -> Result<bool> {
        self.run(|c| c.refresh()).await
    }
}
