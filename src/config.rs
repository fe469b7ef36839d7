use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

pub const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d";

pub const ENV_SHEET_ID: &str = "SHEET_ID";
pub const ENV_SHEET_TRANSACTIONS: &str = "SHEET_TRANSAKSI";
pub const ENV_SHEET_PRODUCTS: &str = "SHEET_PRODUK";

/// Logical view name -> cached CSV file name.
pub fn csv_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("transactions", "transactions.csv"),
        ("products", "products.csv"),
    ])
}

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("sales-dashboard-sdk")
    } else {
        PathBuf::from(".sales-dashboard-cache")
    }
}

// ---------------------------------------------------------------------------
// SheetConfig
// ---------------------------------------------------------------------------

/// Identifies the published spreadsheet and the two sheets the dashboard reads.
///
/// Passed explicitly to the client builder; nothing in the SDK reads the
/// environment behind the caller's back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    pub sheet_id: String,
    /// `gid` of the transactions sheet.
    pub transactions_gid: String,
    /// `gid` of the product stock sheet.
    pub products_gid: String,
}

impl SheetConfig {
    pub fn new(
        sheet_id: impl Into<String>,
        transactions_gid: impl Into<String>,
        products_gid: impl Into<String>,
    ) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            transactions_gid: transactions_gid.into(),
            products_gid: products_gid.into(),
        }
    }

    /// Load from `SHEET_ID`, `SHEET_TRANSAKSI` and `SHEET_PRODUK`.
    ///
    /// A `.env` file in the working directory (or any parent) is loaded
    /// first if present; variables already set in the process win.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Ok(Self {
            sheet_id: require_var(ENV_SHEET_ID)?,
            transactions_gid: require_var(ENV_SHEET_TRANSACTIONS)?,
            products_gid: require_var(ENV_SHEET_PRODUCTS)?,
        })
    }

    /// CSV export URL for a given sheet `gid`.
    pub fn export_url(&self, gid: &str) -> String {
        format!(
            "{}/{}/export?format=csv&gid={}",
            SHEETS_BASE, self.sheet_id, gid
        )
    }

    /// CSV export URL for a logical view (`"transactions"` or `"products"`).
    pub fn view_url(&self, view_name: &str) -> Result<String> {
        match view_name {
            "transactions" => Ok(self.export_url(&self.transactions_gid)),
            "products" => Ok(self.export_url(&self.products_gid)),
            other => Err(DashboardError::NotFound(format!(
                "Unknown sheet view: {}",
                other
            ))),
        }
    }
}

fn require_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(DashboardError::Config(format!(
            "environment variable {} is not set",
            name
        ))),
    }
}
