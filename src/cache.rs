//! Spreadsheet CSV export download and local file cache manager.
//!
//! Downloads the published transaction and product sheets as CSV and keeps
//! them in a local cache directory. A cached file is considered stale once
//! it is older than the configured maximum age; files are downloaded lazily
//! on first access.

use crate::config::{self, SheetConfig};
use crate::error::{DashboardError, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Downloads and caches spreadsheet CSV exports.
pub struct CacheManager {
    /// Directory where cached files are stored.
    pub cache_dir: PathBuf,
    /// If true, never download (use cached files only).
    pub offline: bool,
    /// Cached files older than this are re-downloaded. `None` never expires.
    pub max_age: Option<Duration>,
    sheets: Option<SheetConfig>,
    timeout: Duration,
    client: Option<Client>,
}

impl CacheManager {
    /// Create a new cache manager.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache directory.
    /// Creates the cache directory if it does not exist. `sheets` may be `None`
    /// for offline use against files that are already cached.
    pub fn new(
        cache_dir: Option<PathBuf>,
        sheets: Option<SheetConfig>,
        offline: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
            max_age: None,
            sheets,
            timeout,
            client: None,
        })
    }

    /// Set the maximum age of a cached file before it is re-downloaded.
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// The spreadsheet this cache downloads from, if configured.
    pub fn sheets(&self) -> Option<&SheetConfig> {
        self.sheets.as_ref()
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            let client = Client::builder()
                .timeout(self.timeout)
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| DashboardError::InvalidArgument("HTTP client unavailable".into()))
    }

    /// Local path for a logical view's cached CSV.
    pub fn csv_path(&self, view_name: &str) -> Result<PathBuf> {
        let files = config::csv_files();
        let filename = files.get(view_name).ok_or_else(|| {
            DashboardError::NotFound(format!("Unknown sheet view: {}", view_name))
        })?;
        Ok(self.cache_dir.join(filename))
    }

    /// Check whether a cached file is missing or older than `max_age`.
    ///
    /// Files whose modification time cannot be read are treated as fresh.
    pub fn is_stale(&self, path: &Path) -> bool {
        if !path.exists() {
            return true;
        }
        let Some(max_age) = self.max_age else {
            return false;
        };
        let age = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok());
        match age {
            Some(age) => age > max_age,
            None => false,
        }
    }

    /// Download a URL to `dest`.
    ///
    /// Writes to a `.csv.tmp` sibling and renames on success; a failed
    /// download never leaves a truncated CSV at `dest`.
    fn download_file(&mut self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!(url, "downloading sheet export");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_dest = dest.with_extension("csv.tmp");

        let client = self.client()?.clone();
        let result = (|| -> Result<()> {
            let resp = client.get(url).send()?.error_for_status()?;
            let bytes = resp.bytes()?;
            fs::write(&tmp_dest, &bytes)?;
            fs::rename(&tmp_dest, dest)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_dest);
        }

        result
    }

    /// Ensure a sheet's CSV export is cached locally, downloading if needed.
    ///
    /// # Arguments
    ///
    /// * `view_name` - Logical view name (`"transactions"` or `"products"`).
    ///
    /// # Returns
    ///
    /// Local filesystem path to the cached CSV file.
    pub fn ensure_csv(&mut self, view_name: &str) -> Result<PathBuf> {
        let local_path = self.csv_path(view_name)?;

        if !self.is_stale(&local_path) {
            return Ok(local_path);
        }

        if self.offline {
            if local_path.exists() {
                tracing::warn!(
                    path = %local_path.display(),
                    "cached sheet is stale but offline mode is enabled; using it anyway"
                );
                return Ok(local_path);
            }
            return Err(DashboardError::NotFound(format!(
                "Sheet {} not cached and offline mode is enabled",
                view_name
            )));
        }

        let url = match &self.sheets {
            Some(sheets) => sheets.view_url(view_name)?,
            None => {
                return Err(DashboardError::Config(format!(
                    "no spreadsheet configured to download {}",
                    view_name
                )))
            }
        };
        self.download_file(&url, &local_path)?;
        Ok(local_path)
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Close the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_cache(dir: &Path) -> CacheManager {
        CacheManager::new(Some(dir.to_path_buf()), None, true, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn missing_file_is_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = offline_cache(tmp.path());
        assert!(cache.is_stale(&tmp.path().join("transactions.csv")));
    }

    #[test]
    fn existing_file_without_max_age_is_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = offline_cache(tmp.path());
        let path = cache.csv_path("transactions").unwrap();
        fs::write(&path, "DATE\n").unwrap();
        assert!(!cache.is_stale(&path));
    }

    #[test]
    fn offline_without_cached_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = offline_cache(tmp.path());
        assert!(matches!(
            cache.ensure_csv("products"),
            Err(DashboardError::NotFound(_))
        ));
    }

    #[test]
    fn offline_uses_stale_cached_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = offline_cache(tmp.path()).with_max_age(Some(Duration::ZERO));
        let path = cache.csv_path("products").unwrap();
        fs::write(&path, "PRODUCT_ID\n").unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.ensure_csv("products").unwrap(), path);
    }

    #[test]
    fn unknown_view_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = offline_cache(tmp.path());
        assert!(matches!(
            cache.csv_path("orders"),
            Err(DashboardError::NotFound(_))
        ));
    }

    #[test]
    fn clear_empties_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = offline_cache(tmp.path());
        let path = cache.csv_path("transactions").unwrap();
        fs::write(&path, "DATE\n").unwrap();
        cache.clear().unwrap();
        assert!(!path.exists());
        assert!(tmp.path().exists());
    }
}
