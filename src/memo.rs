//! Caller-owned memoization of month reports.
//!
//! The aggregator always recomputes; a presentation layer that redraws often
//! can hold a [`ReportMemo`] and key reports on the content of the record set
//! plus the selected month.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::error::Result;
use crate::models::{TransactionRecord, YearMonth};
use crate::report::{build_month_report, MonthReport};

/// Hash of a record set's content, order included.
///
/// Stable within one process only.
pub fn content_hash(records: &[TransactionRecord]) -> u64 {
    let mut hasher = DefaultHasher::new();
    records.hash(&mut hasher);
    hasher.finish()
}

pub struct ReportMemo {
    cache: Cache<(u64, YearMonth), Arc<MonthReport>>,
}

impl ReportMemo {
    /// Memo holding at most `capacity` reports.
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Memo whose entries also expire `ttl` after insertion.
    pub fn with_ttl(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Return the cached report for this input and month, building it on a miss.
    ///
    /// Errors are not cached.
    pub fn get_or_build(
        &self,
        records: &[TransactionRecord],
        year_month: YearMonth,
    ) -> Result<Arc<MonthReport>> {
        let key = (content_hash(records), year_month);
        if let Some(report) = self.cache.get(&key) {
            tracing::debug!(month = %year_month, "report cache hit");
            return Ok(report);
        }

        let report = Arc::new(build_month_report(records, year_month)?);
        self.cache.insert(key, report.clone());
        Ok(report)
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for ReportMemo {
    fn default() -> Self {
        Self::new(64)
    }
}
