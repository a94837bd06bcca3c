//! Minimal Prometheus-style metrics (no external deps).

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one overwrite cache.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    store_queries: AtomicU64,
    rows_merged: AtomicU64,
    rows_skipped_malformed: AtomicU64,
    fanout_skipped_unresolved: AtomicU64,
    entries_written: AtomicU64,
    entries_swept: AtomicU64,
}

/// Point-in-time copy of [`CacheMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub store_queries: u64,
    pub rows_merged: u64,
    pub rows_skipped_malformed: u64,
    pub fanout_skipped_unresolved: u64,
    pub entries_written: u64,
    pub entries_swept: u64,
}

impl CacheMetrics {
    pub fn inc_lookup(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inc_store_query(&self) {
        self.store_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_row_merged(&self) {
        self.rows_merged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_row_skipped(&self) {
        self.rows_skipped_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fanout_skipped(&self) {
        self.fanout_skipped_unresolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_entry_written(&self) {
        self.entries_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_swept(&self, count: usize) {
        self.entries_swept.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            store_queries: self.store_queries.load(Ordering::Relaxed),
            rows_merged: self.rows_merged.load(Ordering::Relaxed),
            rows_skipped_malformed: self.rows_skipped_malformed.load(Ordering::Relaxed),
            fanout_skipped_unresolved: self.fanout_skipped_unresolved.load(Ordering::Relaxed),
            entries_written: self.entries_written.load(Ordering::Relaxed),
            entries_swept: self.entries_swept.load(Ordering::Relaxed),
        }
    }

    pub fn render(&self, cached_entries: usize) -> String {
        let s = self.snapshot();
        let mut out = String::new();

        let mut metric = |name: &str, kind: &str, help: &str, value: u64| {
            out.push_str(&format!("# HELP {name} {help}\n"));
            out.push_str(&format!("# TYPE {name} {kind}\n"));
            out.push_str(&format!("{name} {value}\n"));
        };

        metric(
            "overwrite_cache_entries",
            "gauge",
            "Entries currently held, fresh or stale.",
            cached_entries as u64,
        );
        metric(
            "overwrite_cache_hits_total",
            "counter",
            "Lookups answered from a fresh entry.",
            s.hits,
        );
        metric(
            "overwrite_cache_misses_total",
            "counter",
            "Lookups that found no fresh entry.",
            s.misses,
        );
        metric(
            "overwrite_cache_store_queries_total",
            "counter",
            "Queries issued to the rule store.",
            s.store_queries,
        );
        metric(
            "overwrite_cache_rows_merged_total",
            "counter",
            "Overwrite rows normalized and merged.",
            s.rows_merged,
        );
        metric(
            "overwrite_cache_rows_skipped_total",
            "counter",
            "Overwrite rows skipped because they failed validation.",
            s.rows_skipped_malformed,
        );
        metric(
            "overwrite_cache_fanout_unresolved_total",
            "counter",
            "Command references that did not resolve to a registered command.",
            s.fanout_skipped_unresolved,
        );
        metric(
            "overwrite_cache_writes_total",
            "counter",
            "Entries written.",
            s.entries_written,
        );
        metric(
            "overwrite_cache_swept_total",
            "counter",
            "Expired entries removed by sweeps.",
            s.entries_swept,
        );

        out
    }
}
