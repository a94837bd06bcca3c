//! Cached, merged command permission overwrites per scope.
//!
//! A miss loads every active row for the requested command and merges each
//! row into the entry of *every* command the row references, so one query
//! warms the cache for related commands too.

use std::collections::HashMap;
use std::sync::Arc;

use overwrite_core::{normalize, CachedOverwrites, RawOverwriteRule};
use tokio::time::Duration;

use crate::config::OverwriteCacheConfig;
use crate::error::{OverwriteCacheError, Result};
use crate::metrics::CacheMetrics;
use crate::registry::CommandRegistry;
use crate::rule_store::RuleStore;
use crate::scope_cache::ScopeCache;
use crate::sweeper::SweeperHandle;

/// What the cache holds per `(scope, command)`.
///
/// `None` records that the lookup ran and nothing matched.
pub type CachedValue = Option<Arc<CachedOverwrites>>;

/// Per-fetch working copy of one command's entry.
struct StagedEntry {
    value: Arc<CachedOverwrites>,
    dirty: bool,
}

pub struct OverwriteCacheStore {
    rules: Arc<dyn RuleStore>,
    registry: Arc<dyn CommandRegistry>,
    cache: Arc<ScopeCache<CachedValue>>,
    metrics: Arc<CacheMetrics>,
    ttl: Duration,
    sweep_interval: Option<Duration>,
}

impl OverwriteCacheStore {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        registry: Arc<dyn CommandRegistry>,
        config: &OverwriteCacheConfig,
    ) -> Self {
        Self {
            rules,
            registry,
            cache: Arc::new(ScopeCache::new(config.max_entries)),
            metrics: Arc::new(CacheMetrics::default()),
            ttl: config.ttl(),
            sweep_interval: config.sweep_interval(),
        }
    }

    pub fn cache(&self) -> &Arc<ScopeCache<CachedValue>> {
        &self.cache
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Merged overwrites for `command` in `scope_id`.
    ///
    /// Fresh entries (including a cached "nothing matched") are returned
    /// without touching the rule store. Store failures propagate and leave
    /// the cache untouched.
    pub async fn fetch(&self, scope_id: &str, command: &str) -> Result<CachedValue> {
        if let Some(value) = self.cache.get_fresh(scope_id, command, self.ttl) {
            self.metrics.inc_lookup(true);
            tracing::debug!(scope_id, command, "Overwrite cache hit");
            return Ok(value);
        }
        self.metrics.inc_lookup(false);

        self.metrics.inc_store_query();
        let rules = self
            .rules
            .list_active_rules(scope_id, command)
            .await
            .map_err(|source| OverwriteCacheError::Store {
                scope_id: scope_id.to_string(),
                command: command.to_string(),
                source,
            })?;

        tracing::debug!(scope_id, command, rows = rules.len(), "Overwrite cache miss");

        if rules.is_empty() {
            self.write(scope_id, command, None);
            return Ok(None);
        }

        let mut staged = HashMap::new();
        for rule in &rules {
            self.merge_rule(scope_id, rule, &mut staged);
        }

        // The requested entry is written last so a bounded cache that clears
        // on overflow keeps it.
        let requested = staged.remove(command);
        for (name, entry) in staged {
            if entry.dirty {
                self.write(scope_id, &name, Some(entry.value));
            }
        }

        Ok(requested.map(|entry| {
            if entry.dirty {
                self.write(scope_id, command, Some(entry.value.clone()));
            }
            entry.value
        }))
    }

    /// Merge one row into the staged entry of every command it references.
    ///
    /// Entries are seeded once per command from the fresh cache value, so
    /// every row of this fetch lands in the same entry whatever the cache
    /// does in between.
    fn merge_rule(
        &self,
        scope_id: &str,
        rule: &RawOverwriteRule,
        staged: &mut HashMap<String, StagedEntry>,
    ) {
        let bundle = match normalize(rule) {
            Ok(bundle) => bundle,
            Err(err) => {
                self.metrics.inc_row_skipped();
                tracing::warn!(
                    scope_id,
                    rule_id = rule.id,
                    error = %err,
                    "Skipping malformed command permission overwrite"
                );
                return;
            }
        };
        self.metrics.inc_row_merged();

        for raw_name in &rule.commands {
            let Some(name) = self.registry.canonical_name(raw_name) else {
                self.metrics.inc_fanout_skipped();
                tracing::debug!(
                    scope_id,
                    rule_id = rule.id,
                    command = %raw_name,
                    "Overwrite references an unknown command"
                );
                continue;
            };

            let entry = staged.entry(name).or_insert_with_key(|name| StagedEntry {
                value: self
                    .cache
                    .get_fresh(scope_id, name, self.ttl)
                    .flatten()
                    .unwrap_or_default(),
                dirty: false,
            });

            // Already folded in (duplicate reference or an earlier fetch).
            if entry.value.contains_rule(rule.on_match, rule.id) {
                continue;
            }

            entry.value = Arc::new(CachedOverwrites::merged(
                Some(entry.value.as_ref()),
                bundle.clone(),
                rule.on_match,
            ));
            entry.dirty = true;
        }
    }

    fn write(&self, scope_id: &str, command: &str, value: CachedValue) {
        self.cache.set(scope_id, command, value);
        self.metrics.inc_entry_written();
    }

    /// Drop the entry for one command; the next fetch reloads it.
    pub fn invalidate(&self, scope_id: &str, command: &str) -> bool {
        self.cache.remove(scope_id, command)
    }

    /// Drop every entry of a scope, e.g. after its overwrites changed.
    pub fn invalidate_scope(&self, scope_id: &str) -> usize {
        let removed = self.cache.clear_scope(scope_id);
        tracing::debug!(scope_id, removed, "Invalidated overwrite cache scope");
        removed
    }

    /// Remove expired entries now; returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.cache.sweep_expired(self.ttl);
        self.metrics.add_swept(removed);
        removed
    }

    /// Start the periodic sweeper, unless disabled in the configuration.
    pub fn spawn_sweeper(&self) -> Option<SweeperHandle> {
        let interval = self.sweep_interval?;
        Some(SweeperHandle::start(
            self.cache.clone(),
            self.ttl,
            interval,
            self.metrics.clone(),
        ))
    }

    /// Prometheus text exposition of this cache's counters.
    pub fn render_metrics(&self) -> String {
        self.metrics.render(self.cache.len())
    }
}
