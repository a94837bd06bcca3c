//! Source of raw overwrite rows.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use overwrite_core::RawOverwriteRule;

use crate::error::RuleStoreError;

pub type Result<T> = std::result::Result<T, RuleStoreError>;

/// Read access to persisted overwrite rows.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Every non-disabled row in `scope_id` whose `commands` contains
    /// `command`, in the store's order.
    async fn list_active_rules(&self, scope_id: &str, command: &str) -> Result<Vec<RawOverwriteRule>>;
}

/// Rows held in memory, returned in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    rules: RwLock<Vec<RawOverwriteRule>>,
    queries: AtomicU64,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: impl IntoIterator<Item = RawOverwriteRule>) -> Self {
        Self {
            rules: RwLock::new(rules.into_iter().collect()),
            queries: AtomicU64::new(0),
        }
    }

    /// Add a row, replacing any row with the same id in place.
    pub fn upsert(&self, rule: RawOverwriteRule) {
        let mut rules = self.rules.write().unwrap_or_else(|err| err.into_inner());
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
    }

    pub fn remove(&self, id: i64) -> bool {
        let mut rules = self.rules.write().unwrap_or_else(|err| err.into_inner());
        let before = rules.len();
        rules.retain(|r| r.id != id);
        rules.len() != before
    }

    /// Number of `list_active_rules` calls served so far.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn list_active_rules(&self, scope_id: &str, command: &str) -> Result<Vec<RawOverwriteRule>> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        let rules = self.rules.read().unwrap_or_else(|err| err.into_inner());
        Ok(rules
            .iter()
            .filter(|r| !r.disabled && r.scope_id == scope_id && r.targets(command))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overwrite_core::OverwriteAction;

    #[tokio::test]
    async fn test_filters_scope_command_and_disabled() {
        let store = InMemoryRuleStore::with_rules([
            RawOverwriteRule::new(1, "g1", ["ban", "kick"], OverwriteAction::Allow),
            RawOverwriteRule::new(2, "g1", ["kick"], OverwriteAction::Deny),
            RawOverwriteRule::new(3, "g2", ["ban"], OverwriteAction::Allow),
            RawOverwriteRule::new(4, "g1", ["ban"], OverwriteAction::Allow).disabled(),
            RawOverwriteRule::new(5, "g1", ["ban"], OverwriteAction::Deny),
        ]);

        let ids: Vec<i64> = store
            .list_active_rules("g1", "ban")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 5]);
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let store = InMemoryRuleStore::new();
        store.upsert(RawOverwriteRule::new(1, "g1", ["ban"], OverwriteAction::Allow));
        store.upsert(RawOverwriteRule::new(1, "g1", ["ban"], OverwriteAction::Deny));

        let rules = store.list_active_rules("g1", "ban").await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].on_match, OverwriteAction::Deny);

        assert!(store.remove(1));
        assert!(!store.remove(1));
        assert!(store.list_active_rules("g1", "ban").await.unwrap().is_empty());
    }
}
