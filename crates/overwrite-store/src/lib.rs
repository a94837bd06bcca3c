#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

//! # overwrite-store - Cached command permission overwrites
//!
//! Serves merged allow/deny overwrites per `(scope, command)` from a TTL
//! cache, loading rows from a [`RuleStore`] on a miss.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use overwrite_store::{
//!     InMemoryRuleStore, OverwriteCacheConfig, OverwriteCacheStore, StaticCommandRegistry,
//! };
//!
//! # async fn demo() -> overwrite_store::Result<()> {
//! let store = OverwriteCacheStore::new(
//!     Arc::new(InMemoryRuleStore::new()),
//!     Arc::new(StaticCommandRegistry::from_names(["ban", "kick"])),
//!     &OverwriteCacheConfig::default(),
//! );
//! let _sweeper = store.spawn_sweeper();
//!
//! let overwrites = store.fetch("guild", "ban").await?;
//! assert!(overwrites.is_none());
//! # Ok(())
//! # }
//! ```

pub mod cache_store;
pub mod config;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod rule_store;
pub mod scope_cache;
pub mod sqlite;
pub mod sweeper;

pub use cache_store::{CachedValue, OverwriteCacheStore};
pub use config::OverwriteCacheConfig;
pub use error::{OverwriteCacheError, Result, RuleStoreError};
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use registry::{CommandRegistry, StaticCommandRegistry};
pub use rule_store::{InMemoryRuleStore, RuleStore};
pub use scope_cache::{CacheEntry, ScopeCache};
pub use sqlite::{RuleDb, RuleDbError, SqliteRuleStore};
pub use sweeper::SweeperHandle;

/// Re-export the normalization and merge types
pub mod core {
    pub use overwrite_core::*;
}
