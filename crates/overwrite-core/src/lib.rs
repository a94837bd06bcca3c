#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

//! # overwrite-core - Command permission overwrite logic
//!
//! Pure building blocks for combining independently authored permission
//! overwrites that target the same command:
//! - [`NormalizedLogic`]: AND/OR requirement trees and their merge rules
//! - [`MinimalOverwriteBundle`]: the mergeable requirements of one or more rows
//! - [`CachedOverwrites`]: the allow/deny pair stored per command
//! - [`normalize`]: raw row to bundle, with per-field validation
//!
//! Nothing here performs I/O or decides access; see `overwrite-store` for
//! the caching layer.
//!
//! ## Quick Start
//!
//! ```rust
//! use overwrite_core::{normalize, CachedOverwrites, OverwriteAction, RawOverwriteRule};
//! use serde_json::json;
//!
//! let first = RawOverwriteRule::new(1, "guild", ["ban"], OverwriteAction::Allow)
//!     .with_roles(json!([["10", "11"]]));
//! let second = RawOverwriteRule::new(2, "guild", ["ban"], OverwriteAction::Allow)
//!     .with_roles(json!(["20"]));
//!
//! let cached = CachedOverwrites::merged(None, normalize(&first).unwrap(), first.on_match);
//! let cached = CachedOverwrites::merged(Some(&cached), normalize(&second).unwrap(), second.on_match);
//!
//! let allow = cached.allow.unwrap();
//! assert_eq!(allow.ids, vec![1, 2]);
//! assert_eq!(allow.required_roles.unwrap().group_count(), 1);
//! ```

pub mod bundle;
pub mod error;
pub mod logic;
pub mod normalize;
pub mod requirement;
pub mod rule;

pub use bundle::{CachedOverwrites, MinimalOverwriteBundle};
pub use error::{Error, RequirementFieldError, RequirementValidationError, Result};
pub use logic::{concat_list, NormalizedLogic};
pub use normalize::normalize;
pub use requirement::{parse_flat_list, parse_requirement_list, RequirementItem, RequirementScalar};
pub use rule::{OverwriteAction, RawOverwriteRule};
