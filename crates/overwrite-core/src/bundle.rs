//! Mergeable requirement bundles and the allow/deny pair cached per command.

use serde::{Deserialize, Serialize};

use crate::logic::{concat_list, NormalizedLogic};
use crate::rule::OverwriteAction;

/// Requirements of one or more overwrite rows, in mergeable form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalOverwriteBundle {
    /// Ids of every row folded into this bundle, oldest first.
    pub ids: Vec<i64>,
    /// Flat channel list; merged by concatenation.
    pub required_channels: Option<Vec<String>>,
    pub required_roles: Option<NormalizedLogic<String>>,
    pub required_level: Option<i32>,
    pub required_permissions: Option<NormalizedLogic<String>>,
    pub required_system_permissions: Option<NormalizedLogic<String>>,
    pub required_users: Option<NormalizedLogic<String>>,
}

impl MinimalOverwriteBundle {
    /// Fold a newly normalized bundle into this (existing) one.
    ///
    /// Ids append after the existing ones. Channel lists and OR-groups put
    /// the incoming bundle first. The incoming level wins when set.
    pub fn absorb(self, incoming: MinimalOverwriteBundle) -> Self {
        let existing = self;

        let mut ids = existing.ids;
        ids.extend(incoming.ids);

        Self {
            ids,
            required_channels: concat_list(incoming.required_channels, existing.required_channels),
            required_roles: NormalizedLogic::merge(incoming.required_roles, existing.required_roles),
            required_level: incoming.required_level.or(existing.required_level),
            required_permissions: NormalizedLogic::merge(
                incoming.required_permissions,
                existing.required_permissions,
            ),
            required_system_permissions: NormalizedLogic::merge(
                incoming.required_system_permissions,
                existing.required_system_permissions,
            ),
            required_users: NormalizedLogic::merge(incoming.required_users, existing.required_users),
        }
    }

    pub fn contains_rule(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }
}

/// Merged overwrites for one command in one scope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedOverwrites {
    pub allow: Option<MinimalOverwriteBundle>,
    pub deny: Option<MinimalOverwriteBundle>,
}

impl CachedOverwrites {
    pub fn slot(&self, action: OverwriteAction) -> Option<&MinimalOverwriteBundle> {
        match action {
            OverwriteAction::Allow => self.allow.as_ref(),
            OverwriteAction::Deny => self.deny.as_ref(),
        }
    }

    fn slot_mut(&mut self, action: OverwriteAction) -> &mut Option<MinimalOverwriteBundle> {
        match action {
            OverwriteAction::Allow => &mut self.allow,
            OverwriteAction::Deny => &mut self.deny,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allow.is_none() && self.deny.is_none()
    }

    /// Whether row `id` already contributed to the `action` slot.
    pub fn contains_rule(&self, action: OverwriteAction, id: i64) -> bool {
        self.slot(action).is_some_and(|b| b.contains_rule(id))
    }

    /// Merge `incoming` into the slot selected by `on_match`.
    ///
    /// `existing` of `None` behaves as an entry with both slots empty. An
    /// empty slot takes `incoming` as is; an occupied one absorbs it.
    pub fn merged(
        existing: Option<&CachedOverwrites>,
        incoming: MinimalOverwriteBundle,
        on_match: OverwriteAction,
    ) -> CachedOverwrites {
        let mut updated = existing.cloned().unwrap_or_default();
        let slot = updated.slot_mut(on_match);

        *slot = Some(match slot.take() {
            None => incoming,
            Some(current) => current.absorb(incoming),
        });

        updated
    }
}
