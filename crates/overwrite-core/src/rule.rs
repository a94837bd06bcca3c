//! Raw overwrite rows as handed over by the rule store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which slot an overwrite contributes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverwriteAction {
    Allow,
    Deny,
}

impl OverwriteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
        }
    }
}

impl std::str::FromStr for OverwriteAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALLOW" => Ok(Self::Allow),
            "DENY" => Ok(Self::Deny),
            other => Err(format!("unknown overwrite action {other}")),
        }
    }
}

impl std::fmt::Display for OverwriteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted command permission overwrite.
///
/// Requirement lists are kept as stored so that malformed data is reported
/// per row when the row is normalized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawOverwriteRule {
    pub id: i64,
    pub scope_id: String,
    /// Raw command references; may include aliases or stale names.
    pub commands: Vec<String>,
    pub on_match: OverwriteAction,
    #[serde(default)]
    pub disabled: bool,
    /// Flat list of channel ids.
    #[serde(default)]
    pub required_channels: Option<Value>,
    #[serde(default)]
    pub required_roles: Option<Value>,
    #[serde(default)]
    pub required_permissions: Option<Value>,
    #[serde(default)]
    pub required_system_permissions: Option<Value>,
    #[serde(default)]
    pub required_users: Option<Value>,
    #[serde(default)]
    pub required_level: Option<i32>,
}

impl RawOverwriteRule {
    /// A rule with no requirements.
    pub fn new(
        id: i64,
        scope_id: impl Into<String>,
        commands: impl IntoIterator<Item = impl Into<String>>,
        on_match: OverwriteAction,
    ) -> Self {
        Self {
            id,
            scope_id: scope_id.into(),
            commands: commands.into_iter().map(Into::into).collect(),
            on_match,
            disabled: false,
            required_channels: None,
            required_roles: None,
            required_permissions: None,
            required_system_permissions: None,
            required_users: None,
            required_level: None,
        }
    }

    pub fn with_channels(mut self, value: Value) -> Self {
        self.required_channels = Some(value);
        self
    }

    pub fn with_roles(mut self, value: Value) -> Self {
        self.required_roles = Some(value);
        self
    }

    pub fn with_permissions(mut self, value: Value) -> Self {
        self.required_permissions = Some(value);
        self
    }

    pub fn with_system_permissions(mut self, value: Value) -> Self {
        self.required_system_permissions = Some(value);
        self
    }

    pub fn with_users(mut self, value: Value) -> Self {
        self.required_users = Some(value);
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.required_level = Some(level);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Whether this row targets `command` (exact reference match).
    pub fn targets(&self, command: &str) -> bool {
        self.commands.iter().any(|c| c == command)
    }
}
