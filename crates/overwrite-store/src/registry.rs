//! Resolution of raw command references to registered command names.

use std::collections::HashMap;

/// Maps the command references stored on overwrite rows to the canonical
/// name of the currently registered command.
pub trait CommandRegistry: Send + Sync {
    /// `None` when the reference is stale or unknown.
    fn canonical_name(&self, raw: &str) -> Option<String>;
}

/// Fixed set of commands and aliases, matched case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct StaticCommandRegistry {
    names: HashMap<String, String>,
}

impl StaticCommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` and its aliases. Later registrations win on clashes.
    pub fn register<I, S>(&mut self, name: &str, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical = name.to_string();
        self.names.insert(name.to_lowercase(), canonical.clone());
        for alias in aliases {
            self.names
                .insert(alias.as_ref().to_lowercase(), canonical.clone());
        }
    }

    pub fn with_command<I, S>(mut self, name: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.register(name, aliases);
        self
    }

    /// Registry where every listed name resolves to itself.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name.as_ref(), std::iter::empty::<&str>());
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl CommandRegistry for StaticCommandRegistry {
    fn canonical_name(&self, raw: &str) -> Option<String> {
        self.names.get(&raw.trim().to_lowercase()).cloned()
    }
}
