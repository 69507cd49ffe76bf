//! Role descriptors and structured context

use super::prompts::builtin_prompt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable description of one responder role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescriptor {
    /// Unique role name (e.g. "rational", "coder")
    name: String,
    /// Collaborator model identifier
    model: String,
    /// Role-specific system prompt
    prompt: String,
}

impl RoleDescriptor {
    pub fn new(name: impl Into<String>, model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            prompt: prompt.into(),
        }
    }

    /// Descriptor for a built-in role, or `None` if the name is unknown
    pub fn builtin(name: &str, model: &str, sentinel: &str) -> Option<Self> {
        builtin_prompt(name, sentinel).map(|prompt| Self::new(name, model, prompt))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Structured context handed to a role next to its input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleContext {
    entries: BTreeMap<String, String>,
}

impl RoleContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
