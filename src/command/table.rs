//! Localized command tables.
//!
//! Host applications keep their spoken phrases in a per-language JSON table
//! mapping an action name to the phrase templates that invoke it:
//!
//! ```json
//! { "closeTab": ["close tab", "close this tab"],
//!   "showStats": ["calculate :month stats"] }
//! ```
//!
//! At startup the table is paired with callback bindings and installed into
//! a [`CommandRegistry`].

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::command::registry::{CommandCallback, CommandRegistry, DEFAULT_PRIORITY};
use crate::Result;

/// A parsed `action -> [phrase templates]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandTable(BTreeMap<String, Vec<String>>);

impl CommandTable {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn phrases(&self, action: &str) -> Option<&[String]> {
        self.0.get(action).map(Vec::as_slice)
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Register every bound action's phrases. Table actions without a
    /// binding, and bindings without a table entry, are logged and skipped;
    /// a partially localized table must not take the rest down.
    pub fn install(&self, registry: &mut CommandRegistry, bindings: &[CommandBinding]) {
        for binding in bindings {
            let Some(phrases) = self.phrases(&binding.action) else {
                warn!(action = %binding.action, "binding has no phrases in command table");
                continue;
            };
            for phrase in phrases {
                registry.register_with_priority(
                    phrase,
                    binding.callback.clone(),
                    binding.priority,
                );
            }
        }
        for action in self.actions() {
            if !bindings.iter().any(|b| b.action == action) {
                warn!(action, "command table action has no binding");
            }
        }
    }
}

/// Pairs a table action with the callback to run and its tie-break
/// priority.
#[derive(Clone)]
pub struct CommandBinding {
    pub action: String,
    pub callback: CommandCallback,
    pub priority: f32,
}

impl CommandBinding {
    pub fn new(action: &str, callback: CommandCallback) -> Self {
        Self {
            action: action.to_string(),
            callback,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }
}
