//! The command registry: compiled phrase matchers plus their callbacks.

use std::sync::Arc;

use regex::Regex;
use tracing::warn;

use crate::pattern::Matcher;

/// Tie-break weight used when a command is registered without an explicit
/// priority. Not a probability; higher wins.
pub const DEFAULT_PRIORITY: f32 = 0.5;

/// Callback invoked with the captured parameters of the winning command.
pub type CommandCallback = Arc<dyn Fn(&[String]) + Send + Sync>;

/// One registered command: the compiled matcher plus registration metadata.
pub struct CompiledCommand {
    matcher: Matcher,
    phrase: String,
    callback: CommandCallback,
    priority: f32,
}

impl CompiledCommand {
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// The phrase template the command was registered under.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn callback(&self) -> &CommandCallback {
        &self.callback
    }

    pub fn priority(&self) -> f32 {
        self.priority
    }
}

impl std::fmt::Debug for CompiledCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledCommand")
            .field("phrase", &self.phrase)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Owns every registered command, in insertion order. Insertion order has
/// no meaning for matching (only priority does); it is kept for
/// diagnostics and deterministic tie-breaking.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<CompiledCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a phrase template and register it with the default priority.
    /// Never fails on valid input; malformed templates compile best-effort.
    pub fn register(&mut self, template: &str, callback: CommandCallback) {
        self.register_with_priority(template, callback, DEFAULT_PRIORITY);
    }

    pub fn register_with_priority(
        &mut self,
        template: &str,
        callback: CommandCallback,
        priority: f32,
    ) {
        self.warn_on_suspect_phrase(template);
        self.commands.push(CompiledCommand {
            matcher: Matcher::compile(template),
            phrase: template.to_string(),
            callback,
            priority,
        });
    }

    /// Register an explicit regex instead of a compiled template. The
    /// phrase is kept for diagnostics and for `unregister`.
    pub fn register_pattern(
        &mut self,
        regex: Regex,
        phrase: &str,
        callback: CommandCallback,
        priority: f32,
    ) {
        self.warn_on_suspect_phrase(phrase);
        self.commands.push(CompiledCommand {
            matcher: Matcher::from_regex(regex),
            phrase: phrase.to_string(),
            callback,
            priority,
        });
    }

    /// Remove the commands registered under the given phrases. Phrases with
    /// no matching entry are ignored.
    pub fn unregister<I, S>(&mut self, phrases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        self.commands
            .retain(|cmd| !phrases.iter().any(|p| p == &cmd.phrase));
    }

    /// Remove every registered command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All commands in insertion order.
    pub fn commands(&self) -> &[CompiledCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    // Diagnostic-only checks carried over from the original registration
    // surface; neither condition is an error at runtime.
    fn warn_on_suspect_phrase(&self, phrase: &str) {
        if phrase.trim() != phrase {
            warn!(phrase, "registering untrimmed phrase");
        }
        if self.commands.iter().any(|cmd| cmd.phrase == phrase) {
            warn!(phrase, "phrase already registered");
        }
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> CommandCallback {
        Arc::new(|_params: &[String]| {})
    }

    #[test]
    fn test_register_and_order() {
        let mut registry = CommandRegistry::new();
        registry.register("close tab", noop());
        registry.register("open tab", noop());

        let phrases: Vec<&str> = registry.commands().iter().map(|c| c.phrase()).collect();
        assert_eq!(phrases, ["close tab", "open tab"]);
        assert_eq!(registry.commands()[0].priority(), DEFAULT_PRIORITY);
    }

    #[test]
    fn test_unregister_subset() {
        let mut registry = CommandRegistry::new();
        registry.register("close tab", noop());
        registry.register("open tab", noop());
        registry.register("new window", noop());

        registry.unregister(["close tab", "new window", "not registered"]);

        let phrases: Vec<&str> = registry.commands().iter().map(|c| c.phrase()).collect();
        assert_eq!(phrases, ["open tab"]);
    }

    #[test]
    fn test_clear() {
        let mut registry = CommandRegistry::new();
        registry.register("close tab", noop());
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_same_callback_many_phrases() {
        let mut registry = CommandRegistry::new();
        let cb = noop();
        registry.register("close tab", Arc::clone(&cb));
        registry.register("close this tab", Arc::clone(&cb));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_pattern_override() {
        let mut registry = CommandRegistry::new();
        let re = regex::RegexBuilder::new("^calculate (january|april) stats$")
            .case_insensitive(true)
            .build()
            .unwrap();
        registry.register_pattern(re, "calculate :quarter stats", noop(), 0.7);

        let cmd = &registry.commands()[0];
        assert_eq!(cmd.phrase(), "calculate :quarter stats");
        assert_eq!(cmd.priority(), 0.7);
        assert!(cmd.matcher().matches("calculate april stats").is_some());
    }
}
