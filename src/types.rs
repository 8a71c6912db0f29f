//! Core value types shared across the matching pipeline.

use crate::command::registry::CommandCallback;

/// One candidate transcription of an utterance, normalized for matching
/// (trimmed and lower-cased).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypothesis(String);

impl Hypothesis {
    /// Normalize raw recognizer text into a matchable hypothesis.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Wrap text that is already normalized (used when re-wrapping a
    /// hypothesis the hotword filter has stripped).
    pub(crate) fn from_normalized(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Alternative transcriptions for one utterance, best-confidence first.
/// The order is the tie-break order when command priorities are equal.
pub type HypothesisBatch = Vec<Hypothesis>;

/// Outcome of running one hypothesis batch against the command registry.
#[derive(Clone)]
pub enum MatchOutcome {
    /// No registered command matched any hypothesis.
    NoMatch,

    /// Interim (non-final) batch; no matching was attempted.
    Partial { hypotheses: HypothesisBatch },

    /// A command matched; carries everything needed to dispatch it.
    Matched(CommandMatch),
}

/// The winning command for a finalized hypothesis batch.
#[derive(Clone)]
pub struct CommandMatch {
    /// The hypothesis text that matched.
    pub matched_text: String,

    /// The phrase template the command was registered under.
    pub phrase: String,

    /// Captured parameters in template order. A parameter inside an
    /// omitted optional segment yields an empty string.
    pub parameters: Vec<String>,

    /// Callback registered for the command.
    pub callback: CommandCallback,
}

impl std::fmt::Debug for CommandMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandMatch")
            .field("matched_text", &self.matched_text)
            .field("phrase", &self.phrase)
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hypothesis_normalization() {
        let hyp = Hypothesis::new("  Close Tab  ");
        assert_eq!(hyp.as_str(), "close tab");
    }

    #[test]
    fn test_empty_hypothesis() {
        assert!(Hypothesis::new("   ").is_empty());
        assert!(!Hypothesis::new("hey").is_empty());
    }
}
