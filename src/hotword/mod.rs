//! Hotword gating.
//!
//! Outside an active listening window, ambient speech must not be matched
//! against commands. A hypothesis batch only proceeds to matching when a
//! hotword wakes the session or the caller already holds an active
//! listening window.

use tracing::debug;

use crate::types::{Hypothesis, HypothesisBatch};

/// The built-in wake word, always active.
pub const FIXED_HOTWORD: &str = "hey";

/// The wake phrases: the fixed word plus an optional user-configured one.
/// Mutated by settings glue; read-only at match time.
#[derive(Debug, Clone, Default)]
pub struct HotwordSet {
    custom: Option<String>,
}

/// Result of filtering one hypothesis batch.
#[derive(Debug, Clone)]
pub struct HotwordOutcome {
    /// Hypotheses that remain for matching, hotword prefixes stripped.
    pub passed: HypothesisBatch,

    /// A hotword was heard somewhere in the batch.
    pub hotword_triggered: bool,

    /// The batch was dropped: no hotword and no active listening window.
    /// When set, `passed` is empty and no match attempt may occur.
    pub suppressed: bool,
}

impl HotwordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the user-configured wake word. Stored normalized.
    pub fn set_custom(&mut self, word: Option<&str>) {
        self.custom = word
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty());
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        std::iter::once(FIXED_HOTWORD).chain(self.custom.as_deref())
    }

    /// Filter a batch. Hypotheses equal to a hotword are pure wake events
    /// and are consumed; hypotheses starting with `"<hotword> "` are kept
    /// with the prefix stripped; everything else passes unchanged. With no
    /// trigger and no active listening window the whole batch is
    /// suppressed.
    pub fn filter(&self, batch: HypothesisBatch, active_listening: bool) -> HotwordOutcome {
        let mut triggered = false;
        let mut passed: HypothesisBatch = Vec::with_capacity(batch.len());

        'hypotheses: for hypothesis in batch {
            debug!(text = hypothesis.as_str(), "speech recognized");
            for word in self.words() {
                if hypothesis.as_str() == word {
                    // A bare wake word carries no command.
                    triggered = true;
                    continue 'hypotheses;
                }
                if let Some(rest) = hypothesis.as_str().strip_prefix(&format!("{word} ")) {
                    triggered = true;
                    // Recognizers sometimes pad the gap after the wake word.
                    passed.push(Hypothesis::from_normalized(rest.trim_start().to_string()));
                    continue 'hypotheses;
                }
            }
            passed.push(hypothesis);
        }

        if !triggered && !active_listening {
            return HotwordOutcome {
                passed: Vec::new(),
                hotword_triggered: false,
                suppressed: true,
            };
        }

        HotwordOutcome {
            passed,
            hotword_triggered: triggered,
            suppressed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(texts: &[&str]) -> HypothesisBatch {
        texts.iter().map(|t| Hypothesis::new(t)).collect()
    }

    #[test]
    fn test_prefix_is_stripped_and_triggers() {
        let hotwords = HotwordSet::new();
        let outcome = hotwords.filter(batch(&["hey close tab"]), false);
        assert!(outcome.hotword_triggered);
        assert!(!outcome.suppressed);
        assert_eq!(outcome.passed.len(), 1);
        assert_eq!(outcome.passed[0].as_str(), "close tab");
    }

    #[test]
    fn test_bare_hotword_is_pure_wake_event() {
        let hotwords = HotwordSet::new();
        let outcome = hotwords.filter(batch(&["hey"]), false);
        assert!(outcome.hotword_triggered);
        assert!(outcome.passed.is_empty());
        assert!(!outcome.suppressed);
    }

    #[test]
    fn test_extra_spacing_after_hotword_is_dropped() {
        let hotwords = HotwordSet::new();
        let outcome = hotwords.filter(batch(&["hey  close tab"]), false);
        assert!(outcome.hotword_triggered);
        assert_eq!(outcome.passed[0].as_str(), "close tab");
    }

    #[test]
    fn test_ambient_speech_is_suppressed() {
        let hotwords = HotwordSet::new();
        let outcome = hotwords.filter(batch(&["close tab"]), false);
        assert!(!outcome.hotword_triggered);
        assert!(outcome.suppressed);
        assert!(outcome.passed.is_empty());
    }

    #[test]
    fn test_active_listening_passes_without_hotword() {
        let hotwords = HotwordSet::new();
        let outcome = hotwords.filter(batch(&["close tab"]), true);
        assert!(!outcome.hotword_triggered);
        assert!(!outcome.suppressed);
        assert_eq!(outcome.passed[0].as_str(), "close tab");
    }

    #[test]
    fn test_custom_hotword() {
        let mut hotwords = HotwordSet::new();
        hotwords.set_custom(Some("Jarvis"));
        let outcome = hotwords.filter(batch(&["jarvis close tab"]), false);
        assert!(outcome.hotword_triggered);
        assert_eq!(outcome.passed[0].as_str(), "close tab");

        hotwords.set_custom(None);
        let outcome = hotwords.filter(batch(&["jarvis close tab"]), false);
        assert!(outcome.suppressed);
    }

    #[test]
    fn test_mixed_batch_keeps_other_hypotheses() {
        let hotwords = HotwordSet::new();
        let outcome = hotwords.filter(batch(&["hey", "hey close tab", "close cab"]), false);
        assert!(outcome.hotword_triggered);
        let texts: Vec<&str> = outcome.passed.iter().map(|h| h.as_str()).collect();
        assert_eq!(texts, ["close tab", "close cab"]);
    }

    #[test]
    fn test_hotword_inside_text_does_not_trigger() {
        let hotwords = HotwordSet::new();
        let outcome = hotwords.filter(batch(&["so i said hey there"]), false);
        assert!(!outcome.hotword_triggered);
        assert!(outcome.suppressed);
    }
}
