//! Best-match selection across a hypothesis batch.
//!
//! This is the algorithmic core: an O(hypotheses x commands) linear scan.
//! Hypotheses are visited in provider-confidence order and commands in
//! registration order; only a strictly greater priority displaces the
//! current best, so ties always favor the first match encountered and the
//! scan needs no sorting.

use std::sync::Arc;

use tracing::debug;

use crate::command::registry::CommandRegistry;
use crate::types::{CommandMatch, Hypothesis, MatchOutcome};

/// Match a hypothesis batch against the registry.
///
/// Interim (non-final) batches are never matched; they produce
/// `MatchOutcome::Partial` so consumers can show live feedback.
pub fn match_batch(
    batch: &[Hypothesis],
    registry: &CommandRegistry,
    is_final: bool,
) -> MatchOutcome {
    if !is_final {
        return MatchOutcome::Partial {
            hypotheses: batch.to_vec(),
        };
    }

    let mut best: Option<CandidateMatch> = None;
    for hypothesis in batch {
        debug!(text = hypothesis.as_str(), "matching hypothesis");
        for (index, command) in registry.commands().iter().enumerate() {
            let Some(parameters) = command.matcher().matches(hypothesis.as_str()) else {
                continue;
            };
            debug!(
                phrase = command.phrase(),
                ?parameters,
                "command matched"
            );
            let priority = command.priority();
            if best.as_ref().map_or(true, |b| priority > b.priority) {
                best = Some(CandidateMatch {
                    index,
                    priority,
                    matched_text: hypothesis.as_str().to_string(),
                    parameters,
                });
            }
        }
    }

    match best {
        Some(candidate) => {
            let command = &registry.commands()[candidate.index];
            MatchOutcome::Matched(CommandMatch {
                matched_text: candidate.matched_text,
                phrase: command.phrase().to_string(),
                parameters: candidate.parameters,
                callback: Arc::clone(command.callback()),
            })
        }
        None => MatchOutcome::NoMatch,
    }
}

struct CandidateMatch {
    index: usize,
    priority: f32,
    matched_text: String,
    parameters: Vec<String>,
}
