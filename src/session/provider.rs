//! The boundary to the external speech recognition provider.
//!
//! Acoustic recognition is opaque to this crate: a provider is anything
//! that can be started and stopped and that pushes [`ProviderEvent`]s into
//! the session driver's channel.

use tokio::sync::mpsc;

use crate::Result;

/// One alternative transcription as delivered by the provider, before
/// normalization.
#[derive(Debug, Clone)]
pub struct RawHypothesis {
    pub text: String,
    pub confidence: f32,
}

impl RawHypothesis {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            text: text.to_string(),
            confidence,
        }
    }
}

/// Error classes reported by the provider. Network and permission classes
/// get dedicated session events; everything else only emits the generic
/// error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Network,
    /// Permission denied by the platform or the user.
    NotAllowed,
    /// Recognition service refused (treated like a permission denial).
    ServiceNotAllowed,
    Audio,
    NoSpeech,
    Aborted,
    Other,
}

impl ProviderErrorKind {
    pub fn is_network(self) -> bool {
        matches!(self, Self::Network)
    }

    pub fn is_permission(self) -> bool {
        matches!(self, Self::NotAllowed | Self::ServiceNotAllowed)
    }
}

/// Lifecycle and result events pushed by the provider.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// The provider began listening.
    Started,

    /// Any sound (possibly speech) was detected.
    SoundStart,

    /// A recognition result. `hypotheses` are ordered best-confidence
    /// first; `is_final` distinguishes finalized utterances from interim
    /// feedback.
    Result {
        hypotheses: Vec<RawHypothesis>,
        is_final: bool,
    },

    /// The provider stopped, whether asked to or not.
    Ended,

    Error(ProviderErrorKind),
}

/// Sender half handed to provider implementations.
pub type ProviderEventSender = mpsc::UnboundedSender<ProviderEvent>;

/// Control surface of a speech provider.
///
/// `start` may legitimately fail if the engine is already running; the
/// session swallows and logs that failure rather than surfacing it.
pub trait SpeechProvider: Send {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self);
}
