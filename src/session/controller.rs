//! The session state machine.
//!
//! `SessionController` is deliberately synchronous: every transition takes
//! the current `Instant` as an argument and returns the [`ControlAction`]
//! the driver should perform, so the whole lifecycle is testable without a
//! provider, a runtime, or real timers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::command::matcher::match_batch;
use crate::command::registry::CommandRegistry;
use crate::hotword::HotwordSet;
use crate::session::backoff::RestartThrottle;
use crate::session::events::{EventBus, EventKind, SessionEvent, Subscription};
use crate::session::provider::{ProviderEvent, RawHypothesis};
use crate::types::{Hypothesis, HypothesisBatch, MatchOutcome};

/// Lifecycle states of a recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session, or explicitly aborted.
    Idle,

    /// Provider start requested, `Started` not yet seen.
    Starting,

    /// Receiving results and matching them.
    Listening,

    /// Receiving results but skipping matching; the mic stays warm.
    Paused,

    /// Provider ended; an auto-restart is pending.
    Ending,
}

/// Options for [`SessionController::start`].
#[derive(Debug, Clone, Copy)]
pub struct StartOptions {
    /// Start with matching paused.
    pub paused: bool,

    /// Restart the provider when it ends on its own.
    pub auto_restart: bool,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            paused: false,
            auto_restart: true,
        }
    }
}

/// What the driver must do with the provider after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    StartProvider,
    StopProvider,
    /// Start the provider again after the throttle delay (zero means
    /// immediately).
    RestartAfter(Duration),
}

/// Owns session state, routes hypothesis batches through the hotword
/// filter and the result matcher, dispatches callbacks, and emits events.
///
/// The registry and hotword set are shared with application glue; within
/// the session everything runs on one logical task, so a match never races
/// a registration.
pub struct SessionController {
    state: SessionState,
    pause_listening: bool,
    auto_restart: bool,
    throttle: RestartThrottle,
    registry: Arc<Mutex<CommandRegistry>>,
    hotwords: Arc<RwLock<HotwordSet>>,
    active_listening: Arc<AtomicBool>,
    events: EventBus,
}

impl SessionController {
    pub fn new(
        registry: Arc<Mutex<CommandRegistry>>,
        hotwords: Arc<RwLock<HotwordSet>>,
    ) -> Self {
        Self {
            state: SessionState::Idle,
            pause_listening: false,
            auto_restart: true,
            throttle: RestartThrottle::new(),
            registry,
            hotwords,
            active_listening: Arc::new(AtomicBool::new(false)),
            events: EventBus::new(),
        }
    }

    /// Wrap plain parts in the shared handles the controller needs.
    pub fn from_parts(registry: CommandRegistry, hotwords: HotwordSet) -> Self {
        Self::new(
            Arc::new(Mutex::new(registry)),
            Arc::new(RwLock::new(hotwords)),
        )
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while results are being matched (listening and not paused).
    pub fn is_listening(&self) -> bool {
        self.state == SessionState::Listening && !self.pause_listening
    }

    pub fn registry(&self) -> &Arc<Mutex<CommandRegistry>> {
        &self.registry
    }

    pub fn hotwords(&self) -> &Arc<RwLock<HotwordSet>> {
        &self.hotwords
    }

    /// The active-listening window flag. Application glue sets it when a
    /// listening session is opened (wake or explicit trigger) and clears
    /// it when the session closes; without it, only hotword-prefixed
    /// speech is matched.
    pub fn active_listening_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active_listening)
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> Subscription
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.events.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.events.unsubscribe(subscription);
    }

    /// (Re-)initialize the session. Always asks the driver to start the
    /// provider; a failure there is logged, not propagated, since the
    /// engine may already be running. When it is, no second `Started`
    /// event will arrive, so a live session only has its flags reapplied
    /// rather than being demoted to `Starting`.
    pub fn start(&mut self, options: StartOptions, now: Instant) -> ControlAction {
        self.pause_listening = options.paused;
        self.auto_restart = options.auto_restart;
        self.throttle.mark_started(now);
        self.state = match self.state {
            SessionState::Listening | SessionState::Paused => {
                if options.paused {
                    SessionState::Paused
                } else {
                    SessionState::Listening
                }
            }
            SessionState::Idle | SessionState::Starting | SessionState::Ending => {
                SessionState::Starting
            }
        };
        ControlAction::StartProvider
    }

    /// Auto-restart after an unexpected end: keeps the current pause and
    /// auto-restart flags.
    pub fn restart(&mut self, now: Instant) -> ControlAction {
        self.throttle.mark_started(now);
        self.state = SessionState::Starting;
        ControlAction::StartProvider
    }

    /// Stop matching without releasing the provider. Takes effect for the
    /// next event; an event already being processed runs to completion.
    pub fn pause(&mut self) {
        self.pause_listening = true;
        if self.state == SessionState::Listening {
            self.state = SessionState::Paused;
        }
    }

    /// Equivalent to `start()` with defaults: clears the pause flag and
    /// restarts the provider if it had stopped.
    pub fn resume(&mut self, now: Instant) -> ControlAction {
        self.start(StartOptions::default(), now)
    }

    /// Stop listening entirely. Terminal until `start()` is called again.
    pub fn abort(&mut self) -> ControlAction {
        self.auto_restart = false;
        self.throttle.reset();
        self.state = SessionState::Idle;
        ControlAction::StopProvider
    }

    /// Feed literal sentences as if they were a final hypothesis batch.
    /// Only acts while listening and not paused.
    pub fn trigger<I, S>(&mut self, sentences: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.is_listening() {
            debug!(state = ?self.state, "trigger ignored, session not listening");
            return;
        }
        let batch: HypothesisBatch = sentences
            .into_iter()
            .map(|s| Hypothesis::new(s.as_ref()))
            .collect();
        self.process_batch(batch, true);
    }

    /// Route one provider event. Returns the action, if any, the driver
    /// must perform.
    pub fn on_provider_event(
        &mut self,
        event: ProviderEvent,
        now: Instant,
    ) -> Option<ControlAction> {
        match event {
            ProviderEvent::Started => {
                self.state = if self.pause_listening {
                    SessionState::Paused
                } else {
                    SessionState::Listening
                };
                self.emit(EventKind::Start, SessionEvent::Start);
                None
            }
            ProviderEvent::SoundStart => {
                self.emit(EventKind::SoundStart, SessionEvent::SoundStart);
                None
            }
            ProviderEvent::Result {
                hypotheses,
                is_final,
            } => {
                if self.pause_listening {
                    debug!("speech heard, but session is paused");
                    return None;
                }
                let batch = normalize(hypotheses);
                self.process_batch(batch, is_final);
                None
            }
            ProviderEvent::Ended => {
                self.emit(EventKind::End, SessionEvent::End);
                if self.auto_restart {
                    let plan = self.throttle.plan_restart(now);
                    if plan.loop_suspected {
                        warn!(
                            restarts = self.throttle.consecutive_restarts(),
                            "recognition is repeatedly stopping and starting"
                        );
                    }
                    self.state = SessionState::Ending;
                    Some(ControlAction::RestartAfter(plan.delay))
                } else {
                    self.state = SessionState::Idle;
                    None
                }
            }
            ProviderEvent::Error(kind) => {
                let event = SessionEvent::Error { kind };
                self.emit(EventKind::Error, event.clone());
                if kind.is_network() {
                    self.emit(EventKind::ErrorNetwork, event);
                } else if kind.is_permission() {
                    // No point restarting into the same denial.
                    self.auto_restart = false;
                    if self.throttle.start_was_just_now(now) {
                        self.emit(EventKind::ErrorPermissionBlocked, event);
                    } else {
                        self.emit(EventKind::ErrorPermissionDenied, event);
                    }
                }
                None
            }
        }
    }

    /// Hotword filter -> result matcher -> callback dispatch + events.
    fn process_batch(&mut self, batch: HypothesisBatch, is_final: bool) {
        let active = self.active_listening.load(Ordering::SeqCst);
        let outcome = self.hotwords.read().filter(batch, active);

        if outcome.hotword_triggered {
            self.emit(EventKind::HotwordTrigger, SessionEvent::HotwordTrigger);
        }
        if outcome.suppressed {
            return;
        }

        if !is_final {
            self.emit(
                EventKind::Result,
                SessionEvent::Result {
                    hypotheses: outcome.passed,
                },
            );
            return;
        }

        if outcome.hotword_triggered && outcome.passed.is_empty() {
            // A pure wake event; there is nothing to match.
            return;
        }

        let matched = {
            let registry = self.registry.lock();
            match_batch(&outcome.passed, &registry, true)
        };

        match matched {
            MatchOutcome::Matched(m) => {
                debug!(matched = %m.matched_text, phrase = %m.phrase, "result matched");
                self.emit(
                    EventKind::ResultMatch,
                    SessionEvent::ResultMatch {
                        matched_text: m.matched_text.clone(),
                        phrase: m.phrase.clone(),
                        hypotheses: outcome.passed,
                    },
                );
                (m.callback)(&m.parameters);
            }
            MatchOutcome::NoMatch => {
                self.emit(
                    EventKind::Result,
                    SessionEvent::Result {
                        hypotheses: outcome.passed.clone(),
                    },
                );
                self.emit(
                    EventKind::ResultNoMatch,
                    SessionEvent::ResultNoMatch {
                        hypotheses: outcome.passed,
                    },
                );
            }
            MatchOutcome::Partial { .. } => unreachable!("final batches are always matched"),
        }
    }

    fn emit(&mut self, kind: EventKind, event: SessionEvent) {
        self.events.emit(kind, &event);
    }
}

/// Provider hypotheses arrive best-confidence first; normalization keeps
/// that order.
fn normalize(hypotheses: Vec<RawHypothesis>) -> HypothesisBatch {
    hypotheses
        .iter()
        .map(|h| Hypothesis::new(&h.text))
        .collect()
}
