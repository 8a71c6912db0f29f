//! The tokio task that owns the provider and the clock.
//!
//! Everything interesting lives in [`SessionController`]; the driver only
//! pumps provider events and session commands into it on one task (so no
//! matching ever runs concurrently) and executes the returned
//! [`ControlAction`]s, including the throttled restart timer.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::session::controller::{ControlAction, SessionController, StartOptions};
use crate::session::provider::{ProviderEvent, SpeechProvider};
use crate::{HarkError, Result};

/// Commands accepted by a running session driver.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Start(StartOptions),
    Pause,
    Resume,
    Abort,
    /// Feed literal sentences as a final hypothesis batch (text-based
    /// activation, no audio involved).
    Trigger(Vec<String>),
}

/// Cloneable control surface for a spawned session driver.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn start(&self, options: StartOptions) -> Result<()> {
        self.send(SessionCommand::Start(options))
    }

    pub fn pause(&self) -> Result<()> {
        self.send(SessionCommand::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(SessionCommand::Resume)
    }

    pub fn abort(&self) -> Result<()> {
        self.send(SessionCommand::Abort)
    }

    pub fn trigger<I, S>(&self, sentences: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.send(SessionCommand::Trigger(
            sentences.into_iter().map(Into::into).collect(),
        ))
    }

    fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| HarkError::ChannelError("session driver has shut down".to_string()))
    }
}

/// Runs the session event loop over a [`SpeechProvider`].
pub struct SessionDriver<P: SpeechProvider> {
    controller: SessionController,
    provider: P,
    provider_rx: mpsc::UnboundedReceiver<ProviderEvent>,
    command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    restart_at: Option<Instant>,
}

impl<P: SpeechProvider> SessionDriver<P> {
    pub fn new(
        controller: SessionController,
        provider: P,
        provider_rx: mpsc::UnboundedReceiver<ProviderEvent>,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        (
            Self {
                controller,
                provider,
                provider_rx,
                command_rx,
                restart_at: None,
            },
            SessionHandle { command_tx },
        )
    }

    /// Access the controller, e.g. to subscribe listeners before spawning.
    pub fn controller_mut(&mut self) -> &mut SessionController {
        &mut self.controller
    }

    /// Pump events until the provider and every handle are gone. Provider
    /// events, commands and the restart timer all run on this one task, so
    /// events are processed strictly in arrival order and a command takes
    /// effect for the next event only.
    pub async fn run(mut self) {
        loop {
            let restart_at = self.restart_at;
            tokio::select! {
                biased;

                event = self.provider_rx.recv() => match event {
                    Some(event) => {
                        let now = Instant::now().into_std();
                        if let Some(action) = self.controller.on_provider_event(event, now) {
                            self.apply(action);
                        }
                    }
                    None => {
                        info!("provider event channel closed, session driver exiting");
                        break;
                    }
                },

                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        info!("all session handles dropped, session driver exiting");
                        break;
                    }
                },

                _ = sleep_until(restart_at.unwrap_or_else(Instant::now)), if restart_at.is_some() => {
                    self.restart_at = None;
                    let action = self.controller.restart(Instant::now().into_std());
                    self.apply(action);
                }
            }
        }
    }

    fn handle_command(&mut self, command: SessionCommand) {
        let now = Instant::now().into_std();
        match command {
            SessionCommand::Start(options) => {
                self.restart_at = None;
                let action = self.controller.start(options, now);
                self.apply(action);
            }
            SessionCommand::Pause => self.controller.pause(),
            SessionCommand::Resume => {
                let action = self.controller.resume(now);
                self.apply(action);
            }
            SessionCommand::Abort => {
                self.restart_at = None;
                let action = self.controller.abort();
                self.apply(action);
            }
            SessionCommand::Trigger(sentences) => self.controller.trigger(sentences),
        }
    }

    fn apply(&mut self, action: ControlAction) {
        match action {
            ControlAction::StartProvider => {
                if let Err(err) = self.provider.start() {
                    // The engine may already be running; not a session error.
                    debug!(%err, "provider start failed");
                }
            }
            ControlAction::StopProvider => self.provider.stop(),
            ControlAction::RestartAfter(delay) => {
                self.restart_at = Some(Instant::now() + delay);
            }
        }
    }
}
