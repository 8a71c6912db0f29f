pub mod command;
pub mod config;
pub mod hotword;
pub mod pattern;
pub mod session;
pub mod types;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarkError {
    #[error("Command table error: {0}")]
    TableError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

pub type Result<T> = std::result::Result<T, HarkError>;

pub use command::matcher::match_batch;
pub use command::registry::{CommandCallback, CommandRegistry, CompiledCommand, DEFAULT_PRIORITY};
pub use command::table::{CommandBinding, CommandTable};
pub use config::SessionConfig;
pub use hotword::{HotwordOutcome, HotwordSet, FIXED_HOTWORD};
pub use pattern::Matcher;
pub use session::backoff::{RestartPlan, RestartThrottle};
pub use session::controller::{ControlAction, SessionController, SessionState, StartOptions};
pub use session::driver::{SessionCommand, SessionDriver, SessionHandle};
pub use session::events::{EventBus, EventKind, SessionEvent, Subscription};
pub use session::provider::{ProviderErrorKind, ProviderEvent, RawHypothesis, SpeechProvider};
pub use types::{CommandMatch, Hypothesis, HypothesisBatch, MatchOutcome};
