//! Session configuration, deserializable from host application settings.

use serde::Deserialize;

use crate::hotword::HotwordSet;
use crate::session::controller::StartOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Optional user-configured wake word, in addition to the built-in one.
    #[serde(default)]
    pub custom_hotword: Option<String>,

    /// Start with matching paused.
    #[serde(default)]
    pub start_paused: bool,

    /// Restart the provider when it ends on its own.
    #[serde(default = "default_auto_restart")]
    pub auto_restart: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            custom_hotword: None,
            start_paused: false,
            auto_restart: default_auto_restart(),
        }
    }
}

fn default_auto_restart() -> bool {
    true
}

impl SessionConfig {
    pub fn hotwords(&self) -> HotwordSet {
        let mut hotwords = HotwordSet::new();
        hotwords.set_custom(self.custom_hotword.as_deref());
        hotwords
    }

    pub fn start_options(&self) -> StartOptions {
        StartOptions {
            paused: self.start_paused,
            auto_restart: self.auto_restart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert!(config.auto_restart);
        assert!(!config.start_paused);
        assert!(config.custom_hotword.is_none());
    }

    #[test]
    fn test_custom_hotword_flows_into_set() {
        let config: SessionConfig =
            serde_json::from_str(r#"{ "custom_hotword": "Jarvis" }"#).unwrap();
        let hotwords = config.hotwords();
        let words: Vec<&str> = hotwords.words().collect();
        assert_eq!(words, ["hey", "jarvis"]);
    }
}
