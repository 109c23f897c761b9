//! Relay configuration.

use std::path::PathBuf;

use hostchat_flood::FloodPolicy;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Tunables for the chat relay.
///
/// The relay owns the live copy (see
/// [`ChatRelay::config_mut`](crate::ChatRelay::config_mut)) and reads it on
/// every message, so edits apply to the next submission. Missing fields in
/// a JSON document fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Whether the flood filter runs on messages from remote peers.
    pub flood_filter_enabled: bool,

    /// Severity of an empty message.
    pub flood_message_score_short: u32,

    /// Severity of a maximum-length message.
    pub flood_message_score_long: u32,

    /// Accumulated severity that starts a timeout.
    pub flood_timeout_score: u32,

    /// Length of a first timeout, in seconds.
    pub flood_timeout_seconds: u32,

    /// Quiet seconds before timeout escalation is forgotten.
    pub flood_timeout_reset_seconds: u32,

    /// Whether accepted messages are appended to the chat log.
    pub chat_log_enabled: bool,

    /// Where the chat log lives.
    pub chat_log_path: PathBuf,
}

impl Default for ChatConfig {
    fn default() -> Self {
        let flood = FloodPolicy::default();
        Self {
            flood_filter_enabled: true,
            flood_message_score_short: flood.short_score,
            flood_message_score_long: flood.long_score,
            flood_timeout_score: flood.timeout_score,
            flood_timeout_seconds: flood.timeout_seconds,
            flood_timeout_reset_seconds: flood.timeout_reset_seconds,
            chat_log_enabled: true,
            chat_log_path: PathBuf::from("chat.log"),
        }
    }
}

impl ChatConfig {
    /// Parses a config from JSON.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed JSON or wrongly typed
    /// fields. Unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The flood filter tunables as of right now.
    pub fn flood_policy(&self) -> FloodPolicy {
        FloodPolicy {
            short_score: self.flood_message_score_short,
            long_score: self.flood_message_score_long,
            timeout_score: self.flood_timeout_score,
            timeout_seconds: self.flood_timeout_seconds,
            timeout_reset_seconds: self.flood_timeout_reset_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChatConfig::default();
        assert!(config.flood_filter_enabled);
        assert_eq!(config.flood_message_score_short, 2);
        assert_eq!(config.flood_message_score_long, 5);
        assert_eq!(config.flood_timeout_score, 10);
        assert_eq!(config.flood_timeout_seconds, 120);
        assert_eq!(config.flood_timeout_reset_seconds, 1800);
        assert!(config.chat_log_enabled);
        assert_eq!(config.chat_log_path, PathBuf::from("chat.log"));
    }

    #[test]
    fn test_from_json_fills_missing_fields_with_defaults() {
        let config = ChatConfig::from_json(
            r#"{ "flood_timeout_seconds": 30, "chat_log_enabled": false }"#,
        )
        .unwrap();

        assert_eq!(config.flood_timeout_seconds, 30);
        assert!(!config.chat_log_enabled);
        assert_eq!(config.flood_timeout_score, 10);
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        let result = ChatConfig::from_json(r#"{ "flood_timeout_score": "lots" }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_flood_policy_projects_flood_fields() {
        let config = ChatConfig {
            flood_message_score_short: 1,
            flood_message_score_long: 9,
            flood_timeout_score: 50,
            flood_timeout_seconds: 7,
            flood_timeout_reset_seconds: 70,
            ..ChatConfig::default()
        };

        let policy = config.flood_policy();

        assert_eq!(policy.short_score, 1);
        assert_eq!(policy.long_score, 9);
        assert_eq!(policy.timeout_score, 50);
        assert_eq!(policy.timeout_seconds, 7);
        assert_eq!(policy.timeout_reset_seconds, 70);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = ChatConfig {
            chat_log_path: PathBuf::from("/var/log/chat.log"),
            ..ChatConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ChatConfig::from_json(&json).unwrap(), config);
    }
}
