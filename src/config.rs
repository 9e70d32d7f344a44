//! Resolved launch configuration
//!
//! The CLI layer parses arguments into an [`AnnouncerConfig`]; everything
//! past startup treats it as immutable. Defaults mirror the classic
//! mosquitto-client conventions (localhost:1883, subscribe to `#`).

use crate::topic;
use rumqttc::QoS;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "#";
pub const DEFAULT_QOS: u8 = 1;

/// Immutable configuration for one announcer session.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncerConfig {
    /// Broker hostname or address.
    pub host: String,
    /// Broker port (1-65535).
    pub port: u16,
    /// Topic filter to subscribe to.
    pub topic: String,
    /// Requested subscription QoS level (0-2).
    pub qos: u8,
    /// Executable invoked with the message text as its sole argument.
    /// `None` means the built-in speech command.
    pub script: Option<PathBuf>,
    /// Log every inbound message, matching or not.
    pub verbose: bool,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            topic: DEFAULT_TOPIC.to_string(),
            qos: DEFAULT_QOS,
            script: None,
            verbose: false,
        }
    }
}

/// Configuration errors, all fatal before any connection is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("port must be between 1 and 65535")]
    InvalidPort,

    #[error("QoS must be 0, 1 or 2, got {0}")]
    InvalidQos(u8),

    #[error("invalid topic filter: {0:?}")]
    InvalidTopicFilter(String),
}

impl AnnouncerConfig {
    /// Validate the resolved configuration before the session starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.qos > 2 {
            return Err(ConfigError::InvalidQos(self.qos));
        }
        if !topic::valid_filter(&self.topic) {
            return Err(ConfigError::InvalidTopicFilter(self.topic.clone()));
        }
        Ok(())
    }

    /// Requested QoS as the transport-level type.
    pub fn qos_level(&self) -> QoS {
        match self.qos {
            0 => QoS::AtMostOnce,
            2 => QoS::ExactlyOnce,
            _ => QoS::AtLeastOnce,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnnouncerConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1883);
        assert_eq!(config.topic, "#");
        assert_eq!(config.qos, 1);
        assert_eq!(config.script, None);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let config = AnnouncerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPort)));
    }

    #[test]
    fn out_of_range_qos_is_rejected() {
        let config = AnnouncerConfig {
            qos: 3,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidQos(3))));
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let config = AnnouncerConfig {
            topic: "a/#/b".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTopicFilter(_))
        ));
    }

    #[test]
    fn qos_levels_map_to_transport_type() {
        let qos = |level: u8| AnnouncerConfig {
            qos: level,
            ..Default::default()
        };
        assert_eq!(qos(0).qos_level(), QoS::AtMostOnce);
        assert_eq!(qos(1).qos_level(), QoS::AtLeastOnce);
        assert_eq!(qos(2).qos_level(), QoS::ExactlyOnce);
    }
}
