//! Error taxonomy and process exit codes
//!
//! Configuration and connection problems are fatal; each maps to a distinct
//! non-zero exit code so operators can tell a bad flag from an unreachable
//! broker. Announcement failures are recoverable and never surface here.

use crate::config::ConfigError;
use rumqttc::{ClientError, ConnectReturnCode, ConnectionError};
use thiserror::Error;

/// Top-level fatal error for the announcer process.
#[derive(Debug, Error)]
pub enum HeraldError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Fatal session failures. None of these are retried; the session ends and
/// the process exits with the mapped code.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to broker")]
    Connect(#[source] ConnectionError),

    #[error("broker refused connection: {0:?}")]
    ConnectRefused(ConnectReturnCode),

    #[error("failed to issue subscribe request")]
    Subscribe(#[source] ClientError),

    #[error("broker rejected the subscription")]
    SubscriptionRejected,

    #[error("connection to broker lost")]
    ConnectionLost(#[source] ConnectionError),

    #[error("failed to issue disconnect request")]
    Disconnect(#[source] ClientError),
}

impl HeraldError {
    pub fn exit_code(&self) -> i32 {
        match self {
            HeraldError::Config(_) => 2,
            HeraldError::Session(e) => e.exit_code(),
        }
    }
}

impl SessionError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionError::Connect(_) | SessionError::ConnectRefused(_) => 3,
            SessionError::Subscribe(_) | SessionError::SubscriptionRejected => 4,
            SessionError::ConnectionLost(_) | SessionError::Disconnect(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_with_usage_code() {
        let error = HeraldError::Config(ConfigError::InvalidPort);
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn connect_and_subscribe_failures_are_distinct() {
        let refused =
            HeraldError::from(SessionError::ConnectRefused(ConnectReturnCode::NotAuthorized));
        let rejected = HeraldError::from(SessionError::SubscriptionRejected);
        assert_ne!(refused.exit_code(), rejected.exit_code());
        assert_ne!(refused.exit_code(), 0);
        assert_ne!(rejected.exit_code(), 0);
    }

    #[test]
    fn error_messages_are_nonempty() {
        let errors = [
            HeraldError::Config(ConfigError::InvalidQos(9)),
            HeraldError::Session(SessionError::SubscriptionRejected),
        ];
        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
