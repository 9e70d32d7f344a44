//! Session lifecycle states
//!
//! Pure transition function so the lifecycle contract is testable without a
//! broker. There is no reconnect path: every route out of `Subscribed` is
//! terminal.

/// Connection session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection attempted yet.
    Disconnected,
    /// Connect request issued, waiting for the broker's acknowledgment.
    Connecting,
    /// Connected and subscribed; the event loop is delivering messages.
    Subscribed,
    /// Disconnect requested, draining until the connection closes.
    Disconnecting,
    /// Connection released cleanly.
    Terminated,
    /// Absorbing failure state; the process exits non-zero.
    Failed,
}

/// Lifecycle inputs that drive state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ConnectRequested,
    ConnectAcknowledged,
    ShutdownRequested,
    BrokerDisconnected,
    FatalError,
}

/// Compute the successor state. Unlisted combinations leave the state
/// unchanged, which is what makes a second shutdown request harmless.
pub fn next_state(state: SessionState, transition: Transition) -> SessionState {
    use SessionState::*;
    use Transition::*;

    match (state, transition) {
        (Disconnected, ConnectRequested) => Connecting,
        (Connecting, ConnectAcknowledged) => Subscribed,
        (Connecting, ShutdownRequested) => Disconnecting,
        (Connecting, FatalError) => Failed,
        (Subscribed, ShutdownRequested) => Disconnecting,
        (Subscribed, BrokerDisconnected) => Terminated,
        (Subscribed, FatalError) => Failed,
        (Disconnecting, BrokerDisconnected) => Terminated,
        // Teardown already under way; a transport error while draining
        // still ends in a released connection.
        (Disconnecting, FatalError) => Terminated,
        (state, _) => state,
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState::*;
    use super::Transition::*;
    use super::*;

    #[test]
    fn happy_path_reaches_subscribed() {
        let state = next_state(Disconnected, ConnectRequested);
        assert_eq!(state, Connecting);
        assert_eq!(next_state(state, ConnectAcknowledged), Subscribed);
    }

    #[test]
    fn shutdown_drains_to_terminated() {
        let state = next_state(Subscribed, ShutdownRequested);
        assert_eq!(state, Disconnecting);
        assert_eq!(next_state(state, BrokerDisconnected), Terminated);
    }

    #[test]
    fn repeated_shutdown_requests_are_idempotent() {
        let state = next_state(Subscribed, ShutdownRequested);
        assert_eq!(next_state(state, ShutdownRequested), Disconnecting);
    }

    #[test]
    fn connect_failure_is_absorbing() {
        let state = next_state(Connecting, FatalError);
        assert_eq!(state, Failed);
        assert_eq!(next_state(state, ConnectAcknowledged), Failed);
        assert_eq!(next_state(state, BrokerDisconnected), Failed);
    }

    #[test]
    fn broker_disconnect_ends_the_session() {
        assert_eq!(next_state(Subscribed, BrokerDisconnected), Terminated);
        assert_eq!(next_state(Terminated, ConnectRequested), Terminated);
    }

    #[test]
    fn signal_during_connect_starts_teardown() {
        assert_eq!(next_state(Connecting, ShutdownRequested), Disconnecting);
    }

    #[test]
    fn error_while_draining_still_terminates() {
        assert_eq!(next_state(Disconnecting, FatalError), Terminated);
    }
}
