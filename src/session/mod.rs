//! Broker connection session
//!
//! Owns the MQTT client and event loop for the lifetime of the process:
//! connect, subscribe on the broker's acknowledgment, dispatch inbound
//! messages through the topic filter to the announcer, and drain to a
//! released connection on shutdown. The client and event loop are created
//! exactly once and dropped exactly once, on every exit path.

mod events;
mod state;

pub use events::{route_event, subscription_accepted, SessionEvent};
pub use state::{next_state, SessionState, Transition};

use crate::announce::Speak;
use crate::config::AnnouncerConfig;
use crate::error::SessionError;
use crate::topic;
use rumqttc::{AsyncClient, ConnectReturnCode, ConnectionError, EventLoop, MqttOptions};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const KEEP_ALIVE: Duration = Duration::from_secs(60);
const EVENT_CHANNEL_CAPACITY: usize = 10;

/// One broker connection from connect to teardown.
pub struct Session<S: Speak> {
    config: AnnouncerConfig,
    speaker: S,
    state: SessionState,
    last_rc: Arc<AtomicI32>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<S: Speak> Session<S> {
    pub fn new(config: AnnouncerConfig, speaker: S, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            config,
            speaker,
            state: SessionState::Disconnected,
            last_rc: Arc::new(AtomicI32::new(0)),
            shutdown_rx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Shared view of the last broker return code. The shutdown path reads
    /// this to derive the process exit code; only the session writes it.
    pub fn last_return_code(&self) -> Arc<AtomicI32> {
        Arc::clone(&self.last_rc)
    }

    fn client_id() -> String {
        // Unique per invocation so a stale session on the broker never
        // collides with a fresh start.
        format!("herald-{}", std::process::id())
    }

    /// Mark the connect request issued. Called by [`Session::run`] before
    /// the transport is created; events are meaningless before this.
    pub fn start_connecting(&mut self) {
        self.state = next_state(self.state, Transition::ConnectRequested);
    }

    /// Connect, subscribe and run the event loop until the connection ends.
    ///
    /// Returns the final broker return code on a clean teardown; any fatal
    /// error carries its own exit code.
    pub async fn run(mut self) -> Result<i32, SessionError> {
        self.start_connecting();
        info!(
            host = %self.config.host,
            port = self.config.port,
            filter = %self.config.topic,
            "connecting to broker"
        );

        let mut options = MqttOptions::new(Self::client_id(), &self.config.host, self.config.port);
        options.set_keep_alive(KEEP_ALIVE);
        options.set_clean_session(true);

        let (client, mut event_loop) = AsyncClient::new(options, EVENT_CHANNEL_CAPACITY);
        let result = self.drive(&client, &mut event_loop).await;

        // client and event_loop drop here on every path: the connection
        // handle is released exactly once, signal-triggered exits included.
        match &result {
            Ok(rc) => info!(rc, "session terminated"),
            Err(e) => error!(error = %e, "session failed"),
        }
        result
    }

    async fn drive(
        &mut self,
        client: &AsyncClient,
        event_loop: &mut EventLoop,
    ) -> Result<i32, SessionError> {
        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            tokio::select! {
                // Once Disconnecting this arm stays disabled, so the
                // disconnect request is issued at most once.
                _ = shutdown_rx.changed(), if self.state != SessionState::Disconnecting => {
                    info!("disconnect requested, leaving session");
                    self.state = next_state(self.state, Transition::ShutdownRequested);
                    client.disconnect().await.map_err(SessionError::Disconnect)?;
                }
                polled = event_loop.poll() => match polled {
                    Ok(event) => {
                        if let Some(rc) = self.handle_event(client, route_event(&event)).await? {
                            return Ok(rc);
                        }
                    }
                    Err(e) => {
                        if self.state == SessionState::Disconnecting {
                            // Normal end of a voluntary disconnect: the
                            // transport reports the closed connection.
                            debug!(cause = %e, "connection closed after disconnect");
                            self.state = next_state(self.state, Transition::BrokerDisconnected);
                            return Ok(self.last_rc.load(Ordering::SeqCst));
                        }
                        return Err(self.fail(e));
                    }
                }
            }
        }
    }

    /// Apply one session event. Returns `Ok(Some(rc))` when the session has
    /// ended cleanly with the given broker return code.
    pub async fn handle_event(
        &mut self,
        client: &AsyncClient,
        event: SessionEvent,
    ) -> Result<Option<i32>, SessionError> {
        match event {
            SessionEvent::ConnectAcknowledged { code } => {
                self.last_rc.store(code as i32, Ordering::SeqCst);
                if code != ConnectReturnCode::Success {
                    self.state = next_state(self.state, Transition::FatalError);
                    return Err(SessionError::ConnectRefused(code));
                }
                info!("connected");
                client
                    .subscribe(&self.config.topic, self.config.qos_level())
                    .await
                    .map_err(|e| {
                        self.state = next_state(self.state, Transition::FatalError);
                        SessionError::Subscribe(e)
                    })?;
                self.state = next_state(self.state, Transition::ConnectAcknowledged);
                debug!(filter = %self.config.topic, qos = self.config.qos, "subscribe requested");
                Ok(None)
            }
            SessionEvent::SubscriptionConfirmed { return_codes } => {
                if !subscription_accepted(&return_codes) {
                    self.state = next_state(self.state, Transition::FatalError);
                    return Err(SessionError::SubscriptionRejected);
                }
                debug!("subscription confirmed");
                Ok(None)
            }
            SessionEvent::Message { topic, payload } => {
                self.on_message(&topic, &payload).await;
                Ok(None)
            }
            SessionEvent::Disconnected => {
                info!("broker closed the session");
                self.state = next_state(self.state, Transition::BrokerDisconnected);
                Ok(Some(self.last_rc.load(Ordering::SeqCst)))
            }
            SessionEvent::Infrastructure | SessionEvent::Outgoing => Ok(None),
        }
    }

    async fn on_message(&self, msg_topic: &str, payload: &[u8]) {
        // Payloads are raw bytes and need not be valid UTF-8.
        let text = String::from_utf8_lossy(payload);
        debug!(topic = %msg_topic, payload = %text, "message received");

        if !topic::topic_matches(&self.config.topic, msg_topic) {
            return;
        }

        match self.speaker.announce(&text).await {
            Ok(outcome) => debug!(?outcome, "announcement handled"),
            // Recoverable: the announcement is lost, the session goes on.
            Err(e) => warn!(error = %e, "announcement dropped"),
        }
    }

    fn fail(&mut self, cause: ConnectionError) -> SessionError {
        let connecting = self.state == SessionState::Connecting;
        self.state = next_state(self.state, Transition::FatalError);
        let error = if connecting {
            SessionError::Connect(cause)
        } else {
            SessionError::ConnectionLost(cause)
        };
        self.last_rc.store(error.exit_code(), Ordering::SeqCst);
        error
    }
}
