//! Serialized invocation of the external speech command
//!
//! The [`Announcer`] owns the single mutual-exclusion lock around
//! "spawn + wait", so at most one announcement plays at any instant and
//! callers queue in arrival order. Speech synthesis itself is delegated to
//! an external program: either an operator-supplied executable or the
//! built-in `espeak` invocation.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Built-in speech command, used when no script is configured.
pub const DEFAULT_SPEECH_COMMAND: &str = "espeak";
const DEFAULT_SPEECH_ARGS: &[&str] = &["-v", "mb-de2"];

/// Command the announcer runs for each matching payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnounceCommand {
    /// Operator-supplied executable, invoked with the text as `$1`.
    Script(PathBuf),
    /// `espeak` with the built-in voice arguments.
    BuiltinSpeech,
}

/// Recoverable announcement failures. The session logs these and keeps
/// processing further messages; the failed announcement is lost.
#[derive(Debug, Error)]
pub enum AnnounceError {
    #[error("failed to spawn announcement process")]
    Spawn(#[source] std::io::Error),

    #[error("failed to collect announcement process status")]
    Wait(#[source] std::io::Error),
}

/// How a successfully spawned announcement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceOutcome {
    /// The command exited successfully.
    Spoken,
    /// The command ran but exited non-zero (or died to a signal).
    CommandFailed(Option<i32>),
}

/// Capability to render a text payload as audio.
///
/// The session dispatches matched payloads through this seam; tests swap in
/// a recording implementation.
#[async_trait]
pub trait Speak: Send + Sync {
    async fn announce(&self, text: &str) -> Result<AnnounceOutcome, AnnounceError>;
}

#[async_trait]
impl<S: Speak + ?Sized> Speak for Arc<S> {
    async fn announce(&self, text: &str) -> Result<AnnounceOutcome, AnnounceError> {
        (**self).announce(text).await
    }
}

/// Spawns the speech command, one invocation at a time.
pub struct Announcer {
    command: AnnounceCommand,
    playing: Mutex<()>,
    spawn_failures: AtomicU64,
}

impl Announcer {
    pub fn new(script: Option<PathBuf>) -> Self {
        let command = match script {
            Some(path) => AnnounceCommand::Script(path),
            None => AnnounceCommand::BuiltinSpeech,
        };
        Self {
            command,
            playing: Mutex::new(()),
            spawn_failures: AtomicU64::new(0),
        }
    }

    /// Number of announcements lost to spawn failures so far.
    pub fn spawn_failures(&self) -> u64 {
        self.spawn_failures.load(Ordering::Relaxed)
    }

    pub fn command(&self) -> &AnnounceCommand {
        &self.command
    }

    fn build_command(&self, text: &str) -> Command {
        let mut cmd = match &self.command {
            AnnounceCommand::Script(path) => Command::new(path),
            AnnounceCommand::BuiltinSpeech => {
                let mut cmd = Command::new(DEFAULT_SPEECH_COMMAND);
                cmd.args(DEFAULT_SPEECH_ARGS);
                cmd
            }
        };
        // Audio subsystems (ALSA in particular) are chatty on stderr; keep
        // that noise out of the session's log stream.
        cmd.arg(text).stdin(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

#[async_trait]
impl Speak for Announcer {
    async fn announce(&self, text: &str) -> Result<AnnounceOutcome, AnnounceError> {
        // Held across spawn and wait: the next announcement cannot start
        // until this one's process has terminated. tokio's Mutex grants the
        // lock in arrival order, preserving playback order.
        let _playing = self.playing.lock().await;

        let mut child = self.build_command(text).spawn().map_err(|e| {
            self.spawn_failures.fetch_add(1, Ordering::Relaxed);
            AnnounceError::Spawn(e)
        })?;
        let status = child.wait().await.map_err(AnnounceError::Wait)?;

        if status.success() {
            debug!(text, "announcement finished");
            Ok(AnnounceOutcome::Spoken)
        } else {
            warn!(code = ?status.code(), "announcement command reported failure");
            Ok(AnnounceOutcome::CommandFailed(status.code()))
        }
    }
}
