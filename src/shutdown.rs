//! Signal-driven shutdown coordination
//!
//! Watches SIGINT and SIGTERM and asks the session to disconnect through a
//! watch channel. The session tears itself down exactly once; resource
//! release is scoped to the session's own exit, so a signal arriving during
//! normal shutdown cannot double-free anything.

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};

/// Channel linking the signal watcher to the session's event loop.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Wait for the first SIGINT or SIGTERM, announce it, and request a
/// disconnect. Installation failure also requests a disconnect: a session
/// that cannot be interrupted should not keep running.
pub async fn watch_signals(shutdown_tx: watch::Sender<bool>) {
    let sigint = signal(SignalKind::interrupt());
    let sigterm = signal(SignalKind::terminate());

    let (mut sigint, mut sigterm) = match (sigint, sigterm) {
        (Ok(int), Ok(term)) => (int, term),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "failed to install signal handlers");
            let _ = shutdown_tx.send(true);
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
    }
    let _ = shutdown_tx.send(true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_starts_unsignalled() {
        let (_tx, rx) = shutdown_channel();
        assert!(!*rx.borrow());
    }

    #[tokio::test]
    async fn send_flips_the_channel_once() {
        let (tx, mut rx) = shutdown_channel();
        tx.send(true).unwrap();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn sigterm_requests_shutdown_exactly_once() {
        use std::time::Duration;

        // Install a handler before raising the signal so delivery cannot
        // race registration and cannot terminate the test process.
        let _handler = signal(SignalKind::terminate()).unwrap();

        let (tx, mut rx) = shutdown_channel();
        let watcher = tokio::spawn(watch_signals(tx));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("no shutdown notice after SIGTERM")
            .unwrap();
        assert!(*rx.borrow());

        // The watcher sends one notice and exits; the channel never flips
        // a second time.
        watcher.await.unwrap();
        assert!(!rx.has_changed().unwrap_or(false));
    }
}
