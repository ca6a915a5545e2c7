//! Stopping the customer service and its client-side tasks.
//!
//! The binary triggers a [`Shutdown`] on SIGINT/SIGTERM: the HTTP server
//! stops accepting connections and drains in-flight customer calls before
//! `startup::run` returns. A [`Client`](crate::client::Client) owns its own
//! [`Shutdown`] and triggers it on drop, which ends its active health
//! monitor loop.

use tokio::sync::broadcast;

/// One-shot stop signal shared by the server and the client's background
/// tasks. Every subscriber sees the signal once; clones trigger the same
/// subscribers.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver handed to `HttpServer::run` or `HealthMonitor::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscribed task. Tasks that already exited are skipped.
    pub fn trigger(&self) {
        if self.tx.send(()).is_ok() {
            tracing::debug!(tasks = self.tx.receiver_count(), "Shutdown triggered");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
