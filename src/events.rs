//! Broadcast event bus for download completion and failure notifications.
//!
//! Events are fire-and-forget: emitting never fails, and an event sent while
//! no subscriber is listening is simply dropped.

use serde::Serialize;
use tokio::sync::broadcast;

/// Default buffered capacity per subscriber.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Notification emitted when a download reaches a terminal state.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// The file was fetched and persisted successfully.
    DownloadCompleted {
        /// The requested URL.
        url: String,
        /// The resolved filename the file was saved under.
        filename: String,
    },
    /// The request failed at some point in the pipeline.
    DownloadFailed {
        /// The requested URL.
        url: String,
        /// The resolved filename, when failure occurred after resolution.
        filename: Option<String>,
    },
}

/// Handle to the broadcast channel carrying [`DownloadEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DownloadEvent>,
}

impl EventBus {
    /// Creates a new event bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribes to all events emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DownloadEvent> {
        self.tx.subscribe()
    }

    /// Emits an event to all current subscribers.
    ///
    /// Send errors (no active subscriber) are ignored by design; the bus is
    /// a fire-and-forget notification surface.
    pub fn emit(&self, event: DownloadEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
