//! One-way event channel from the detector to the control session.
//!
//! Unbounded and fire-and-forget: sending never blocks and never fails the
//! sender. Messages sent after the receiver is gone are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gazemouse_face_model::event::ChannelMessage;
use tokio::sync::mpsc;

/// Create a connected sender/receiver pair.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let dropped = Arc::new(AtomicU64::new(0));
    (
        EventSender {
            tx,
            dropped: dropped.clone(),
        },
        EventReceiver { rx },
    )
}

/// Detector-side handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ChannelMessage>,
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Post a message without waiting for the consumer.
    pub fn send(&self, message: ChannelMessage) {
        let name = message.name();
        if self.tx.send(message).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(event = name, "Event channel closed, message dropped");
        }
    }

    /// Whether the receiving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Messages dropped because the receiver was gone.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Control-side handle.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<ChannelMessage>,
}

impl EventReceiver {
    /// Wait for the next message. `None` once every sender is dropped and
    /// the queue is empty.
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        self.rx.recv().await
    }

    /// Take a message if one is already queued.
    pub fn try_recv(&mut self) -> Option<ChannelMessage> {
        self.rx.try_recv().ok()
    }

    /// Take every queued message.
    pub fn drain(&mut self) -> Vec<ChannelMessage> {
        let mut messages = Vec::new();
        while let Some(message) = self.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Stop accepting new messages; queued ones can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
