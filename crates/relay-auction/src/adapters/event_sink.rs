//! # Broadcast Event Sink
//!
//! Fans auction notifications out over `tokio::sync::broadcast` and keeps
//! a history for indexing.

use crate::events::AuctionEvent;
use crate::ports::AuctionEventSink;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Event sink backed by a broadcast channel.
pub struct BroadcastEventSink {
    sender: broadcast::Sender<AuctionEvent>,
    history: RwLock<Vec<AuctionEvent>>,
    events_published: AtomicU64,
}

impl BroadcastEventSink {
    /// Sink with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Sink with a specific channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            history: RwLock::new(Vec::new()),
            events_published: AtomicU64::new(0),
        }
    }

    /// Receive future notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.sender.subscribe()
    }

    /// Every notification published so far.
    pub fn history(&self) -> Vec<AuctionEvent> {
        self.history.read().clone()
    }

    /// Notifications about `slot_start`.
    pub fn history_for_slot(&self, slot_start: u64) -> Vec<AuctionEvent> {
        self.history
            .read()
            .iter()
            .filter(|event| event.slot_start() == slot_start)
            .cloned()
            .collect()
    }

    /// Total notifications published.
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuctionEventSink for BroadcastEventSink {
    fn publish(&self, event: AuctionEvent) {
        debug!(topic = event.topic(), slot = event.slot_start(), "[auction] event");
        self.history.write().push(event.clone());
        self.events_published.fetch_add(1, Ordering::Relaxed);
        // Err only means there are no live receivers.
        let _ = self.sender.send(event);
    }
}
