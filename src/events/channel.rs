//! Event channel implementation using crossbeam-channel.
//!
//! Provides a thread-safe way to send events from the engine
//! to any UI layer.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::{ClusterEvent, ClusterProgress, Event};
use crate::core::similarity::StrategyKind;

/// Sends events from the engine.
///
/// Thin wrapper around crossbeam's Sender that can be cloned and
/// sent across threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Create a new EventSender from a raw crossbeam sender.
    pub fn new(sender: Sender<Event>) -> Self {
        Self { inner: sender }
    }

    /// Send an event. Non-blocking if the channel isn't full.
    ///
    /// If the receiver is dropped, the event is silently discarded.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }

    /// A progress callback that forwards `(processed, total)` as
    /// [`ClusterEvent::Progress`] events.
    pub fn progress_for(&self, strategy: StrategyKind) -> impl FnMut(usize, usize) + '_ {
        move |processed, total| {
            self.send(Event::Cluster(ClusterEvent::Progress(ClusterProgress {
                strategy,
                processed,
                total,
            })))
        }
    }
}

/// Receives events from the engine.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Returns an iterator over received events
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Event channel between the engine and UI layers.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }

    /// Create a bounded event channel with the specified capacity.
    ///
    /// A full channel blocks the sender, which stalls clustering until
    /// the UI catches up.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        EventChannel
    }
}

/// A no-op event sender for when you don't need progress reporting.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
