//! Topic-tagged fan-out of runtime messages.
//!
//! Built on [`tokio::sync::broadcast`]: every subscriber sees every message
//! sent after it subscribed, and a message nobody listens for is gone.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// An event published on a named topic.
///
/// Serializes as `{"topic": ..., "data": ...}`, the shape consumers of the
/// communications channel expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicMessage<T> {
    /// Topic the event was published on.
    pub topic: String,
    /// The event itself.
    pub data: T,
}

impl<T> TopicMessage<T> {
    /// Tag `data` with `topic`.
    pub fn new(topic: impl Into<String>, data: T) -> Self {
        Self {
            topic: topic.into(),
            data,
        }
    }
}

/// Fan-out bus for values of type `E`.
///
/// Sending never blocks and never fails; without subscribers the value is
/// discarded.
///
/// # Examples
///
/// ```
/// use flowscope_telemetry::{EventBus, TopicMessage};
///
/// let bus = EventBus::new(64);
/// let mut sub = bus.subscribe();
///
/// bus.emit(TopicMessage::new("debug", "hello".to_owned()));
///
/// assert_eq!(sub.try_recv().map(|m| m.data), Some("hello".to_owned()));
/// assert_eq!(bus.total_emitted(), 1);
/// ```
pub struct EventBus<E> {
    sender: broadcast::Sender<E>,
    emitted: AtomicU64,
}

impl<E: Clone> EventBus<E> {
    /// A bus buffering at most `capacity` undelivered values per subscriber.
    ///
    /// A subscriber that falls further behind loses the oldest values.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            emitted: AtomicU64::new(0),
        }
    }

    /// Send `event` to every current subscriber.
    pub fn emit(&self, event: E) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        // Err only means nobody is subscribed.
        let _ = self.sender.send(event);
    }

    /// Start receiving values sent from now on.
    pub fn subscribe(&self) -> EventSubscriber<E> {
        EventSubscriber {
            receiver: self.sender.subscribe(),
        }
    }

    /// Values sent over the bus's lifetime, delivered or not.
    #[must_use]
    pub fn total_emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Subscribers currently attached.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sender.receiver_count())
            .field("emitted", &self.emitted.load(Ordering::Relaxed))
            .finish()
    }
}

/// Receiving end of an [`EventBus`].
pub struct EventSubscriber<E> {
    receiver: broadcast::Receiver<E>,
}

impl<E: Clone> EventSubscriber<E> {
    /// Wait for the next value.
    ///
    /// Values lost to lag are skipped over. `None` means the bus is gone.
    pub async fn recv(&mut self) -> Option<E> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The next value if one is already queued.
    pub fn try_recv(&mut self) -> Option<E> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type Bus = EventBus<TopicMessage<String>>;

    fn message(data: &str) -> TopicMessage<String> {
        TopicMessage::new("debug", data.to_owned())
    }

    #[test]
    fn unheard_messages_are_counted_and_dropped() {
        let bus = Bus::new(16);
        bus.emit(message("lost"));
        assert_eq!(bus.total_emitted(), 1);

        let mut late = bus.subscribe();
        assert_eq!(late.try_recv(), None);
    }

    #[test]
    fn try_recv_drains_queued_messages() {
        let bus = Bus::new(16);
        let mut sub = bus.subscribe();
        bus.emit(message("one"));
        bus.emit(message("two"));

        assert_eq!(sub.try_recv(), Some(message("one")));
        assert_eq!(sub.try_recv(), Some(message("two")));
        assert_eq!(sub.try_recv(), None);
    }

    #[tokio::test]
    async fn recv_waits_for_the_next_message() {
        let bus = std::sync::Arc::new(Bus::new(16));
        let mut sub = bus.subscribe();

        let sender = bus.clone();
        tokio::spawn(async move { sender.emit(message("later")) });

        assert_eq!(sub.recv().await, Some(message("later")));
    }

    #[tokio::test]
    async fn recv_ends_when_the_bus_is_dropped() {
        let bus = Bus::new(4);
        let mut sub = bus.subscribe();
        drop(bus);
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn every_subscriber_gets_its_own_copy() {
        let bus = Bus::new(16);
        let mut subs: Vec<_> = (0..3).map(|_| bus.subscribe()).collect();
        bus.emit(message("shared"));
        for sub in &mut subs {
            assert_eq!(sub.try_recv().map(|m| m.data), Some("shared".to_owned()));
        }
    }

    #[test]
    fn lagging_subscriber_skips_to_newest() {
        let bus = Bus::new(2);
        let mut sub = bus.subscribe();
        for i in 0..5 {
            bus.emit(message(&i.to_string()));
        }
        assert_eq!(sub.try_recv().map(|m| m.data), Some("3".to_owned()));
        assert_eq!(sub.try_recv().map(|m| m.data), Some("4".to_owned()));
    }

    #[test]
    fn dropping_a_subscriber_detaches_it() {
        let bus = Bus::new(16);
        let first = bus.subscribe();
        let _second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
        drop(first);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn topic_message_serializes_as_topic_and_data() {
        let json = serde_json::to_value(message("x")).unwrap();
        assert_eq!(json, serde_json::json!({"topic": "debug", "data": "x"}));
    }
}
