use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
/// Event bus for pub/sub messaging
///
/// Fans host events out to every subscriber. Doubles as the audio system's
/// notification sink.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::events::Event;
use super::notifier::{Notifier, NotifyLevel};

/// Subscriber ID for tracking subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    sender: Sender<Event>,
}

/// Event bus for broadcasting events to subscribers
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<AtomicUsize>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events, returns a receiver and subscription ID
    pub fn subscribe(&self) -> (Receiver<Event>, SubscriberId) {
        let (sender, rx) = unbounded();
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscribers.write().push(Subscriber { id, sender });
        (rx, id)
    }

    /// Unsubscribe from events
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Publish an event to all subscribers
    ///
    /// Subscribers whose receiver was dropped are pruned.
    pub fn publish(&self, event: Event) {
        tracing::trace!("publish: {}", event.description());

        let mut closed = Vec::new();
        for subscriber in self.subscribers.read().iter() {
            if subscriber.sender.try_send(event.clone()).is_err() {
                closed.push(subscriber.id);
            }
        }

        if !closed.is_empty() {
            self.subscribers.write().retain(|s| !closed.contains(&s.id));
        }
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Notifier for EventBus {
    fn notify(&self, level: NotifyLevel, message: &str) {
        self.publish(Event::Notification {
            level,
            message: message.to_string(),
        });
    }

    fn broadcast(&self, channel: &str, payload: &str) {
        self.publish(Event::Broadcast {
            channel: channel.to_string(),
            payload: payload.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();
        let (_rx, id) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.unsubscribe(id);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_notify_reaches_every_subscriber() {
        let bus = EventBus::new();
        let (rx1, _) = bus.subscribe();
        let (rx2, _) = bus.subscribe();

        bus.notify(NotifyLevel::Info, "Sound muted");

        let expected = Event::Notification {
            level: NotifyLevel::Info,
            message: "Sound muted".to_string(),
        };
        assert_eq!(rx1.try_recv().unwrap(), expected);
        assert_eq!(rx2.try_recv().unwrap(), expected);
    }

    #[test]
    fn test_broadcast_event() {
        let bus = EventBus::new();
        let (rx, _) = bus.subscribe();

        bus.broadcast("audio.volume", r#"{"group":"music","volume":55}"#);

        match rx.try_recv().unwrap() {
            Event::Broadcast { channel, payload } => {
                assert_eq!(channel, "audio.volume");
                assert!(payload.contains("55"));
            }
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let bus = EventBus::new();
        let (rx, _) = bus.subscribe();
        drop(rx);
        let (_keep, _) = bus.subscribe();

        bus.publish(Event::Shutdown);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_clones_share_subscribers() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        let (rx, _) = bus1.subscribe();
        assert_eq!(bus2.subscriber_count(), 1);

        bus2.publish(Event::Shutdown);
        assert_eq!(rx.try_recv().unwrap(), Event::Shutdown);
    }
}
