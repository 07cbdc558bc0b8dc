//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::repository::{MatchId, TournamentId};

use super::types::{MatchEvent, TournamentEvent};

/// Topics for event routing, one per live record.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    Match(MatchId),
    Tournament(TournamentId),
}

/// Event wrapper that carries the topic and typed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Match(MatchEvent),
    Tournament(TournamentEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Match(event) => Topic::Match(event.match_id()),
            Event::Tournament(event) => Topic::Tournament(event.tournament_id()),
        }
    }
}

/// Topic-based event bus.
///
/// Channels are created lazily on first subscription. Publishing is
/// best-effort: an event for a topic nobody subscribed to is dropped.
/// No panic can occur while the channel map lock is held, so a poisoned
/// guard still protects a consistent map and is recovered on both paths.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<Event>>>>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new event bus with default capacity per topic.
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with the given capacity per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish an event to its topic.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(tx) = channels.get(&topic)
            && tx.send(event).is_err()
        {
            // All receivers for this topic were dropped
            tracing::trace!(?topic, "no live subscribers for topic");
        }
    }

    /// Subscribe to a single topic, creating its channel if needed.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            capacity: self.capacity,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use arena_core::PlayerAddress;

    use super::*;

    fn finished(id: u64) -> Event {
        Event::Match(MatchEvent::Finished {
            id: MatchId(id),
            winner: PlayerAddress::from("0xwinner"),
        })
    }

    #[tokio::test]
    async fn events_route_to_their_own_topic() {
        let bus = EventBus::new();
        let mut first = bus.subscribe(Topic::Match(MatchId(1)));
        let mut second = bus.subscribe(Topic::Match(MatchId(2)));

        bus.publish(finished(1));

        assert_eq!(first.recv().await.unwrap(), finished(1));
        assert!(second.try_recv().is_err());
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(finished(7));

        // A late subscriber only sees events published after it joined
        let mut rx = bus.subscribe(Topic::Match(MatchId(7)));
        bus.publish(finished(7));
        assert_eq!(rx.recv().await.unwrap(), finished(7));
    }

    #[tokio::test]
    async fn bus_survives_a_poisoned_lock() {
        let bus = EventBus::new();
        let channels = Arc::clone(&bus.channels);
        std::thread::spawn(move || {
            let _guard = channels.write().unwrap();
            panic!("poison the channel map lock");
        })
        .join()
        .unwrap_err();

        let mut rx = bus.subscribe(Topic::Match(MatchId(1)));
        bus.publish(finished(1));
        assert_eq!(rx.recv().await.unwrap(), finished(1));
    }
}
