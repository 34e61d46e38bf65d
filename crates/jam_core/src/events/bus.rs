//! Synchronous publish/subscribe

use std::collections::{HashMap, VecDeque};

use super::GameEvent;

pub type EventHandler = Box<dyn FnMut(&GameEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    /// `None` = all topics
    topic: Option<String>,
    handler: EventHandler,
}

/// Handlers run inline, in subscription order, on the publishing tick.
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    history: VecDeque<GameEvent>,
    history_capacity: usize,
    counts: HashMap<&'static str, u64>,
    next_id: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("history", &self.history.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_history(1024)
    }

    pub fn with_history(history_capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            history: VecDeque::new(),
            history_capacity,
            counts: HashMap::new(),
            next_id: 1,
        }
    }

    fn add(&mut self, topic: Option<String>, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, topic, handler });
        id
    }

    pub fn subscribe(&mut self, topic: impl Into<String>, handler: EventHandler) -> SubscriptionId {
        self.add(Some(topic.into()), handler)
    }

    pub fn subscribe_all(&mut self, handler: EventHandler) -> SubscriptionId {
        self.add(None, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        before != self.subscribers.len()
    }

    pub fn publish(&mut self, event: GameEvent) {
        let topic = event.topic();
        tracing::trace!(topic, "publish");
        for sub in self.subscribers.iter_mut() {
            if sub.topic.as_deref().map_or(true, |t| t == topic) {
                (sub.handler)(&event);
            }
        }
        *self.counts.entry(topic).or_insert(0) += 1;
        if self.history_capacity > 0 {
            if self.history.len() >= self.history_capacity {
                self.history.pop_front();
            }
            self.history.push_back(event);
        }
    }

    /// Number of events published on `topic` since creation.
    pub fn count(&self, topic: &str) -> u64 {
        self.counts.get(topic).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &HashMap<&'static str, u64> {
        &self.counts
    }

    pub fn history(&self) -> impl Iterator<Item = &GameEvent> {
        self.history.iter()
    }

    pub fn events_of<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a GameEvent> {
        self.history.iter().filter(move |e| e.topic() == topic)
    }

    pub fn last(&self) -> Option<&GameEvent> {
        self.history.back()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerId, TeamSide};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn violation() -> GameEvent {
        GameEvent::ShotClockViolation { team: TeamSide::Home }
    }

    fn shove() -> GameEvent {
        GameEvent::Shove { attacker: PlayerId(0), victim: PlayerId(2) }
    }

    #[test]
    fn test_topic_filtering() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let all = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();

        let sink = seen.clone();
        bus.subscribe("shove", Box::new(move |e| sink.borrow_mut().push(e.topic())));
        let counter = all.clone();
        bus.subscribe_all(Box::new(move |_| *counter.borrow_mut() += 1));

        bus.publish(violation());
        bus.publish(shove());

        assert_eq!(*seen.borrow(), vec!["shove"]);
        assert_eq!(*all.borrow(), 2);
        assert_eq!(bus.count("shove"), 1);
        assert_eq!(bus.count("turnover"), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = hits.clone();
        let id = bus.subscribe("shove", Box::new(move |_| *counter.borrow_mut() += 1));
        bus.publish(shove());
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(shove());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_history_bounded() {
        let mut bus = EventBus::with_history(2);
        for _ in 0..5 {
            bus.publish(violation());
        }
        assert_eq!(bus.history().count(), 2);
        assert_eq!(bus.count("shot_clock_violation"), 5);
    }
}
