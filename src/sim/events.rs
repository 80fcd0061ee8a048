//! Notifications emitted by the simulation
//!
//! Events are queued while a tick runs and delivered in queue order once the
//! tick has finished, so observers only ever see a consistent post-tick state.

use glam::Vec3;

use super::skills::SkillKind;

/// Effect requests for the presentation/audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Skill(SkillKind),
    Destruction,
    WallBounce,
    PlayerHit,
}

/// Everything the core tells the outside world
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ScoreChanged { delta: u64, total: u64 },
    ExperienceGained { amount: u64, total: u64 },
    LevelChanged { level: u32 },
    GrowthStageChanged { stage: u32 },
    ZoneActivated { index: usize, level: u32 },
    ZoneChanged { index: usize },
    ZoneCleared { index: usize },
    AllZonesCleared,
    ObjectDestroyed { id: u32, points: u32, zone_level: u32, pos: Vec3 },
    HealthChanged { id: u32, percentage: f32 },
    SkillAcquired { kind: SkillKind, level: u32 },
    SkillRemoved { kind: SkillKind },
    ProjectileFired { id: u32, target: Option<u32> },
    PlayEffect { kind: EffectKind, pos: Vec3 },
}

/// Returned by a subscriber to stay registered or drop out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Keep,
    Unsubscribe,
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

type Callback = Box<dyn FnMut(&GameEvent) -> Delivery>;

/// Queue plus subscriber list
#[derive(Default)]
pub struct EventBus {
    queue: Vec<GameEvent>,
    subscribers: Vec<(SubscriberId, Callback)>,
    next_id: u32,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queued", &self.queue.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for delivery at the end of the tick
    pub fn push(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    /// Register a callback; it sees every event dispatched after this call
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&GameEvent) -> Delivery + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deliver every queued event, in order, to every subscriber.
    ///
    /// A subscriber that answers [`Delivery::Unsubscribe`] receives no
    /// further events, including the rest of the current batch.
    pub fn dispatch(&mut self) -> usize {
        let events = std::mem::take(&mut self.queue);
        for event in &events {
            self.subscribers
                .retain_mut(|(_, callback)| callback(event) == Delivery::Keep);
        }
        events.len()
    }

    /// Take the queued events without delivering them (pull model)
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn pending(&self) -> &[GameEvent] {
        &self.queue
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_preserves_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(move |e| {
            sink.borrow_mut().push(e.clone());
            Delivery::Keep
        });

        bus.push(GameEvent::LevelChanged { level: 2 });
        bus.push(GameEvent::LevelChanged { level: 3 });
        assert_eq!(bus.dispatch(), 2);

        assert_eq!(
            *seen.borrow(),
            vec![GameEvent::LevelChanged { level: 2 }, GameEvent::LevelChanged { level: 3 }]
        );
        assert!(bus.pending().is_empty());
    }

    #[test]
    fn test_unsubscribe_mid_dispatch() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        bus.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Delivery::Unsubscribe
        });

        bus.push(GameEvent::AllZonesCleared);
        bus.push(GameEvent::AllZonesCleared);
        bus.dispatch();

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(|_| Delivery::Keep);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_drain_skips_subscribers() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        bus.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Delivery::Keep
        });
        bus.push(GameEvent::ZoneChanged { index: 1 });
        let drained = bus.drain();
        assert_eq!(drained, vec![GameEvent::ZoneChanged { index: 1 }]);
        assert_eq!(bus.dispatch(), 0);
        assert_eq!(*count.borrow(), 0);
    }
}
