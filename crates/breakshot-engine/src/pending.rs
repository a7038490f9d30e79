use std::collections::{HashMap, HashSet};
use std::fmt;

use breakshot_core::BallId;

use crate::error::EngineError;
use crate::event::CollisionEvent;

/// Handle for an event in a [`PendingEvents`] set. Ids are never reused within
/// one set, so a lower id was inserted earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Predicted contacts for the rest of the tick.
///
/// Each ball is referenced by at most one event, so the ball index maps a ball
/// straight to the single event it takes part in. Purging a ball is a lookup,
/// never a scan.
#[derive(Debug, Default)]
pub struct PendingEvents {
    events: HashMap<EventId, CollisionEvent>,
    by_ball: HashMap<BallId, EventId>,
    next_id: u64,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The event `ball` currently takes part in.
    pub fn event_for(&self, ball: BallId) -> Option<(EventId, &CollisionEvent)> {
        let id = *self.by_ball.get(&ball)?;
        self.events.get(&id).map(|event| (id, event))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventId, &CollisionEvent)> {
        self.events.iter().map(|(&id, event)| (id, event))
    }

    /// The soonest event, ties going to the one predicted first.
    pub fn earliest(&self) -> Option<(EventId, &CollisionEvent)> {
        self.iter()
            .min_by(|(ia, a), (ib, b)| a.time.total_cmp(&b.time).then(ia.cmp(ib)))
    }

    /// Add an event. Every participant must be free.
    pub(crate) fn insert(&mut self, event: CollisionEvent) -> Result<EventId, EngineError> {
        if let Some(ball) = event.participants().find(|b| self.by_ball.contains_key(b)) {
            return Err(EngineError::SharedParticipant { ball });
        }
        let id = EventId(self.next_id);
        self.next_id += 1;
        for ball in event.participants() {
            self.by_ball.insert(ball, id);
        }
        self.events.insert(id, event);
        Ok(id)
    }

    pub(crate) fn remove(&mut self, id: EventId) -> Option<CollisionEvent> {
        let event = self.events.remove(&id)?;
        for ball in event.participants() {
            if self.by_ball.get(&ball) == Some(&id) {
                self.by_ball.remove(&ball);
            }
        }
        Some(event)
    }

    /// Drop whatever event references `ball`, returning it.
    pub(crate) fn purge(&mut self, ball: BallId) -> Option<CollisionEvent> {
        let id = *self.by_ball.get(&ball)?;
        self.remove(id)
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.by_ball.clear();
    }

    /// Verify that no ball appears in two events and that the ball index agrees
    /// with the event table.
    pub fn check_invariant(&self) -> Result<(), EngineError> {
        let mut seen = HashSet::new();
        for (&id, event) in &self.events {
            for ball in event.participants() {
                if !seen.insert(ball) || self.by_ball.get(&ball) != Some(&id) {
                    return Err(EngineError::SharedParticipant { ball });
                }
            }
        }
        if let Some(&ball) = self.by_ball.keys().find(|b| !seen.contains(*b)) {
            return Err(EngineError::SharedParticipant { ball });
        }
        Ok(())
    }
}
