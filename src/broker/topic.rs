//! Room membership.
//!
//! A `Topic` holds the set of subscriber ids joined to one room. Duplicate
//! subscriptions and removals of absent ids are no-ops, which makes the
//! subscribe/unsubscribe protocol messages idempotent.
//!
//! Callers must synchronize access (the broker lock) when mutating a room.

use std::collections::HashSet;

pub type SubscriberId = String;

#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashSet<SubscriberId>,
}

impl Topic {
    /// Create a new room with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashSet::new(),
        }
    }

    /// Add a subscriber to the room. Duplicate adds are ignored.
    pub fn subscribe(&mut self, id: SubscriberId) {
        self.subscribers.insert(id);
    }

    /// Remove a subscriber from the room.
    pub fn unsubscribe(&mut self, id: &SubscriberId) {
        self.subscribers.remove(id);
    }
}
