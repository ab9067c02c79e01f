//! Broker engine
//!
//! The in-memory fan-out hub responsible for:
//! - managing rooms and their subscriber sets
//! - delivering event envelopes to subscribed connections
//! - broadcasting service-wide events (simulation data, order notifications)
//! - emitting the periodic `systemStatus` heartbeat
//!
//! Concurrency and usage notes:
//! - The public API here is synchronous and designed to be held behind a
//!   lock (`Arc<Mutex<Broker>>`) by the transport and ingress layers. Callers
//!   must not hold the broker lock across network I/O.
//! - Delivery is at most once per subscriber per publish call. A send that
//!   fails because the connection's channel closed is logged and dropped;
//!   the subscription itself is removed when the transport runs
//!   `cleanup_client` on disconnect.
//! - The status loop is a background task, independent of any ingress event.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::envelope::Envelope;
use crate::broker::topic::{SubscriberId, Topic};
use crate::client::Client;

/// Room that receives every drone's location updates.
pub const ALL_DRONES_ROOM: &str = "all_drones";

/// Map a drone serial number to its room name. The reserved serial `"all"`
/// selects the wildcard room.
pub fn drone_room(serial: &str) -> String {
    if serial == "all" {
        ALL_DRONES_ROOM.to_string()
    } else {
        format!("drone_{serial}")
    }
}

#[derive(Debug, Default)]
pub struct Broker {
    pub(crate) topics: HashMap<String, Topic>,
    pub(crate) clients: HashMap<SubscriberId, Client>,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            topics: HashMap::new(),
            clients: HashMap::new(),
        }
    }

    /// Registers a newly connected client. Called by the transport before any
    /// other operation for that connection.
    pub fn register_client(&mut self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }

    pub fn remove_client(&mut self, client_id: &SubscriberId) {
        self.clients.remove(client_id);
    }

    /// Number of currently connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Subscribes a client to a room. Creates the room if it doesn't exist.
    /// Subscribing twice to the same room is a no-op.
    pub fn subscribe(&mut self, room: &str, subscriber: SubscriberId) {
        let topic = self
            .topics
            .entry(room.to_string())
            .or_insert_with(|| Topic::new(room));
        topic.subscribe(subscriber);
    }

    /// Unsubscribes a client from a room. Idempotent; unknown rooms are
    /// ignored.
    pub fn unsubscribe(&mut self, room: &str, subscriber: &SubscriberId) {
        if let Some(t) = self.topics.get_mut(room) {
            t.unsubscribe(subscriber);
        }
    }

    /// Delivers an envelope to every subscriber of `room`. Returns the number
    /// of connections the envelope was handed to.
    pub fn publish(&self, room: &str, envelope: &Envelope) -> usize {
        match self.topics.get(room) {
            Some(topic) => self.deliver(topic.subscribers.iter(), envelope),
            None => {
                debug!(room, event = %envelope.event, "publish to room with no subscribers");
                0
            }
        }
    }

    /// Delivers an envelope to the union of subscribers across `rooms`.
    ///
    /// A client joined to more than one of the rooms (a per-drone room and
    /// the wildcard room, typically) receives exactly one copy.
    pub fn publish_many(&self, rooms: &[&str], envelope: &Envelope) -> usize {
        let recipients: HashSet<&SubscriberId> = rooms
            .iter()
            .filter_map(|room| self.topics.get(*room))
            .flat_map(|topic| topic.subscribers.iter())
            .collect();
        self.deliver(recipients.into_iter(), envelope)
    }

    /// Delivers an envelope to every connected client, regardless of room
    /// membership. Used for simulation data, order notifications, and the
    /// system-status heartbeat.
    pub fn broadcast_all(&self, envelope: &Envelope) -> usize {
        self.deliver(self.clients.keys(), envelope)
    }

    fn deliver<'a>(
        &self,
        recipients: impl Iterator<Item = &'a SubscriberId>,
        envelope: &Envelope,
    ) -> usize {
        let text = match serde_json::to_string(envelope) {
            Ok(json) => json,
            Err(e) => {
                warn!(event = %envelope.event, "failed to serialize envelope: {e}");
                return 0;
            }
        };
        let ws_msg = WsMessage::text(text);

        let mut delivered = 0;
        for sub_id in recipients {
            match self.clients.get(sub_id) {
                Some(client) => {
                    if let Err(e) = client.sender.send(ws_msg.clone()) {
                        warn!(client = %sub_id, "failed to send to subscriber: {e}");
                    } else {
                        delivered += 1;
                    }
                }
                None => warn!(client = %sub_id, "no client registered for subscription"),
            }
        }
        delivered
    }

    /// Removes a client and drops its membership in every room. Called once
    /// per connection when the transport sees it close.
    pub fn cleanup_client(&mut self, client_id: &SubscriberId) {
        self.remove_client(client_id);

        for topic in self.topics.values_mut() {
            topic.unsubscribe(client_id);
        }

        debug!(client = %client_id, "cleaned up client");
    }

    /// Periodic liveness broadcast: every `interval`, sends a `systemStatus`
    /// envelope carrying the connected-client count to all clients. Run as a
    /// background task for the lifetime of the process.
    pub async fn start_status_loop(broker: Arc<Mutex<Broker>>, interval: Duration) {
        loop {
            tokio::time::sleep(interval).await;

            let broker_lock = match broker.lock() {
                Ok(guard) => guard,
                Err(e) => {
                    warn!("broker lock poisoned, stopping status loop: {e}");
                    return;
                }
            };

            let envelope = Envelope::new(
                "systemStatus",
                json!({
                    "connectedClients": broker_lock.client_count(),
                    "services": {
                        "locationReceiver": "online",
                    },
                }),
            );
            broker_lock.broadcast_all(&envelope);
        }
    }
}
