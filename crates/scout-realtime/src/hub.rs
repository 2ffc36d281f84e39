//! Subscriber registry and best-effort fanout.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use scout_models::{Channel, RealtimeMessage, Scope};

use crate::error::{RealtimeError, RealtimeResult};

/// Outbound messages buffered per connection before it is considered dead.
pub const OUTBOUND_QUEUE_SIZE: usize = 32;

const NOTIFICATIONS_DELIVERED: &str = "scout_notifications_delivered_total";
const NOTIFICATIONS_DROPPED: &str = "scout_notifications_dropped_total";

/// Identifies one live connection for the lifetime of the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

struct Connection {
    sender: mpsc::Sender<String>,
    /// At most one channel scope per connection
    channel: Option<Channel>,
    players: HashSet<String>,
}

impl Connection {
    fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.channel
            .map(Scope::Channel)
            .into_iter()
            .chain(self.players.iter().cloned().map(Scope::Player))
    }
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    scopes: HashMap<Scope, HashSet<ConnectionId>>,
}

impl Registry {
    fn detach(&mut self, id: ConnectionId, scope: &Scope) {
        if let Some(members) = self.scopes.get_mut(scope) {
            members.remove(&id);
            if members.is_empty() {
                self.scopes.remove(scope);
            }
        }
    }

    fn remove(&mut self, id: ConnectionId) -> bool {
        let Some(conn) = self.connections.remove(&id) else {
            return false;
        };
        for scope in conn.scopes() {
            self.detach(id, &scope);
        }
        true
    }
}

/// Per-scope subscriber sets with best-effort delivery.
///
/// Each connection is represented by the sending half of a bounded queue
/// that a writer task drains into the socket. Delivery never waits: a full
/// or closed queue marks the connection dead and it is removed from every
/// scope before the publish returns.
pub struct NotificationHub {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a connection's outbound queue. It receives nothing until subscribed.
    pub async fn register(&self, sender: mpsc::Sender<String>) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry.write().await.connections.insert(
            id,
            Connection {
                sender,
                channel: None,
                players: HashSet::new(),
            },
        );
        debug!(connection_id = %id, "Registered realtime connection");
        id
    }

    /// Attach a connection to a scope.
    ///
    /// Subscribing to a channel replaces any channel the connection already held.
    pub async fn subscribe(&self, id: ConnectionId, scope: Scope) -> RealtimeResult<()> {
        let mut registry = self.registry.write().await;
        let conn = registry
            .connections
            .get_mut(&id)
            .ok_or(RealtimeError::UnknownConnection(id))?;

        let replaced = match &scope {
            Scope::Channel(channel) => conn.channel.replace(*channel).filter(|c| c != channel),
            Scope::Player(player_id) => {
                conn.players.insert(player_id.clone());
                None
            }
        };
        if let Some(previous) = replaced {
            registry.detach(id, &Scope::Channel(previous));
        }
        registry.scopes.entry(scope.clone()).or_default().insert(id);
        info!(connection_id = %id, scope = %scope, "Subscribed");
        Ok(())
    }

    /// Detach a connection from one scope; the connection stays registered.
    pub async fn unsubscribe(&self, id: ConnectionId, scope: &Scope) {
        let mut registry = self.registry.write().await;
        let Some(conn) = registry.connections.get_mut(&id) else {
            return;
        };
        match scope {
            Scope::Channel(channel) if conn.channel == Some(*channel) => conn.channel = None,
            Scope::Player(player_id) => {
                conn.players.remove(player_id);
            }
            Scope::Channel(_) => return,
        }
        registry.detach(id, scope);
        debug!(connection_id = %id, scope = %scope, "Unsubscribed");
    }

    /// Forget a connection and remove it from every scope.
    pub async fn disconnect(&self, id: ConnectionId) {
        if self.registry.write().await.remove(id) {
            info!(connection_id = %id, "Realtime connection closed");
        }
    }

    /// Deliver `message` to every subscriber of `scope`; returns the number reached.
    pub async fn publish(&self, message: &RealtimeMessage, scope: &Scope) -> RealtimeResult<usize> {
        let payload = serde_json::to_string(message)?;
        let mut registry = self.registry.write().await;

        let targets: Vec<ConnectionId> = match registry.scopes.get(scope) {
            Some(members) => members.iter().copied().collect(),
            None => return Ok(0),
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for id in targets {
            let sent = registry
                .connections
                .get(&id)
                .is_some_and(|conn| conn.sender.try_send(payload.clone()).is_ok());
            if sent {
                delivered += 1;
            } else {
                dead.push(id);
            }
        }

        for id in &dead {
            registry.remove(*id);
            debug!(connection_id = %id, scope = %scope, "Dropped unresponsive subscriber");
        }

        let kind = message.type_name();
        counter!(NOTIFICATIONS_DELIVERED, "type" => kind).increment(delivered as u64);
        if !dead.is_empty() {
            counter!(NOTIFICATIONS_DROPPED, "type" => kind).increment(dead.len() as u64);
        }
        Ok(delivered)
    }

    /// Deliver to a single connection regardless of its scopes.
    pub async fn send_personal(&self, id: ConnectionId, message: &RealtimeMessage) -> RealtimeResult<bool> {
        let payload = serde_json::to_string(message)?;
        let mut registry = self.registry.write().await;
        let Some(conn) = registry.connections.get(&id) else {
            return Ok(false);
        };
        if conn.sender.try_send(payload).is_ok() {
            return Ok(true);
        }
        registry.remove(id);
        Ok(false)
    }

    /// Registered connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    /// Subscribers of one scope.
    pub async fn subscriber_count(&self, scope: &Scope) -> usize {
        self.registry
            .read()
            .await
            .scopes
            .get(scope)
            .map_or(0, |members| members.len())
    }
}
