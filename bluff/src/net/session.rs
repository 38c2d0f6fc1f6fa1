//! Connection registry: live client identifiers, their outbound channels and
//! the room each one currently sits in.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock, mpsc};

use crate::{
    game::entities::{ClientId, RoomId},
    ids::{CLIENT_ID_LEN, IdSource, RandomIds, unique_id},
    net::messages::ServerMessage,
};

/// Outbound queue depth per connection.
pub const OUTBOUND_CAPACITY: usize = 64;

pub type Outbound = mpsc::Sender<ServerMessage>;

/// What a connection carries alongside every inbound message: who it is and
/// where replies go. Independent of the transport that produced it.
#[derive(Clone, Debug)]
pub struct Session {
    pub client_id: ClientId,
    pub outbound: Outbound,
}

impl Session {
    /// Queues a private message. Returns `false` if the connection is gone
    /// or too far behind.
    pub fn send(&self, message: ServerMessage) -> bool {
        match self.outbound.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Outbound queue full for {}, dropping message", self.client_id);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

struct ConnectionEntry {
    outbound: Outbound,
    room: Option<RoomId>,
}

pub struct SessionRegistry {
    connections: Arc<RwLock<HashMap<ClientId, ConnectionEntry>>>,
    ids: Mutex<Box<dyn IdSource>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_id_source(Box::new(RandomIds::from_entropy()))
    }

    pub fn with_id_source(ids: Box<dyn IdSource>) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            ids: Mutex::new(ids),
        }
    }

    /// Registers a new connection under a fresh 8-character identifier.
    pub async fn register(&self, outbound: Outbound) -> Session {
        let mut ids = self.ids.lock().await;
        let mut connections = self.connections.write().await;

        let client_id = ClientId::from(unique_id(&mut **ids, CLIENT_ID_LEN, |candidate| {
            connections.contains_key(&ClientId::new(candidate))
        }));
        connections.insert(
            client_id.clone(),
            ConnectionEntry {
                outbound: outbound.clone(),
                room: None,
            },
        );

        Session {
            client_id,
            outbound,
        }
    }

    /// Forgets a connection and returns the room it was in, if any.
    pub async fn unregister(&self, client_id: &ClientId) -> Option<RoomId> {
        let mut connections = self.connections.write().await;
        connections.remove(client_id).and_then(|entry| entry.room)
    }

    pub async fn room_of(&self, client_id: &ClientId) -> Option<RoomId> {
        let connections = self.connections.read().await;
        connections.get(client_id).and_then(|entry| entry.room.clone())
    }

    pub async fn set_room(&self, client_id: &ClientId, room: Option<RoomId>) {
        let mut connections = self.connections.write().await;
        if let Some(entry) = connections.get_mut(client_id) {
            entry.room = room;
        }
    }

    /// Rebuilds the session handle for a live connection.
    pub async fn session(&self, client_id: &ClientId) -> Option<Session> {
        let connections = self.connections.read().await;
        connections.get(client_id).map(|entry| Session {
            client_id: client_id.clone(),
            outbound: entry.outbound.clone(),
        })
    }

    pub async fn connection_count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ScriptedIds;

    #[tokio::test]
    async fn test_register_assigns_unique_ids() {
        let ids = ScriptedIds::new(["AAAAAAAA", "AAAAAAAA", "BBBBBBBB"]);
        let registry = SessionRegistry::with_id_source(Box::new(ids));
        let (tx, _rx) = mpsc::channel(OUTBOUND_CAPACITY);

        let first = registry.register(tx.clone()).await;
        let second = registry.register(tx).await;

        assert_eq!(first.client_id.as_str(), "AAAAAAAA");
        assert_eq!(second.client_id.as_str(), "BBBBBBBB");
        assert_eq!(registry.connection_count().await, 2);

        let found = registry.session(&second.client_id).await.unwrap();
        assert!(found.outbound.same_channel(&second.outbound));
    }

    #[tokio::test]
    async fn test_room_membership_tracking() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let session = registry.register(tx).await;
        assert_eq!(session.client_id.as_str().len(), CLIENT_ID_LEN);

        assert_eq!(registry.room_of(&session.client_id).await, None);
        registry
            .set_room(&session.client_id, Some(RoomId::new("QWERT")))
            .await;
        assert_eq!(
            registry.room_of(&session.client_id).await,
            Some(RoomId::new("QWERT"))
        );

        let left = registry.unregister(&session.client_id).await;
        assert_eq!(left, Some(RoomId::new("QWERT")));
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_session_send_reports_closed() {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let session = Session {
            client_id: ClientId::new("ABCDEFGH"),
            outbound: tx,
        };
        assert!(session.send(ServerMessage::error("x")));
        drop(rx);
        assert!(!session.send(ServerMessage::error("y")));
    }
}
