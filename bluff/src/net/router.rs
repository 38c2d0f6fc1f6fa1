//! Message router: turns parsed client messages into room operations and
//! rejections into private error replies.
//!
//! The router is transport-agnostic. A connection registers an outbound
//! channel, feeds inbound text frames through [`MessageRouter::handle_text`],
//! and calls [`MessageRouter::disconnect`] when it goes away.

use std::sync::Arc;

use super::{
    messages::{ClientMessage, ServerMessage},
    session::{Outbound, Session, SessionRegistry},
};
use crate::{
    game::{
        GameError,
        entities::{ClientId, RoomId},
    },
    room::{RoomHandle, RoomManager, RoomMessage, RoomResponse},
};

/// Reply for payloads that do not parse into a known message.
pub const INVALID_MESSAGE: &str = "Invalid message format";

pub struct MessageRouter {
    rooms: Arc<RoomManager>,
    sessions: Arc<SessionRegistry>,
}

impl MessageRouter {
    pub fn new(rooms: Arc<RoomManager>, sessions: Arc<SessionRegistry>) -> Self {
        Self { rooms, sessions }
    }

    pub fn rooms(&self) -> &Arc<RoomManager> {
        &self.rooms
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Registers a connection and greets it with its identifier.
    pub async fn connect(&self, outbound: Outbound) -> Session {
        let session = self.sessions.register(outbound).await;
        session.send(ServerMessage::Hello {
            client_id: session.client_id.clone(),
        });
        log::info!("Client {} connected", session.client_id);
        session
    }

    /// Handles one inbound text frame.
    pub async fn handle_text(&self, session: &Session, text: &str) {
        match ClientMessage::parse(text) {
            Ok(message) => self.dispatch(session, message).await,
            Err(e) => {
                log::debug!("Unparseable message from {}: {}", session.client_id, e);
                session.send(ServerMessage::error(INVALID_MESSAGE));
            }
        }
    }

    /// Applies one message on behalf of `session`. Rejections are reported to
    /// the sender only; silent ones are just logged.
    pub async fn dispatch(&self, session: &Session, message: ClientMessage) {
        let result = match message {
            ClientMessage::CreateRoom { name } => self.create_room(session, name).await,
            ClientMessage::JoinRoom { room_id, name } => {
                self.join_room(session, RoomId::new(&room_id), name).await
            }
            ClientMessage::LeaveRoom => {
                self.leave_current(&session.client_id).await;
                Ok(())
            }
            ClientMessage::StartGame => {
                let client_id = session.client_id.clone();
                self.forward(session, |response| RoomMessage::StartGame {
                    client_id,
                    response,
                })
                .await
            }
            ClientMessage::Play { cards, claim_rank } => {
                let client_id = session.client_id.clone();
                self.forward(session, |response| RoomMessage::Play {
                    client_id,
                    cards,
                    claim_rank,
                    response,
                })
                .await
            }
            ClientMessage::Accept => {
                let client_id = session.client_id.clone();
                self.forward(session, |response| RoomMessage::Accept {
                    client_id,
                    response,
                })
                .await
            }
            ClientMessage::Challenge => {
                let client_id = session.client_id.clone();
                self.forward(session, |response| RoomMessage::Challenge {
                    client_id,
                    response,
                })
                .await
            }
        };

        if let Err(e) = result {
            log::debug!("Rejected request from {}: {:?}", session.client_id, e);
            if !e.is_silent() {
                session.send(ServerMessage::error(e.to_string()));
            }
        }
    }

    /// Drops a connection, leaving its room first.
    pub async fn disconnect(&self, client_id: &ClientId) {
        self.leave_current(client_id).await;
        self.sessions.unregister(client_id).await;
        log::info!("Client {} disconnected", client_id);
    }

    async fn create_room(&self, session: &Session, name: String) -> Result<(), GameError> {
        let previous = self.sessions.room_of(&session.client_id).await;

        let (room_id, handle) = self.rooms.create_room(&session.client_id).await;
        if let Err(e) = self.seat(session, &handle, name).await {
            self.rooms.destroy_room(&room_id, &handle).await;
            return Err(e);
        }

        if let Some(previous) = previous {
            self.release_seat(&session.client_id, &previous).await;
        }
        Ok(())
    }

    /// Seats the client in `room_id`. A client switching rooms keeps its
    /// current seat until the new one is granted.
    async fn join_room(
        &self,
        session: &Session,
        room_id: RoomId,
        name: String,
    ) -> Result<(), GameError> {
        let handle = self
            .rooms
            .get_room(&room_id)
            .await
            .ok_or(GameError::RoomNotFound)?;

        let previous = self.sessions.room_of(&session.client_id).await;
        if previous.as_ref() == Some(&room_id) {
            return Err(GameError::AlreadyInRoom);
        }

        self.seat(session, &handle, name).await?;

        if let Some(previous) = previous {
            self.release_seat(&session.client_id, &previous).await;
        }
        Ok(())
    }

    async fn seat(
        &self,
        session: &Session,
        handle: &RoomHandle,
        name: String,
    ) -> Result<(), GameError> {
        let response = handle
            .request(|response| RoomMessage::Join {
                session: session.clone(),
                name,
                response,
            })
            .await
            .ok_or(GameError::RoomNotFound)?;
        response.into_result()?;

        self.sessions
            .set_room(&session.client_id, Some(handle.room_id().clone()))
            .await;
        Ok(())
    }

    /// Leaves whatever room the client sits in. A no-op outside a room.
    async fn leave_current(&self, client_id: &ClientId) {
        let Some(room_id) = self.sessions.room_of(client_id).await else {
            return;
        };
        self.sessions.set_room(client_id, None).await;
        self.release_seat(client_id, &room_id).await;
    }

    /// Removes the client from `room_id` and destroys the room once empty.
    async fn release_seat(&self, client_id: &ClientId, room_id: &RoomId) {
        let Some(handle) = self.rooms.get_room(room_id).await else {
            return;
        };
        let response = handle
            .request(|response| RoomMessage::Leave {
                client_id: client_id.clone(),
                response,
            })
            .await;

        if let Some(RoomResponse::Left { remaining: 0 }) = response {
            self.rooms.destroy_room(room_id, &handle).await;
        }
    }

    /// Sends a game operation to the caller's room.
    async fn forward(
        &self,
        session: &Session,
        build: impl FnOnce(tokio::sync::oneshot::Sender<RoomResponse>) -> RoomMessage,
    ) -> Result<(), GameError> {
        let room_id = self
            .sessions
            .room_of(&session.client_id)
            .await
            .ok_or(GameError::NotInRoom)?;
        let handle = self
            .rooms
            .get_room(&room_id)
            .await
            .ok_or(GameError::RoomNotFound)?;

        handle
            .request(build)
            .await
            .ok_or(GameError::RoomNotFound)?
            .into_result()
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ids::ScriptedIds,
        net::session::OUTBOUND_CAPACITY,
        room::RoomConfig,
    };
    use rand::{SeedableRng, rngs::StdRng};
    use tokio::sync::mpsc;

    fn router() -> MessageRouter {
        let rooms = RoomManager::with_sources(
            RoomConfig::default(),
            Box::new(ScriptedIds::new(["ROOMA", "ROOMB"])),
            StdRng::seed_from_u64(1),
        );
        MessageRouter::new(Arc::new(rooms), Arc::new(SessionRegistry::new()))
    }

    async fn connect(router: &MessageRouter) -> (Session, mpsc::Receiver<ServerMessage>) {
        let (tx, mut rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let session = router.connect(tx).await;
        assert!(matches!(rx.recv().await, Some(ServerMessage::Hello { .. })));
        (session, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn test_malformed_payload_gets_error() {
        let router = router();
        let (session, mut rx) = connect(&router).await;

        router.handle_text(&session, "{not json").await;
        router.handle_text(&session, r#"{"type":"fold"}"#).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                ServerMessage::error(INVALID_MESSAGE),
                ServerMessage::error(INVALID_MESSAGE)
            ]
        );
    }

    #[tokio::test]
    async fn test_play_outside_room_is_rejected() {
        let router = router();
        let (session, mut rx) = connect(&router).await;

        router.handle_text(&session, r#"{"type":"accept"}"#).await;

        assert_eq!(drain(&mut rx), vec![ServerMessage::error("Not in a room")]);
    }

    #[tokio::test]
    async fn test_join_unknown_room() {
        let router = router();
        let (session, mut rx) = connect(&router).await;

        router
            .handle_text(&session, r#"{"type":"join_room","roomId":"nope1"}"#)
            .await;

        assert_eq!(drain(&mut rx), vec![ServerMessage::error("Room not found")]);
    }

    #[tokio::test]
    async fn test_start_by_non_host_is_silent() {
        let router = router();
        let (host, _host_rx) = connect(&router).await;
        let (guest, mut guest_rx) = connect(&router).await;

        router.handle_text(&host, r#"{"type":"create_room"}"#).await;
        router
            .handle_text(&guest, r#"{"type":"join_room","roomId":"rooma"}"#)
            .await;
        drain(&mut guest_rx);

        router.handle_text(&guest, r#"{"type":"start_game"}"#).await;

        assert!(drain(&mut guest_rx).is_empty());
    }

    #[tokio::test]
    async fn test_rejoining_same_room_is_rejected() {
        let router = router();
        let (session, mut rx) = connect(&router).await;

        router.handle_text(&session, r#"{"type":"create_room"}"#).await;
        drain(&mut rx);
        router
            .handle_text(&session, r#"{"type":"join_room","roomId":"ROOMA"}"#)
            .await;

        assert_eq!(
            drain(&mut rx),
            vec![ServerMessage::error(GameError::AlreadyInRoom.to_string())]
        );
    }

    #[tokio::test]
    async fn test_switching_rooms_leaves_and_destroys_old_room() {
        let router = router();
        let (alice, _alice_rx) = connect(&router).await;
        let (bob, _bob_rx) = connect(&router).await;

        router.handle_text(&alice, r#"{"type":"create_room"}"#).await;
        router.handle_text(&bob, r#"{"type":"create_room"}"#).await;
        assert_eq!(router.rooms().room_count().await, 2);

        router
            .handle_text(&alice, r#"{"type":"join_room","roomId":"ROOMB"}"#)
            .await;

        assert_eq!(router.rooms().room_count().await, 1);
        assert_eq!(
            router.sessions().room_of(&alice.client_id).await,
            Some(RoomId::new("ROOMB"))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_switch_into_contested_last_seat() {
        let join_b = r#"{"type":"join_room","roomId":"ROOMB"}"#;

        for _ in 0..20 {
            let router = router();
            let (switcher, _switcher_rx) = connect(&router).await;
            router.handle_text(&switcher, r#"{"type":"create_room"}"#).await;

            let mut seated = Vec::new();
            let (host_b, host_b_rx) = connect(&router).await;
            router.handle_text(&host_b, r#"{"type":"create_room"}"#).await;
            seated.push(host_b_rx);
            for _ in 0..3 {
                let (guest, rx) = connect(&router).await;
                router.handle_text(&guest, join_b).await;
                seated.push(rx);
            }
            let (newcomer, _newcomer_rx) = connect(&router).await;

            tokio::join!(
                router.handle_text(&switcher, join_b),
                router.handle_text(&newcomer, join_b),
            );

            let room_a = RoomId::new("ROOMA");
            let room_b = RoomId::new("ROOMB");
            let switcher_room = router.sessions().room_of(&switcher.client_id).await;
            let newcomer_room = router.sessions().room_of(&newcomer.client_id).await;
            let rooms = router.rooms().list_rooms().await;
            let summary_b = rooms.iter().find(|r| r.room_id == room_b).unwrap();
            assert_eq!(summary_b.player_count, 5);

            if switcher_room.as_ref() == Some(&room_b) {
                assert_eq!(newcomer_room, None);
                assert!(router.rooms().get_room(&room_a).await.is_none());
            } else {
                // Rejected switch keeps the old seat
                assert_eq!(switcher_room, Some(room_a.clone()));
                assert_eq!(newcomer_room, Some(room_b.clone()));
                let summary_a = rooms.iter().find(|r| r.room_id == room_a).unwrap();
                assert_eq!(summary_a.player_count, 1);
            }
        }
    }

    #[tokio::test]
    async fn test_disconnect_destroys_empty_room() {
        let router = router();
        let (session, _rx) = connect(&router).await;

        router.handle_text(&session, r#"{"type":"create_room"}"#).await;
        assert_eq!(router.rooms().room_count().await, 1);

        router.disconnect(&session.client_id).await;

        assert_eq!(router.rooms().room_count().await, 0);
        assert_eq!(router.sessions().connection_count().await, 0);
    }
}
