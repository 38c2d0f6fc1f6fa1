//! Room actor: one tokio task per room, applying messages one at a time.

use rand::rngs::StdRng;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

use super::{
    config::RoomConfig,
    messages::{RoomMessage, RoomResponse, RoomSummary},
};
use crate::{
    game::{
        Room,
        entities::{CardId, ClientId, RoomId},
    },
    net::{messages::ServerMessage, session::Session},
};

/// Inbox depth per room.
const INBOX_CAPACITY: usize = 100;

/// Room actor handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    pub fn new(sender: mpsc::Sender<RoomMessage>, room_id: RoomId) -> Self {
        Self { sender, room_id }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Send a message to the room
    pub async fn send(&self, message: RoomMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Room is closed".to_string())
    }

    /// Sends a request and waits for the reply. `None` means the room has
    /// shut down.
    pub async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomMessage,
    ) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await.ok()?;
        rx.await.ok()
    }

    /// Whether both handles point at the same actor.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }
}

/// Room actor owning a single room's state machine
pub struct RoomActor {
    /// Game state
    room: Room,

    /// Message inbox
    inbox: mpsc::Receiver<RoomMessage>,

    /// Shuffle source
    rng: StdRng,

    /// Connections seated in this room
    members: HashMap<ClientId, Session>,

    /// Set once the last player leaves
    is_closed: bool,
}

impl RoomActor {
    /// Create a new room actor
    ///
    /// # Arguments
    ///
    /// * `id` - Room identifier
    /// * `config` - Seat limit and hand size
    /// * `rng` - Source for deck shuffles
    ///
    /// # Returns
    ///
    /// * `(RoomActor, RoomHandle)` - Actor and handle for sending messages
    pub fn new(id: RoomId, config: RoomConfig, rng: StdRng) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let actor = Self {
            room: Room::new(id.clone(), config),
            inbox,
            rng,
            members: HashMap::new(),
            is_closed: false,
        };

        (actor, RoomHandle::new(sender, id))
    }

    /// Run the room actor event loop
    pub async fn run(mut self) {
        log::info!("Room {} opened", self.room.id());

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        log::info!("Room {} closed", self.room.id());
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join {
                session,
                name,
                response,
            } => {
                let result = self.handle_join(session, name);
                let _ = response.send(result);
            }

            RoomMessage::Leave {
                client_id,
                response,
            } => {
                let result = self.handle_leave(&client_id);
                let _ = response.send(result);
            }

            RoomMessage::StartGame {
                client_id,
                response,
            } => {
                let result = self.handle_start(&client_id);
                let _ = response.send(result);
            }

            RoomMessage::Play {
                client_id,
                cards,
                claim_rank,
                response,
            } => {
                let result = self.handle_play(&client_id, &cards, &claim_rank);
                let _ = response.send(result);
            }

            RoomMessage::Accept {
                client_id,
                response,
            } => {
                let result = self.handle_accept(&client_id);
                let _ = response.send(result);
            }

            RoomMessage::Challenge {
                client_id,
                response,
            } => {
                let result = self.handle_challenge(&client_id);
                let _ = response.send(result);
            }

            RoomMessage::GetSummary { response } => {
                let _ = response.send(self.summary());
            }
        }
    }

    fn handle_join(&mut self, session: Session, name: String) -> RoomResponse {
        let client_id = session.client_id.clone();
        if let Err(e) = self.room.join(client_id.clone(), &name) {
            return RoomResponse::Rejected(e);
        }

        log::info!(
            "{} joined room {} ({}/{})",
            client_id,
            self.room.id(),
            self.room.player_count(),
            self.room.config().max_players
        );

        session.send(ServerMessage::Joined {
            room_id: self.room.id().clone(),
            client_id: client_id.clone(),
            host_id: self.room.host().cloned(),
        });
        self.members.insert(client_id, session);
        self.broadcast_state();

        RoomResponse::Success
    }

    fn handle_leave(&mut self, client_id: &ClientId) -> RoomResponse {
        if let Err(e) = self.room.leave(client_id) {
            return RoomResponse::Rejected(e);
        }
        self.members.remove(client_id);

        log::info!("{} left room {}", client_id, self.room.id());

        let remaining = self.room.player_count();
        if remaining == 0 {
            self.is_closed = true;
        } else {
            self.broadcast_state();
        }

        RoomResponse::Left { remaining }
    }

    fn handle_start(&mut self, client_id: &ClientId) -> RoomResponse {
        let result = self.room.start_game(client_id, &mut self.rng);
        if result.is_ok() {
            log::info!(
                "Room {} started a game with {} players",
                self.room.id(),
                self.room.player_count()
            );
            self.broadcast_state();
        }
        result.into()
    }

    fn handle_play(
        &mut self,
        client_id: &ClientId,
        cards: &[CardId],
        claim_rank: &str,
    ) -> RoomResponse {
        let result = self.room.play(client_id, cards, claim_rank);
        if result.is_ok() {
            self.broadcast_state();
        }
        result.into()
    }

    fn handle_accept(&mut self, client_id: &ClientId) -> RoomResponse {
        match self.room.accept(client_id) {
            Ok(_) => {
                self.log_winner();
                self.broadcast_state();
                RoomResponse::Success
            }
            Err(e) => RoomResponse::Rejected(e),
        }
    }

    fn handle_challenge(&mut self, client_id: &ClientId) -> RoomResponse {
        match self.room.challenge(client_id) {
            Ok(outcome) => {
                self.broadcast(ServerMessage::from(outcome));
                self.log_winner();
                self.broadcast_state();
                RoomResponse::Success
            }
            Err(e) => RoomResponse::Rejected(e),
        }
    }

    fn log_winner(&self) {
        if let Some(winner) = self.room.winner() {
            log::info!("Room {}: {} won", self.room.id(), winner);
        }
    }

    fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.room.id().clone(),
            status: self.room.status(),
            player_count: self.room.player_count(),
            max_players: self.room.config().max_players,
        }
    }

    /// Sends the same message to every seated connection
    fn broadcast(&self, message: ServerMessage) {
        for session in self.members.values() {
            session.send(message.clone());
        }
    }

    /// Pushes the public view to everyone, then each member's own hand
    fn broadcast_state(&self) {
        self.broadcast(ServerMessage::RoomState(self.room.public_view()));
        for (client_id, session) in &self.members {
            session.send(ServerMessage::Hand {
                hand: self.room.hand_view(client_id),
            });
        }
    }
}
