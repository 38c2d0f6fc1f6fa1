//! Room actor message types.

use serde::Serialize;
use tokio::sync::oneshot;

use crate::{
    game::{
        GameError,
        entities::{CardId, ClientId, RoomId, RoomStatus},
    },
    net::session::Session,
};

/// Messages that can be sent to a RoomActor
#[derive(Debug)]
pub enum RoomMessage {
    /// Take a seat; the session becomes a broadcast target
    Join {
        session: Session,
        name: String,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Give up the seat (explicit leave or dropped connection)
    Leave {
        client_id: ClientId,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Deal a new game (host only)
    StartGame {
        client_id: ClientId,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Put 1-3 cards on the pile under a claimed rank
    Play {
        client_id: ClientId,
        cards: Vec<CardId>,
        claim_rank: String,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Let the pending play stand
    Accept {
        client_id: ClientId,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Call the pending play
    Challenge {
        client_id: ClientId,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Get a summary for room listings
    GetSummary {
        response: oneshot::Sender<RoomSummary>,
    },
}

/// Response from room operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomResponse {
    /// Operation applied
    Success,

    /// Seat released; `remaining` players are still in the room
    Left { remaining: usize },

    /// Operation rejected, room unchanged
    Rejected(GameError),
}

impl RoomResponse {
    /// Converts a rejection into an error
    pub fn into_result(self) -> Result<RoomResponse, GameError> {
        match self {
            RoomResponse::Rejected(e) => Err(e),
            other => Ok(other),
        }
    }
}

impl From<Result<(), GameError>> for RoomResponse {
    fn from(result: Result<(), GameError>) -> Self {
        match result {
            Ok(()) => RoomResponse::Success,
            Err(e) => RoomResponse::Rejected(e),
        }
    }
}

/// Room listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub status: RoomStatus,
    pub player_count: usize,
    pub max_players: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_conversion() {
        assert_eq!(RoomResponse::from(Ok(())), RoomResponse::Success);
        assert_eq!(
            RoomResponse::from(Err(GameError::RoomFull)),
            RoomResponse::Rejected(GameError::RoomFull)
        );
        assert_eq!(
            RoomResponse::Rejected(GameError::OutOfTurn).into_result(),
            Err(GameError::OutOfTurn)
        );
    }
}
