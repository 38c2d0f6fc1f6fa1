//! Public and private projections of a room, pushed to clients after every
//! mutation.

use serde::{Deserialize, Serialize};

use super::entities::{Card, ClientId, Rank, RoomId, RoomStatus};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: ClientId,
    pub name: String,
}

/// Room-wide state every member sees. Never contains card identities.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_id: RoomId,
    pub status: RoomStatus,
    pub players: Vec<PlayerView>,
    pub max_players: usize,
    pub host_id: Option<ClientId>,
    pub turn_player_id: Option<ClientId>,
    pub last_claim_rank: Option<Rank>,
    pub pile_count: usize,
    pub awaiting_challenge: bool,
    pub last_play_by: Option<ClientId>,
    pub accepts: Vec<ClientId>,
    pub winner_id: Option<ClientId>,
}

/// One member's own cards.
pub type HandView = Vec<Card>;

/// How a challenge was adjudicated. `dispute_winner` is whichever side did
/// not pick up the pile, not necessarily the game winner.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChallengeOutcome {
    pub truthful: bool,
    pub claimant: ClientId,
    pub challenger: ClientId,
    pub loser: ClientId,
    pub dispute_winner: ClientId,
}
