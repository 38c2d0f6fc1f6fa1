//! JSON wire protocol. Every frame is an object with a `type` discriminator.

use serde::{Deserialize, Deserializer, Serialize};

use crate::game::{
    entities::{CardId, ClientId, RoomId},
    views::{ChallengeOutcome, HandView, RoomView},
};

fn default_name() -> String {
    crate::game::entities::Player::DEFAULT_NAME.to_string()
}

/// `null` and a missing name both mean the default name.
fn name_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_name))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Requests a client can send.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        #[serde(default = "default_name", deserialize_with = "name_or_default")]
        name: String,
    },
    JoinRoom {
        #[serde(rename = "roomId", default, deserialize_with = "null_as_default")]
        room_id: String,
        #[serde(default = "default_name", deserialize_with = "name_or_default")]
        name: String,
    },
    LeaveRoom,
    StartGame,
    /// Missing fields are left empty so the game rules reject them with a
    /// readable reason instead of a parse error.
    Play {
        #[serde(default, deserialize_with = "null_as_default")]
        cards: Vec<CardId>,
        #[serde(rename = "claimRank", default, deserialize_with = "null_as_default")]
        claim_rank: String,
    },
    Accept,
    Challenge,
}

impl ClientMessage {
    /// Parses one inbound text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Everything the server pushes to a connection.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Hello {
        #[serde(rename = "clientId")]
        client_id: ClientId,
    },
    Joined {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        #[serde(rename = "clientId")]
        client_id: ClientId,
        #[serde(rename = "hostId")]
        host_id: Option<ClientId>,
    },
    RoomState(RoomView),
    Hand {
        hand: HandView,
    },
    ChallengeResult {
        truthful: bool,
        #[serde(rename = "claimantId")]
        claimant_id: ClientId,
        #[serde(rename = "challengerId")]
        challenger_id: ClientId,
        #[serde(rename = "loserId")]
        loser_id: ClientId,
        #[serde(rename = "winnerId")]
        winner_id: ClientId,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<ChallengeOutcome> for ServerMessage {
    fn from(outcome: ChallengeOutcome) -> Self {
        ServerMessage::ChallengeResult {
            truthful: outcome.truthful,
            claimant_id: outcome.claimant,
            challenger_id: outcome.challenger,
            loser_id: outcome.loser,
            winner_id: outcome.dispute_winner,
        }
    }
}
