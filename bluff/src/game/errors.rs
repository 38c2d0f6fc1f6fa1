//! Room rejection types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a room operation is rejected. Every rejection leaves the room
/// untouched; the `Display` text is what the client sees.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is full")]
    RoomFull,
    #[error("Already in this room")]
    AlreadyInRoom,
    #[error("Not in a room")]
    NotInRoom,
    #[error("Only the host can start the game")]
    NotHost,
    #[error("Need 2+ players")]
    NotEnoughPlayers,
    #[error("Game is not in progress")]
    GameNotInProgress,
    #[error("Not your turn")]
    OutOfTurn,
    #[error("Waiting for the last play to be accepted or challenged")]
    ChallengePending,
    #[error("Nothing to accept or challenge")]
    NoPendingPlay,
    #[error("You can't respond to your own play")]
    OwnPlay,
    #[error("Select 1-3 cards")]
    InvalidCardCount,
    #[error("Invalid claim")]
    InvalidRank,
    #[error("Claim must be at least as high as the previous one")]
    ClaimTooLow,
    #[error("Card selected more than once")]
    DuplicateCard,
    #[error("Card could not be verified")]
    CardNotInHand,
}

impl GameError {
    /// Authorization-style rejections that are dropped without a reply.
    pub fn is_silent(&self) -> bool {
        matches!(self, GameError::NotHost | GameError::NotEnoughPlayers)
    }
}
