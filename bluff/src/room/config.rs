//! Room configuration.

use serde::{Deserialize, Serialize};

use crate::game::{
    constants::{HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS},
    entities::Deck,
};

/// Per-room rules shared by every room the directory spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Seat limit (default: 5)
    pub max_players: usize,

    /// Cards dealt to each player at game start (default: 5)
    pub hand_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            hand_size: HAND_SIZE,
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_players < MIN_PLAYERS {
            return Err(format!("Max players must be at least {MIN_PLAYERS}"));
        }

        if self.hand_size == 0 {
            return Err("Hand size must be greater than 0".to_string());
        }

        if self.max_players * self.hand_size > Deck::SIZE {
            return Err(format!(
                "A full room needs {} cards but the deck holds {}",
                self.max_players * self.hand_size,
                Deck::SIZE
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RoomConfig::default().validate().is_ok());
    }

    #[test]
    fn test_deck_too_small() {
        let config = RoomConfig {
            max_players: 10,
            hand_size: 6,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_single_seat_rejected() {
        let config = RoomConfig {
            max_players: 1,
            hand_size: 5,
        };
        assert!(config.validate().is_err());
    }
}
