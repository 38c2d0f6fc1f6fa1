/// Default seat limit per room.
pub const MAX_PLAYERS: usize = 5;

/// Cards dealt to each player when a game starts.
pub const HAND_SIZE: usize = 5;

/// A game cannot start with fewer seated players than this.
pub const MIN_PLAYERS: usize = 2;

/// Inclusive bounds on how many cards one play may put on the pile.
pub const MIN_CARDS_PER_PLAY: usize = 1;
pub const MAX_CARDS_PER_PLAY: usize = 3;
