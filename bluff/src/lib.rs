//! # Bluff
//!
//! Server-side engine for a multiplayer bluffing card game. Players take
//! turns placing one to three cards face-down while claiming a rank; every
//! other player either accepts the claim or challenges it. First player to
//! empty their hand with an unchallenged or truthfully defended play wins.
//!
//! ## Architecture
//!
//! - [`game`]: cards, deck and the per-room state machine
//! - [`room`]: one async actor per room plus the room directory
//! - [`net`]: JSON protocol, connection registry and message router
//! - [`ids`]: short identifier generation for rooms and clients
//!
//! ## Example
//!
//! ```
//! use bluff::game::entities::{ClientId, RoomId};
//! use bluff::{Room, RoomConfig};
//!
//! let mut room = Room::new(RoomId::new("abcde"), RoomConfig::default());
//! room.join(ClientId::new("HOSTHOST"), "alice").unwrap();
//! assert_eq!(room.host(), Some(&ClientId::new("HOSTHOST")));
//! ```

pub mod game;
pub use game::{GameError, Room, entities, views};

pub mod ids;

pub mod net;
pub use net::{
    messages::{ClientMessage, ServerMessage},
    router::MessageRouter,
    session::{Session, SessionRegistry},
};

pub mod room;
pub use room::{RoomConfig, RoomManager};
