//! Room module: one async actor per room plus the directory that spawns them.
//!
//! ## Architecture
//!
//! Each room runs in its own Tokio task with an mpsc inbox, so operations on
//! one room are applied strictly in arrival order while different rooms
//! progress independently. The RoomManager hands out room codes, keeps the
//! code-to-handle map, and drops entries once a room empties.

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use manager::RoomManager;
pub use messages::{RoomMessage, RoomResponse, RoomSummary};
