//! Bluff game engine.
//!
//! - Cards, ranks, deck and identifiers
//! - The per-room state machine
//! - Public and private views derived from a room

pub mod constants;
pub mod entities;
pub mod errors;
pub mod room;
pub mod views;

pub use errors::GameError;
pub use room::{AcceptOutcome, Room};
