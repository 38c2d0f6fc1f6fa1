//! HTTP and WebSocket front end for the bluff game engine.

pub mod api;
pub mod config;
pub mod logging;
