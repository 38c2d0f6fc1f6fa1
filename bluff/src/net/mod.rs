//! Networking layer: wire protocol, connection registry and message router.
//!
//! The transport itself (WebSocket upgrade, framing, rate limiting) lives in
//! the server crate; everything here works on parsed text frames and mpsc
//! channels so it can be driven directly from tests.

/// JSON message types for the client-server protocol.
pub mod messages;

/// Message dispatch from connections to rooms.
pub mod router;

/// Connection registry and per-connection outbound channels.
pub mod session;
