//! WebSocket transport for the game protocol.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server registers the connection and sends `hello` with its client ID
//! 3. A send task drains the connection's outbound queue into the socket
//! 4. The receive loop rate-limits inbound text frames and hands them to the
//!    message router
//! 5. On disconnect the client leaves its room and is unregistered
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:3000/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'hand') renderHand(msg.hand);
//! };
//!
//! ws.send(JSON.stringify({ type: 'create_room', name: 'alice' }));
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use bluff::{ServerMessage, net::session::OUTBOUND_CAPACITY};
use futures_util::{SinkExt, StreamExt};
use log::{error, warn};
use tokio::sync::mpsc;

use super::{AppState, rate_limiter::RateLimiter};
use crate::logging::{log_connection_event, log_rate_limited};

/// Reply when the per-second limit is hit
pub const BURST_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please slow down.";

/// Reply when the per-minute limit is hit
pub const SUSTAINED_LIMIT_MESSAGE: &str = "Too many messages. Please wait before sending more.";

/// Upgrade HTTP connection to WebSocket.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection until it closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_CAPACITY);
    let session = state.router.connect(outbound_tx).await;
    let client_id = session.client_id.clone();

    log_connection_event("connected", client_id.as_str(), None);

    let mut burst_limiter = RateLimiter::per_second(state.limits.burst_per_second);
    let mut sustained_limiter = RateLimiter::per_minute(state.limits.sustained_per_minute);

    // Everything the rooms and router push for this client goes out here
    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let json = match message.to_json() {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut close_reason = None;
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if !burst_limiter.check() {
                    log_rate_limited(client_id.as_str(), "burst", burst_limiter.max_requests());
                    session.send(ServerMessage::error(BURST_LIMIT_MESSAGE));
                    continue;
                }

                if !sustained_limiter.check() {
                    log_rate_limited(
                        client_id.as_str(),
                        "sustained",
                        sustained_limiter.max_requests(),
                    );
                    session.send(ServerMessage::error(SUSTAINED_LIMIT_MESSAGE));
                    continue;
                }

                state.router.handle_text(&session, text.as_str()).await;
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Ok(Message::Binary(_)) => {
                warn!("Ignoring binary frame from {}", client_id);
            }
            Err(e) => {
                close_reason = Some(e.to_string());
                break;
            }
            _ => {}
        }
    }

    // Implicit leave_room, then forget the connection
    state.router.disconnect(&client_id).await;
    send_task.abort();

    log_connection_event("disconnected", client_id.as_str(), close_reason.as_deref());
}
