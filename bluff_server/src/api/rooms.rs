//! Room listing endpoint.

use axum::{extract::State, response::Json};
use bluff::room::RoomSummary;

use super::{AppState, request_id::RequestId};

/// List all live rooms.
///
/// # Response
///
/// ```json
/// [
///   {"roomId": "K7QZP", "status": "waiting", "playerCount": 2, "maxPlayers": 5}
/// ]
/// ```
pub async fn list_rooms(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Json<Vec<RoomSummary>> {
    let rooms = state.router.rooms().list_rooms().await;

    tracing::debug!(
        request_id = %request_id.as_str(),
        count = rooms.len(),
        "Listed rooms"
    );

    Json(rooms)
}
