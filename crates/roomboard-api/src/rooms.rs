use axum::{Json, extract::State};

use roomboard_types::api::RoomCatalogResponse;
use roomboard_types::events::RoomSnapshot;
use roomboard_types::models::Interviewer;

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// Read the whole board grouped by room.
pub async fn load_snapshot(state: &AppState) -> Result<RoomSnapshot, ApiError> {
    let by_room = run_blocking(state, |db| db.list_interviewers_by_room()).await?;

    let interviewers_by_room = by_room
        .into_iter()
        .map(|(room, rows)| (room, rows.into_iter().map(Interviewer::from).collect()))
        .collect();

    Ok(RoomSnapshot { interviewers_by_room })
}

/// GET /rooms returns the current snapshot, for the first render before the stream ticks.
pub async fn list_by_room(State(state): State<AppState>) -> Result<Json<RoomSnapshot>, ApiError> {
    Ok(Json(load_snapshot(&state).await?))
}

/// GET /rooms/catalog
pub async fn catalog(State(state): State<AppState>) -> Json<RoomCatalogResponse> {
    Json(RoomCatalogResponse {
        rooms: state.rooms.clone(),
    })
}
