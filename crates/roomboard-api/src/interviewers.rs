use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};
use uuid::Uuid;

use roomboard_db::models::InsertOutcome;
use roomboard_types::api::{
    ActionResponse, InterviewerResponse, RegisterRequest, RegisterResponse, RoomAction,
    SetIntervieweeRequest,
};
use roomboard_types::models::Interviewer;

use crate::error::{ApiError, required};
use crate::state::{AppState, run_blocking};

pub const MAX_ID_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 128;
pub const MAX_ROOM_LEN: usize = 64;
pub const MAX_INTERVIEWEE_LEN: usize = 128;

/// POST /interviewers checks an interviewer into a room.
///
/// Registering an id that is already checked in leaves the existing record
/// alone and hands its id back, so a double-submitted form lands on the same
/// room page.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let name = required("name", &req.name, MAX_NAME_LEN)?;
    let room = required("room", &req.room, MAX_ROOM_LEN)?;
    if !state.accepts_room(&room) {
        return Err(ApiError::Validation(format!("unknown room: {}", room)));
    }
    let id = match req.id.as_deref() {
        Some(id) => required("id", id, MAX_ID_LEN)?,
        None => Uuid::new_v4().to_string(),
    };

    let outcome = {
        let (id, name, room) = (id.clone(), name.clone(), room.clone());
        run_blocking(&state, move |db| db.insert_interviewer(&id, &name, &room)).await?
    };

    match outcome {
        InsertOutcome::Created => {
            info!("Interviewer {} ({}) registered in room {}", id, name, room);
            Ok((StatusCode::CREATED, Json(RegisterResponse { id, created: true })))
        }
        InsertOutcome::AlreadyExists => {
            debug!("Interviewer {} already checked in, reusing", id);
            Ok((StatusCode::OK, Json(RegisterResponse { id, created: false })))
        }
    }
}

/// GET /interviewers/{id}
pub async fn get_interviewer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = run_blocking(&state, move |db| db.get_interviewer(&id)).await?;

    let status = if row.is_some() { StatusCode::OK } else { StatusCode::NOT_FOUND };
    Ok((
        status,
        Json(InterviewerResponse {
            interviewer: row.map(Interviewer::from),
        }),
    ))
}

/// PUT /interviewers/{id}/interviewee
pub async fn set_interviewee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SetIntervieweeRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(req) = payload?;
    update(&state, id, &req.interviewee).await
}

/// DELETE /interviewers/{id}/interviewee
pub async fn clear_interviewee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    reset(&state, id).await
}

/// DELETE /interviewers/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    quit(&state, id).await
}

/// POST /interviewers/{id}/actions: single endpoint for the room page form.
pub async fn action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RoomAction>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(action) = payload?;
    match action {
        RoomAction::Update { interviewee } => update(&state, id, &interviewee).await,
        RoomAction::Reset {} => reset(&state, id).await,
        RoomAction::Quit {} => quit(&state, id).await,
    }
}

async fn update(
    state: &AppState,
    id: String,
    interviewee: &str,
) -> Result<Json<ActionResponse>, ApiError> {
    let interviewee = required("interviewee", interviewee, MAX_INTERVIEWEE_LEN)?;
    let now = chrono::Utc::now().timestamp_millis();

    let found = {
        let id = id.clone();
        let interviewee = interviewee.clone();
        run_blocking(state, move |db| db.set_interviewee(&id, &interviewee, now)).await?
    };

    if found {
        info!("Interviewer {} now with {}", id, interviewee);
    } else {
        debug!("Update for unknown interviewer {} ignored", id);
    }
    Ok(Json(ActionResponse { id }))
}

async fn reset(state: &AppState, id: String) -> Result<Json<ActionResponse>, ApiError> {
    let found = {
        let id = id.clone();
        run_blocking(state, move |db| db.clear_interviewee(&id)).await?
    };

    if found {
        info!("Interviewer {} is free", id);
    } else {
        debug!("Reset for unknown interviewer {} ignored", id);
    }
    Ok(Json(ActionResponse { id }))
}

async fn quit(state: &AppState, id: String) -> Result<Json<ActionResponse>, ApiError> {
    let removed = {
        let id = id.clone();
        run_blocking(state, move |db| db.delete_interviewer(&id)).await?
    };

    if removed {
        info!("Interviewer {} left their room", id);
    }
    Ok(Json(ActionResponse { id }))
}
