use serde::{Deserialize, Serialize};

use crate::models::Interviewer;

// -- Registration --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    /// Roster id chosen by the caller. A fresh UUID is assigned when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub room: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: String,
    /// `false` when the id was already checked in and nothing was written.
    pub created: bool,
}

// -- Interviewer --

#[derive(Debug, Serialize, Deserialize)]
pub struct InterviewerResponse {
    pub interviewer: Option<Interviewer>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetIntervieweeRequest {
    pub interviewee: String,
}

/// Form-style action posted from the interviewer's room page.
///
/// `Reset` and `Quit` are empty struct variants: serde ignores extra keys on
/// unit variants of an internally tagged enum, even with `deny_unknown_fields`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase", deny_unknown_fields)]
pub enum RoomAction {
    Update { interviewee: String },
    Reset {},
    Quit {},
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub id: String,
}

// -- Rooms --

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomCatalogResponse {
    pub rooms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
