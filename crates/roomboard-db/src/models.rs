//! Database row types. These map directly to SQLite rows.
//! Converted into the wire model at the edge so the API never sees rusqlite.

use roomboard_types::models::Interviewer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewerRow {
    pub id: String,
    pub name: String,
    pub room: String,
    pub interviewee: Option<String>,
    /// Unix milliseconds; NULL whenever `interviewee` is NULL.
    pub updated_at: Option<i64>,
}

impl From<InterviewerRow> for Interviewer {
    fn from(row: InterviewerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            room: row.room,
            interviewee: row.interviewee,
            updated_at: row.updated_at,
        }
    }
}

/// Result of inserting a new interviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// The primary key was already taken; nothing was written.
    AlreadyExists,
}
