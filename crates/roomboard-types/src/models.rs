use serde::{Deserialize, Serialize};

/// An interviewer checked into a room.
///
/// `interviewee` is `None` while the interviewer is free. `updated_at` is the
/// Unix time in milliseconds at which the current interviewee was set, and is
/// `None` exactly when `interviewee` is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interviewer {
    pub id: String,
    pub name: String,
    pub room: String,
    pub interviewee: Option<String>,
    pub updated_at: Option<i64>,
}

impl Interviewer {
    pub fn is_busy(&self) -> bool {
        self.interviewee.is_some()
    }

    /// Milliseconds spent with the current interviewee as of `now_ms`.
    pub fn elapsed_ms(&self, now_ms: i64) -> Option<i64> {
        self.updated_at.map(|since| (now_ms - since).max(0))
    }
}
