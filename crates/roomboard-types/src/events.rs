use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Interviewer;

/// Full board state pushed to status-board clients on every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub interviewers_by_room: BTreeMap<String, Vec<Interviewer>>,
}

impl RoomSnapshot {
    pub fn room(&self, room: &str) -> &[Interviewer] {
        self.interviewers_by_room
            .get(room)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn find(&self, id: &str) -> Option<&Interviewer> {
        self.interviewers_by_room
            .values()
            .flatten()
            .find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.interviewers_by_room.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
