use std::collections::BTreeMap;

use crate::Database;
use crate::models::{InsertOutcome, InterviewerRow};
use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::debug;

const INTERVIEWER_COLUMNS: &str = "id, name, room, interviewee, updated_at";

impl Database {
    // -- Reads --

    /// All interviewers in table scan order.
    pub fn list_interviewers(&self) -> Result<Vec<InterviewerRow>> {
        self.with_conn(query_interviewers)
    }

    /// All interviewers partitioned by room. Within a room, rows keep scan order.
    pub fn list_interviewers_by_room(&self) -> Result<BTreeMap<String, Vec<InterviewerRow>>> {
        Ok(group_by_room(self.list_interviewers()?))
    }

    pub fn get_interviewer(&self, id: &str) -> Result<Option<InterviewerRow>> {
        self.with_conn(|conn| query_interviewer_by_id(conn, id))
    }

    // -- Writes --

    /// Insert a free interviewer. A taken id is reported through the primary-key
    /// constraint rather than a separate existence check.
    pub fn insert_interviewer(&self, id: &str, name: &str, room: &str) -> Result<InsertOutcome> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO interviewers (id, name, room, interviewee, updated_at)
                 VALUES (?1, ?2, ?3, NULL, NULL)",
                (id, name, room),
            );

            match inserted {
                Ok(_) => Ok(InsertOutcome::Created),
                Err(e) if is_primary_key_violation(&e) => {
                    debug!("Interviewer {} already exists", id);
                    Ok(InsertOutcome::AlreadyExists)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Mark an interviewer busy. Returns false when no such interviewer exists.
    pub fn set_interviewee(&self, id: &str, interviewee: &str, updated_at_ms: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE interviewers SET interviewee = ?2, updated_at = ?3 WHERE id = ?1",
                rusqlite::params![id, interviewee, updated_at_ms],
            )?;
            Ok(changed > 0)
        })
    }

    /// Mark an interviewer free. Returns false when no such interviewer exists.
    pub fn clear_interviewee(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE interviewers SET interviewee = NULL, updated_at = NULL WHERE id = ?1",
                [id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Remove an interviewer entirely. Returns false when nothing was deleted.
    pub fn delete_interviewer(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM interviewers WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

pub fn group_by_room(rows: Vec<InterviewerRow>) -> BTreeMap<String, Vec<InterviewerRow>> {
    let mut by_room: BTreeMap<String, Vec<InterviewerRow>> = BTreeMap::new();
    for row in rows {
        by_room.entry(row.room.clone()).or_default().push(row);
    }
    by_room
}

fn map_interviewer(row: &Row<'_>) -> rusqlite::Result<InterviewerRow> {
    Ok(InterviewerRow {
        id: row.get(0)?,
        name: row.get(1)?,
        room: row.get(2)?,
        interviewee: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn query_interviewers(conn: &Connection) -> Result<Vec<InterviewerRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INTERVIEWER_COLUMNS} FROM interviewers ORDER BY rowid"
    ))?;

    let rows = stmt
        .query_map([], map_interviewer)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_interviewer_by_id(conn: &Connection, id: &str) -> Result<Option<InterviewerRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INTERVIEWER_COLUMNS} FROM interviewers WHERE id = ?1"
    ))?;

    let row = stmt.query_row([id], map_interviewer).optional()?;

    Ok(row)
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
