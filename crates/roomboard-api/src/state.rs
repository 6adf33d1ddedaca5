use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use roomboard_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// How often each snapshot stream re-reads the board.
    pub snapshot_interval: Duration,
    /// Rooms interviewers may register into. Empty accepts any room.
    pub rooms: Vec<String>,
    /// Cancelled on shutdown so open snapshot streams end and the server can drain.
    pub shutdown: CancellationToken,
}

impl AppStateInner {
    pub fn new(db: Database, snapshot_interval: Duration, rooms: Vec<String>) -> Self {
        Self {
            db,
            snapshot_interval,
            rooms,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn accepts_room(&self, room: &str) -> bool {
        self.rooms.is_empty() || self.rooms.iter().any(|r| r == room)
    }
}

/// Run a store call on the blocking pool.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| ApiError::Store(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
        .map_err(ApiError::Store)
}
