//! Live board updates over Server-Sent Events.
//!
//! Every connection owns its own ticker: on each tick the board is re-read
//! and the full snapshot is sent, whether or not anything changed. The ticker
//! is dropped with the stream when the client disconnects.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, StreamExt, pin_mut};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use roomboard_types::events::RoomSnapshot;

use crate::error::ApiError;
use crate::rooms::load_snapshot;
use crate::state::AppState;

/// Snapshots of the board, one per `snapshot_interval`, starting one interval
/// after the first poll. Ends when the server shuts down. A failed read yields an
/// error for that tick only.
pub fn snapshot_stream(state: AppState) -> impl Stream<Item = Result<RoomSnapshot, ApiError>> {
    async_stream::stream! {
        let period = state.snapshot_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = state.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            yield load_snapshot(&state).await;
        }
    }
}

/// Logs the close of a snapshot stream however it ends.
struct StreamGuard(Uuid);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        info!("Snapshot stream {} closed", self.0);
    }
}

/// GET /sse/room-update
pub async fn room_updates(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream_id = Uuid::new_v4();
    info!(
        "Snapshot stream {} opened (every {:?})",
        stream_id, state.snapshot_interval
    );

    let snapshots = snapshot_stream(state);
    let guard = StreamGuard(stream_id);

    let events = async_stream::stream! {
        let _guard = guard;
        pin_mut!(snapshots);

        while let Some(tick) = snapshots.next().await {
            match tick.and_then(|snapshot| {
                Event::default()
                    .json_data(&snapshot)
                    .map_err(|e| ApiError::Store(e.into()))
            }) {
                Ok(event) => {
                    debug!("Snapshot stream {} sent tick", stream_id);
                    yield Ok::<_, Infallible>(event);
                }
                Err(e) => warn!("Snapshot stream {} skipped a tick: {}", stream_id, e),
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}
