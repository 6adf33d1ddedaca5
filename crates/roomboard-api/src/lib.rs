pub mod error;
pub mod interviewers;
pub mod rooms;
pub mod sse;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full HTTP surface of the board.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rooms", get(rooms::list_by_room))
        .route("/rooms/catalog", get(rooms::catalog))
        .route("/interviewers", post(interviewers::register))
        .route(
            "/interviewers/{id}",
            get(interviewers::get_interviewer).delete(interviewers::remove),
        )
        .route(
            "/interviewers/{id}/interviewee",
            put(interviewers::set_interviewee).delete(interviewers::clear_interviewee),
        )
        .route("/interviewers/{id}/actions", post(interviewers::action))
        .route("/sse/room-update", get(sse::room_updates))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use roomboard_db::Database;

    use super::*;
    use crate::state::AppStateInner;

    fn app_with_rooms(rooms: &[&str]) -> (Router, AppState) {
        let state = Arc::new(AppStateInner::new(
            Database::open_in_memory().unwrap(),
            Duration::from_millis(20),
            rooms.iter().map(|r| r.to_string()).collect(),
        ));
        (router(state.clone()), state)
    }

    fn app() -> (Router, AppState) {
        app_with_rooms(&[])
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Leave the store's connection mutex poisoned so every later read fails.
    fn poison_store(state: &AppState) {
        let state = state.clone();
        let _ = std::thread::spawn(move || {
            let _ = state.db.with_conn::<_, ()>(|_| panic!("store failure"));
        })
        .join();
    }

    async fn register(app: &Router, body: Value) -> String {
        let (status, json) = send(app, Method::POST, "/interviewers", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn register_assigns_uuid_and_starts_free() {
        let (app, _) = app();
        let id = register(&app, json!({ "name": " Alice ", "room": "lerp" })).await;
        assert!(uuid::Uuid::parse_str(&id).is_ok());

        let (status, json) = send(&app, Method::GET, &format!("/interviewers/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let interviewer = &json["interviewer"];
        assert_eq!(interviewer["name"], "Alice");
        assert_eq!(interviewer["room"], "lerp");
        assert_eq!(interviewer["interviewee"], Value::Null);
        assert_eq!(interviewer["updatedAt"], Value::Null);
    }

    #[tokio::test]
    async fn register_with_taken_id_returns_existing() {
        let (app, _) = app();
        let body = json!({ "id": "itv-07", "name": "Alice", "room": "lerp" });
        assert_eq!(register(&app, body).await, "itv-07");

        let again = json!({ "id": "itv-07", "name": "Alice", "room": "lkj-3" });
        let (status, json) = send(&app, Method::POST, "/interviewers", Some(again)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "id": "itv-07", "created": false }));

        let (_, json) = send(&app, Method::GET, "/interviewers/itv-07", None).await;
        assert_eq!(json["interviewer"]["room"], "lerp");
    }

    #[tokio::test]
    async fn register_rejects_malformed_input() {
        let (app, _) = app_with_rooms(&["lpy-4", "lkj-2", "lkj-3", "lerp"]);
        let cases = [
            json!({ "name": "Alice" }),
            json!({ "name": "   ", "room": "lerp" }),
            json!({ "name": "Alice", "room": "lerp", "admin": true }),
            json!({ "name": "Alice", "room": "basement" }),
            json!({ "id": "", "name": "Alice", "room": "lerp" }),
            json!({ "name": "x".repeat(129), "room": "lerp" }),
        ];

        for body in cases {
            let (status, json) = send(&app, Method::POST, "/interviewers", Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(json["error"].is_string());
        }

        let (_, json) = send(&app, Method::GET, "/rooms", None).await;
        assert_eq!(json, json!({ "interviewersByRoom": {} }));
    }

    #[tokio::test]
    async fn unknown_interviewer_is_not_found() {
        let (app, _) = app();
        let (status, json) = send(&app, Method::GET, "/interviewers/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({ "interviewer": null }));
    }

    #[tokio::test]
    async fn set_and_clear_interviewee() {
        let (app, _) = app();
        let id = register(&app, json!({ "name": "Alice", "room": "lerp" })).await;
        let before = chrono::Utc::now().timestamp_millis();

        let uri = format!("/interviewers/{id}/interviewee");
        let (status, json) = send(&app, Method::PUT, &uri, Some(json!({ "interviewee": "Bob" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], id.as_str());

        let (_, json) = send(&app, Method::GET, &format!("/interviewers/{id}"), None).await;
        let updated_at = json["interviewer"]["updatedAt"].as_i64().unwrap();
        assert_eq!(json["interviewer"]["interviewee"], "Bob");
        assert!(updated_at >= before);
        assert!(updated_at <= chrono::Utc::now().timestamp_millis());

        for _ in 0..2 {
            let (status, _) = send(&app, Method::DELETE, &uri, None).await;
            assert_eq!(status, StatusCode::OK);
            let (_, json) = send(&app, Method::GET, &format!("/interviewers/{id}"), None).await;
            assert_eq!(json["interviewer"]["interviewee"], Value::Null);
            assert_eq!(json["interviewer"]["updatedAt"], Value::Null);
        }
    }

    #[tokio::test]
    async fn blank_interviewee_is_rejected() {
        let (app, _) = app();
        let id = register(&app, json!({ "name": "Alice", "room": "lerp" })).await;

        let uri = format!("/interviewers/{id}/interviewee");
        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "interviewee": " " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn mutations_on_unknown_id_succeed_as_noops() {
        let (app, _) = app();
        let uri = "/interviewers/ghost/interviewee";
        let (status, _) = send(&app, Method::PUT, uri, Some(json!({ "interviewee": "Bob" }))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, "/interviewers/ghost", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = send(&app, Method::GET, "/rooms", None).await;
        assert_eq!(json, json!({ "interviewersByRoom": {} }));
    }

    #[tokio::test]
    async fn room_page_actions() {
        let (app, _) = app();
        let id = register(&app, json!({ "name": "Alice", "room": "lkj-2" })).await;
        let uri = format!("/interviewers/{id}/actions");
        let get_uri = format!("/interviewers/{id}");

        let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "action": "update", "interviewee": "Bob" }))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, json) = send(&app, Method::GET, &get_uri, None).await;
        assert_eq!(json["interviewer"]["interviewee"], "Bob");

        let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "action": "reset" }))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, json) = send(&app, Method::GET, &get_uri, None).await;
        assert_eq!(json["interviewer"]["interviewee"], Value::Null);

        let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "action": "dance" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let extra_keys = [
            json!({ "action": "quit", "admin": true }),
            json!({ "action": "reset", "interviewee": "Bob" }),
            json!({ "action": "update", "interviewee": "Bob", "room": "lerp" }),
        ];
        for body in extra_keys {
            let (status, json) = send(&app, Method::POST, &uri, Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(json["error"].is_string());
        }
        let (status, json) = send(&app, Method::GET, &get_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["interviewer"]["room"], "lkj-2");
        assert_eq!(json["interviewer"]["interviewee"], Value::Null);

        let (status, json) = send(&app, Method::POST, &uri, Some(json!({ "action": "quit" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], id.as_str());
        let (status, _) = send(&app, Method::GET, &get_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rooms_groups_interviewers() {
        let (app, _) = app_with_rooms(&["lerp", "lkj-2"]);
        let a = register(&app, json!({ "name": "Alice", "room": "lerp" })).await;
        let b = register(&app, json!({ "name": "Budi", "room": "lkj-2" })).await;
        let c = register(&app, json!({ "name": "Citra", "room": "lerp" })).await;

        let (status, json) = send(&app, Method::GET, "/rooms", None).await;
        assert_eq!(status, StatusCode::OK);
        let by_room = &json["interviewersByRoom"];
        let ids = |room: &str| -> Vec<String> {
            by_room[room]
                .as_array()
                .unwrap()
                .iter()
                .map(|i| i["id"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(ids("lerp"), [a, c]);
        assert_eq!(ids("lkj-2"), [b]);

        let (_, json) = send(&app, Method::GET, "/rooms/catalog", None).await;
        assert_eq!(json, json!({ "rooms": ["lerp", "lkj-2"] }));
    }

    #[tokio::test]
    async fn sse_streams_snapshots_until_shutdown() {
        let (app, state) = app();
        register(&app, json!({ "name": "Alice", "room": "lerp" })).await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/sse/room-update").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

        let mut body = response.into_body();
        let frame = tokio::time::timeout(Duration::from_secs(2), body.frame())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
        let payload: Value = serde_json::from_str(text.trim().trim_start_matches("data:").trim()).unwrap();
        assert_eq!(payload["interviewersByRoom"]["lerp"][0]["name"], "Alice");

        state.shutdown.cancel();
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            while let Some(frame) = body.frame().await {
                frame.unwrap();
            }
        })
        .await;
        assert!(drained.is_ok(), "stream should end after shutdown");
    }

    #[tokio::test]
    async fn sse_skips_ticks_while_store_fails() {
        let (app, state) = app();
        register(&app, json!({ "name": "Alice", "room": "lerp" })).await;
        poison_store(&state);

        let open = |app: Router| async move {
            let response = app
                .oneshot(Request::builder().uri("/sse/room-update").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            response.into_body()
        };
        let mut first = open(app.clone()).await;
        let mut second = open(app.clone()).await;

        // Several 20ms intervals pass: no data frame, and neither stream ends.
        let (a, b) = tokio::join!(
            tokio::time::timeout(Duration::from_millis(150), first.frame()),
            tokio::time::timeout(Duration::from_millis(150), second.frame()),
        );
        assert!(a.is_err(), "first stream should stay open without sending");
        assert!(b.is_err(), "second stream should stay open without sending");

        state.shutdown.cancel();
        for body in [&mut first, &mut second] {
            let ended = tokio::time::timeout(Duration::from_secs(2), body.frame()).await;
            assert!(matches!(ended, Ok(None)), "stream should end after shutdown");
        }
    }
}
