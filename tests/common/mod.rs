//! In-process stand-in for the host, bound to an ephemeral local port.

#![allow(dead_code)]

use axum::{extract::Path, extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
pub struct HostState {
    pub hits: Arc<AtomicUsize>,
    /// Scripted `getPlayers` responses; the last one repeats
    pub players: Arc<Mutex<VecDeque<Value>>>,
    /// Delay applied to every `slow*` event
    pub slow_ms: Arc<AtomicUsize>,
}

impl HostState {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn script_players(&self, responses: Vec<Value>) {
        *self.players.lock().unwrap() = responses.into();
    }
}

pub fn player(id: u32, name: &str) -> Value {
    json!({"id": id, "name": name})
}

async fn handle(
    State(state): State<HostState>,
    Path(event): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if event.starts_with("slow") {
        let ms = state.slow_ms.load(Ordering::SeqCst) as u64;
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    let ok = |v: Value| (StatusCode::OK, v.to_string());
    match event.as_str() {
        "echo" | "setTheme" => ok(json!({"success": true, "data": body})),
        "getPlayers" | "slowPlayers" => {
            let players = {
                let mut queue = state.players.lock().unwrap();
                if queue.len() > 1 {
                    queue.pop_front().unwrap_or_default()
                } else {
                    queue.front().cloned().unwrap_or_else(|| json!([]))
                }
            };
            ok(json!({"success": true, "players": players}))
        }
        "getServerStats" => ok(json!({
            "success": true,
            "data": {"playerCount": 2, "maxPlayers": 48, "tickRate": 30.0},
            "error": null,
            "message": "ok",
        })),
        "rejected" | "getBans" => ok(json!({"success": false, "error": "no permission"})),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "lua error".to_string()),
        "garbage" => (StatusCode::OK, "<html>not json</html>".to_string()),
        "slow" | "slowStats" => ok(json!({"success": true, "data": {"late": true}})),
        _ => (StatusCode::NOT_FOUND, format!("no handler for {event}")),
    }
}

/// Start a host; returns its base URL and shared state.
pub async fn spawn_host() -> (String, HostState) {
    let state = HostState::default();
    state.slow_ms.store(10_000, Ordering::SeqCst);
    let app = Router::new()
        .route("/:event", post(handle))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

/// Base URL nothing listens on.
pub fn dead_host() -> String {
    "http://127.0.0.1:1".to_string()
}
