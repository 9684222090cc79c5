//! Local stand-in for the game-server host.
//!
//! Answers every typed endpoint with canned data so the panel can be worked
//! on from a plain browser (`--base-url http://127.0.0.1:3030`). Moderation
//! actions mutate the in-memory player and ban lists so polling views see
//! the change on their next cycle.

use crate::envelope::ResponseEnvelope;
use crate::events::{
    BanPlayer, GetAnticheatAlerts, GetBans, GetPlayers, GetServerStats, GetVehicles, KickPlayer,
    NuiEvent, SetTheme, UnbanPlayer,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug)]
struct HostData {
    players: Vec<Value>,
    bans: Vec<Value>,
    next_ban_id: u64,
    theme: String,
}

impl Default for HostData {
    fn default() -> Self {
        HostData {
            players: vec![
                json!({"id": 1, "name": "Alice", "identifier": "license:aa01", "ping": 32, "job": "police"}),
                json!({"id": 2, "name": "Bob", "identifier": "license:bb02", "ping": 57, "job": "mechanic"}),
                json!({"id": 5, "name": "Carol", "identifier": "license:cc05", "ping": 88}),
            ],
            bans: vec![json!({
                "id": 1,
                "name": "Mallory",
                "identifier": "license:ff13",
                "reason": "speedhack",
                "bannedBy": "console",
            })],
            next_ban_id: 2,
            theme: "dark".to_string(),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone, Default)]
pub struct MockState {
    data: Arc<Mutex<HostData>>,
}

fn ok(data: Value) -> Response {
    Json(ResponseEnvelope::ok(data)).into_response()
}

fn rejected(msg: &str) -> Response {
    Json(ResponseEnvelope::<Value>::failure(msg)).into_response()
}

fn field_u64(body: &Value, key: &str) -> Option<u64> {
    body.get(key).and_then(Value::as_u64)
}

async fn handle_event(
    State(state): State<MockState>,
    Path(event): Path<String>,
    body: Option<Json<Value>>,
) -> Response {
    let body = body.map(|Json(v)| v).unwrap_or_else(|| json!({}));
    log::info!("[nui][mock] {event} {body}");

    let Ok(mut data) = state.data.lock() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "state poisoned").into_response();
    };

    match event.as_str() {
        GetPlayers::NAME => ok(Value::Array(data.players.clone())),
        GetServerStats::NAME => ok(json!({
            "playerCount": data.players.len(),
            "maxPlayers": 64,
            "tickRate": 30.0,
            "memoryMb": 512.4,
            "uptimeSecs": 86_400,
            "alerts": [],
        })),
        GetBans::NAME => ok(Value::Array(data.bans.clone())),
        GetVehicles::NAME => {
            let vehicles = vec![
                json!({"plate": "ADM 001", "model": "police3", "owner": "license:aa01", "garage": "mrpd"}),
                json!({"plate": "BOB 777", "model": "sultan", "owner": "license:bb02"}),
            ];
            let owner = body.get("owner").and_then(Value::as_str);
            let filtered: Vec<Value> = vehicles
                .into_iter()
                .filter(|v| owner.map_or(true, |o| v["owner"] == o))
                .collect();
            ok(Value::Array(filtered))
        }
        GetAnticheatAlerts::NAME => ok(json!([
            {"id": 41, "playerId": 5, "playerName": "Carol", "type": "noclip", "severity": "high"},
        ])),
        KickPlayer::NAME => {
            let Some(id) = field_u64(&body, "playerId") else {
                return rejected("playerId is required");
            };
            let before = data.players.len();
            data.players.retain(|p| p["id"].as_u64() != Some(id));
            if data.players.len() == before {
                rejected("player not found")
            } else {
                ok(json!({"kicked": id}))
            }
        }
        BanPlayer::NAME => {
            let Some(id) = field_u64(&body, "playerId") else {
                return rejected("playerId is required");
            };
            let Some(pos) = data.players.iter().position(|p| p["id"].as_u64() == Some(id)) else {
                return rejected("player not found");
            };
            let player = data.players.remove(pos);
            let ban_id = data.next_ban_id;
            data.next_ban_id += 1;
            data.bans.push(json!({
                "id": ban_id,
                "name": player["name"],
                "identifier": player["identifier"],
                "reason": body.get("reason").cloned().unwrap_or_else(|| json!("")),
                "bannedBy": "mock-host",
            }));
            ok(json!({"banId": ban_id}))
        }
        UnbanPlayer::NAME => {
            let Some(ban_id) = field_u64(&body, "banId") else {
                return rejected("banId is required");
            };
            let before = data.bans.len();
            data.bans.retain(|b| b["id"].as_u64() != Some(ban_id));
            if data.bans.len() == before {
                rejected("ban not found")
            } else {
                ok(json!({"unbanned": ban_id}))
            }
        }
        SetTheme::NAME => match body.get("theme").and_then(Value::as_str) {
            Some(theme) => {
                data.theme = theme.to_string();
                ok(json!({"theme": theme}))
            }
            None => rejected("theme is required"),
        },
        _ => (StatusCode::NOT_FOUND, format!("no handler for {event}")).into_response(),
    }
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: MockState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/:event", post(handle_event))
        .layer(cors)
        .with_state(state)
}

/// Serve the mock host until the process is stopped.
pub async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("[nui][mock] listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(MockState::default())).await?;
    Ok(())
}
