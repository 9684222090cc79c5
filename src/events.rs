//! Typed host endpoints.
//!
//! Each endpoint binds an event name to the payload it sends and the data it
//! expects back inside the `{ success, data }` envelope. Responses are checked
//! against these types when they arrive, so a host handler that changes shape
//! surfaces as `MalformedResponse` instead of silently breaking a page.

use crate::preferences::ThemePreference;
use crate::types::{AnticheatAlert, BanRecord, LiveSnapshot, PlayerSummary, VehicleRecord};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub trait NuiEvent: Send + Sync + 'static {
    /// Event name; the last path segment of the request URL
    const NAME: &'static str;
    /// Envelope key carrying the result when the handler does not use `data`
    const DATA_KEY: &'static str = "data";

    type Payload: Serialize + Send + Sync;
    type Response: DeserializeOwned + Send;
}

/// Payload for read-only listings; serializes as `{}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NoPayload {}

/// Acknowledgement returned by action endpoints; the shape varies per handler.
pub type Ack = Value;

pub struct GetPlayers;

impl NuiEvent for GetPlayers {
    const NAME: &'static str = "getPlayers";
    const DATA_KEY: &'static str = "players";
    type Payload = NoPayload;
    type Response = Vec<PlayerSummary>;
}

pub struct GetServerStats;

impl NuiEvent for GetServerStats {
    const NAME: &'static str = "getServerStats";
    type Payload = NoPayload;
    type Response = LiveSnapshot;
}

pub struct GetBans;

impl NuiEvent for GetBans {
    const NAME: &'static str = "getBans";
    const DATA_KEY: &'static str = "bans";
    type Payload = NoPayload;
    type Response = Vec<BanRecord>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
}

pub struct GetVehicles;

impl NuiEvent for GetVehicles {
    const NAME: &'static str = "getVehicles";
    const DATA_KEY: &'static str = "vehicles";
    type Payload = VehicleQuery;
    type Response = Vec<VehicleRecord>;
}

pub struct GetAnticheatAlerts;

impl NuiEvent for GetAnticheatAlerts {
    const NAME: &'static str = "getAnticheatAlerts";
    const DATA_KEY: &'static str = "alerts";
    type Payload = NoPayload;
    type Response = Vec<AnticheatAlert>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KickPayload {
    pub player_id: u32,
    pub reason: String,
}

pub struct KickPlayer;

impl NuiEvent for KickPlayer {
    const NAME: &'static str = "kickPlayer";
    type Payload = KickPayload;
    type Response = Ack;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanPayload {
    pub player_id: u32,
    pub reason: String,
    /// `None` bans permanently
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<u32>,
}

pub struct BanPlayer;

impl NuiEvent for BanPlayer {
    const NAME: &'static str = "banPlayer";
    type Payload = BanPayload;
    type Response = Ack;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbanPayload {
    pub ban_id: u64,
}

pub struct UnbanPlayer;

impl NuiEvent for UnbanPlayer {
    const NAME: &'static str = "unbanPlayer";
    type Payload = UnbanPayload;
    type Response = Ack;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ThemePayload {
    pub theme: ThemePreference,
}

pub struct SetTheme;

impl NuiEvent for SetTheme {
    const NAME: &'static str = "setTheme";
    type Payload = ThemePayload;
    type Response = Ack;
}
