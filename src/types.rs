use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Connected player as listed on the players page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// Server-side player id (session scoped)
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub ping: Option<u32>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub banned_by: Option<String>,
    /// Unix seconds; `None` for permanent bans
    #[serde(default)]
    pub expires: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BanRecord {
    pub fn is_permanent(&self) -> bool {
        self.expires.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub plate: String,
    pub model: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub garage: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnticheatAlert {
    pub id: u64,
    pub player_id: u32,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub severity: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Server metrics refreshed on the dashboard timer. Last write wins;
/// metrics the host adds later end up in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSnapshot {
    #[serde(default)]
    pub player_count: u32,
    #[serde(default)]
    pub max_players: u32,
    #[serde(default)]
    pub tick_rate: Option<f64>,
    #[serde(default)]
    pub memory_mb: Option<f64>,
    #[serde(default)]
    pub uptime_secs: Option<u64>,
    #[serde(default)]
    pub alerts: Vec<AnticheatAlert>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
