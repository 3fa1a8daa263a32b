use chrono::{DateTime, Utc};
use serde::Serialize;

/// Process-level facts shared with the status endpoint.
#[derive(Clone)]
pub struct ServerInfo {
    pub started_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub store: String,
    pub connected: bool,
    pub version: String,
    pub uptime_seconds: i64,
    pub timestamp: String,
}
