use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Insert payload for a new `devices` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDevice {
    pub name: String,
    /// One of the store's `device_type` enum values; the store enforces it.
    #[serde(rename = "type")]
    pub device_type: String,
    pub location_id: String,
    pub state: Value,
    pub metadata: Value,
    pub last_seen: DateTime<Utc>,
}

/// Patch written when a device's state changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatePatch {
    pub state: Value,
    pub last_seen: DateTime<Utc>,
}

/// Patch written by a full device edit. Overwrites all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDetailsPatch {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub location_id: String,
}
