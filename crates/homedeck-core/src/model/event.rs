use serde::Serialize;
use serde_json::Value;

/// A best-effort record of a device-affecting action.
///
/// Written once per state change and never updated. The store assigns `id`
/// and `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub device_id: String,
    pub event_type: String,
    pub value: Value,
}

impl AuditEvent {
    /// Label used when a state update does not name its action.
    pub const DEFAULT_EVENT_TYPE: &'static str = "device_action";
    /// Label used for state changes applied by a scene.
    pub const SCENE_APPLIED: &'static str = "scene_applied";

    pub fn new(device_id: impl Into<String>, event_type: impl Into<String>, value: Value) -> Self {
        Self {
            device_id: device_id.into(),
            event_type: event_type.into(),
            value,
        }
    }
}
