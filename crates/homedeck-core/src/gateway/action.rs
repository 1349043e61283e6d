// ── Admin actions ──
//
// The gateway's request body is a JSON object tagged by `action`. Parsing
// happens in two steps: a permissive wire shape (every field optional, so a
// missing field is reported by name rather than as a decode failure), then
// validation into `AdminAction`, whose variants only hold present,
// non-empty required fields.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::GatewayError;

/// A validated privileged write.
///
/// Closed set: adding an action means adding a variant here, and the
/// compiler then points at every `match` that has to handle it.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminAction {
    UpdateDeviceState(UpdateDeviceStateRequest),
    CreateDevice(CreateDeviceRequest),
    UpdateDevice(UpdateDeviceRequest),
    DeleteDevice { id: String },
    ActivateScene { scene_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDeviceStateRequest {
    pub id: String,
    /// Defaults to `{}` when the request omits it.
    pub new_state: Value,
    /// Audit label; `None` falls back to `device_action`.
    pub event_action: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDeviceRequest {
    pub name: String,
    pub device_type: String,
    pub location_id: String,
    pub state: Value,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDeviceRequest {
    pub id: String,
    pub name: String,
    pub device_type: String,
    pub location_id: String,
}

// ── Wire shape ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum WireAction {
    UpdateDeviceState {
        id: Option<String>,
        #[serde(rename = "newState")]
        new_state: Option<Value>,
        #[serde(rename = "eventAction")]
        event_action: Option<String>,
    },
    CreateDevice {
        name: Option<String>,
        #[serde(rename = "type")]
        device_type: Option<String>,
        location_id: Option<String>,
        state: Option<Value>,
        metadata: Option<Value>,
    },
    UpdateDevice {
        id: Option<String>,
        name: Option<String>,
        #[serde(rename = "type")]
        device_type: Option<String>,
        location_id: Option<String>,
    },
    DeleteDevice {
        id: Option<String>,
    },
    ActivateScene {
        scene_id: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// Present and non-empty.
fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

fn or_empty_object(value: Option<Value>) -> Value {
    value.unwrap_or_else(|| Value::Object(Map::new()))
}

impl AdminAction {
    /// Parse and validate a raw request body.
    ///
    /// Nothing is written before this succeeds.
    pub fn from_json(body: &[u8]) -> Result<Self, GatewayError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| GatewayError::InvalidRequest {
                reason: e.to_string(),
            })?;

        let Some(object) = value.as_object() else {
            return Err(GatewayError::InvalidRequest {
                reason: "request body is not a JSON object".into(),
            });
        };

        let tag = match object.get("action") {
            Some(Value::String(tag)) => tag.clone(),
            _ => return Err(GatewayError::UnknownAction { action: None }),
        };

        let wire = WireAction::deserialize(value).map_err(|e| GatewayError::InvalidRequest {
            reason: e.to_string(),
        })?;

        Self::validate(wire, tag)
    }

    fn validate(wire: WireAction, tag: String) -> Result<Self, GatewayError> {
        match wire {
            WireAction::UpdateDeviceState {
                id,
                new_state,
                event_action,
            } => {
                let id = required(id).ok_or(GatewayError::Missing { what: "id" })?;
                Ok(Self::UpdateDeviceState(UpdateDeviceStateRequest {
                    id,
                    new_state: or_empty_object(new_state),
                    event_action,
                }))
            }
            WireAction::CreateDevice {
                name,
                device_type,
                location_id,
                state,
                metadata,
            } => match (required(name), required(device_type), required(location_id)) {
                (Some(name), Some(device_type), Some(location_id)) => {
                    Ok(Self::CreateDevice(CreateDeviceRequest {
                        name,
                        device_type,
                        location_id,
                        state: or_empty_object(state),
                        metadata: or_empty_object(metadata),
                    }))
                }
                _ => Err(GatewayError::Missing {
                    what: "required fields",
                }),
            },
            WireAction::UpdateDevice {
                id,
                name,
                device_type,
                location_id,
            } => match (
                required(id),
                required(name),
                required(device_type),
                required(location_id),
            ) {
                (Some(id), Some(name), Some(device_type), Some(location_id)) => {
                    Ok(Self::UpdateDevice(UpdateDeviceRequest {
                        id,
                        name,
                        device_type,
                        location_id,
                    }))
                }
                _ => Err(GatewayError::Missing { what: "fields" }),
            },
            WireAction::DeleteDevice { id } => {
                let id = required(id).ok_or(GatewayError::Missing { what: "id" })?;
                Ok(Self::DeleteDevice { id })
            }
            WireAction::ActivateScene { scene_id } => {
                let scene_id =
                    required(scene_id).ok_or(GatewayError::Missing { what: "scene_id" })?;
                Ok(Self::ActivateScene { scene_id })
            }
            WireAction::Unknown => Err(GatewayError::UnknownAction { action: Some(tag) }),
        }
    }

    /// Wire tag of this action, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateDeviceState(_) => "update_device_state",
            Self::CreateDevice(_) => "create_device",
            Self::UpdateDevice(_) => "update_device",
            Self::DeleteDevice { .. } => "delete_device",
            Self::ActivateScene { .. } => "activate_scene",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn parse(body: &Value) -> Result<AdminAction, GatewayError> {
        AdminAction::from_json(body.to_string().as_bytes())
    }

    #[test]
    fn update_device_state_defaults() {
        let action = parse(&json!({ "action": "update_device_state", "id": "dev-1" })).unwrap();
        assert_eq!(
            action,
            AdminAction::UpdateDeviceState(UpdateDeviceStateRequest {
                id: "dev-1".into(),
                new_state: json!({}),
                event_action: None,
            })
        );
    }

    #[test]
    fn update_device_state_keeps_state_and_label() {
        let action = parse(&json!({
            "action": "update_device_state",
            "id": "dev-1",
            "newState": { "on": true, "brightness": 70 },
            "eventAction": "toggle"
        }))
        .unwrap();

        let AdminAction::UpdateDeviceState(req) = action else {
            panic!("expected UpdateDeviceState");
        };
        assert_eq!(req.new_state, json!({ "on": true, "brightness": 70 }));
        assert_eq!(req.event_action.as_deref(), Some("toggle"));
    }

    #[test]
    fn null_state_counts_as_absent() {
        let action = parse(&json!({
            "action": "create_device",
            "name": "Fan",
            "type": "fan",
            "location_id": "loc-1",
            "state": null
        }))
        .unwrap();

        let AdminAction::CreateDevice(req) = action else {
            panic!("expected CreateDevice");
        };
        assert_eq!(req.state, json!({}));
        assert_eq!(req.metadata, json!({}));
    }

    #[test]
    fn missing_or_empty_id_is_rejected() {
        for body in [
            json!({ "action": "update_device_state", "newState": {} }),
            json!({ "action": "update_device_state", "id": "" }),
            json!({ "action": "delete_device" }),
        ] {
            let err = parse(&body).unwrap_err();
            assert_eq!(err.to_string(), "Missing id", "body: {body}");
        }
    }

    #[test]
    fn create_device_requires_all_three_fields() {
        for missing in ["name", "type", "location_id"] {
            let mut body = json!({
                "action": "create_device",
                "name": "Lamp",
                "type": "light",
                "location_id": "loc-1"
            });
            body.as_object_mut().unwrap().remove(missing);
            let err = parse(&body).unwrap_err();
            assert_eq!(err.to_string(), "Missing required fields");
        }
    }

    #[test]
    fn update_device_requires_all_four_fields() {
        let err = parse(&json!({
            "action": "update_device",
            "id": "dev-1",
            "name": "Lamp",
            "type": "light",
            "location_id": ""
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing fields");
    }

    #[test]
    fn activate_scene_requires_scene_id() {
        let err = parse(&json!({ "action": "activate_scene" })).unwrap_err();
        assert_eq!(err.to_string(), "Missing scene_id");
    }

    #[test]
    fn unknown_and_missing_tags() {
        let err = parse(&json!({ "action": "reboot_house" })).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::UnknownAction { action: Some(ref a) } if a == "reboot_house"
        ));

        let err = parse(&json!({ "id": "dev-1" })).unwrap_err();
        assert_eq!(err.to_string(), "Unknown action");
    }

    #[test]
    fn malformed_bodies_are_invalid_requests() {
        for body in [&b"{not json"[..], b"[1,2,3]", b"null", b""] {
            let err = AdminAction::from_json(body).unwrap_err();
            assert_eq!(err.to_string(), "Invalid request");
        }

        // Right tag, wrong field type.
        let err = parse(&json!({ "action": "delete_device", "id": 42 })).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest { .. }));
    }

    #[test]
    fn action_names_round_trip_to_wire_tags() {
        let action = parse(&json!({ "action": "delete_device", "id": "d" })).unwrap();
        assert_eq!(action.name(), "delete_device");
    }
}
