use serde::Deserialize;
use serde_json::Value;

/// One step of a scene: put `device_id` into `desired_state`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneAction {
    pub id: String,
    pub scene_id: String,
    pub device_id: String,
    #[serde(default)]
    pub desired_state: Value,
}
