use strum::{AsRefStr, Display};

/// Record collections the gateway touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Table {
    Devices,
    /// Audit trail shown in the dashboard's Events view.
    SensorEvents,
    SceneActions,
}
