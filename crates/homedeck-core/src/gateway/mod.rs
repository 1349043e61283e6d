// ── Admin gateway ──
//
// Single validated entry point for writes that need the service key.
// Each request is handled on its own; nothing is shared between calls
// beyond the store handle.

pub mod action;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::error::CoreError;
use crate::model::{
    AuditEvent, DeviceDetailsPatch, DeviceStatePatch, NewDevice, SceneAction, Table,
};
use crate::store::DataService;

use self::action::{
    AdminAction, CreateDeviceRequest, UpdateDeviceRequest, UpdateDeviceStateRequest,
};

/// Why a gateway request was refused. The `Display` text is what the
/// caller receives in `{"error": ...}`.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Body is not JSON, not an object, or a field has the wrong JSON type.
    #[error("Invalid request")]
    InvalidRequest { reason: String },

    /// `action` is missing or names no known action.
    #[error("Unknown action")]
    UnknownAction { action: Option<String> },

    /// A required field is absent or empty.
    #[error("Missing {what}")]
    Missing { what: &'static str },

    /// The data service URL or key could not be resolved at startup.
    #[error("Missing data service configuration")]
    NotConfigured,

    /// The store refused the primary write.
    #[error(transparent)]
    Store(#[from] CoreError),
}

impl GatewayError {
    /// `true` for failures of the deployment rather than of the request.
    pub fn is_server_side(&self) -> bool {
        match self {
            Self::NotConfigured => true,
            Self::Store(e) => e.is_server_side(),
            _ => false,
        }
    }
}

/// Executes validated [`AdminAction`]s against a [`DataService`].
#[derive(Clone)]
pub struct AdminGateway {
    store: Arc<dyn DataService>,
}

impl AdminGateway {
    pub fn new(store: Arc<dyn DataService>) -> Self {
        Self { store }
    }

    /// Perform `action`.
    ///
    /// `Ok(())` means the primary write succeeded. Audit events written as
    /// a side effect are best-effort and never turn success into failure.
    pub async fn execute(&self, action: AdminAction) -> Result<(), GatewayError> {
        let name = action.name();
        debug!(action = name, "executing admin action");

        let result = match action {
            AdminAction::UpdateDeviceState(req) => self.update_device_state(req).await,
            AdminAction::CreateDevice(req) => self.create_device(req).await,
            AdminAction::UpdateDevice(req) => self.update_device(req).await,
            AdminAction::DeleteDevice { id } => self.delete_device(&id).await,
            AdminAction::ActivateScene { scene_id } => self.activate_scene(&scene_id).await,
        };

        if let Err(ref e) = result {
            error!(action = name, error = %e, "admin action failed");
        }
        result
    }

    // ── Actions ──────────────────────────────────────────────────────

    async fn update_device_state(&self, req: UpdateDeviceStateRequest) -> Result<(), GatewayError> {
        self.write_state(&req.id, req.new_state.clone()).await?;

        let event_type = req
            .event_action
            .unwrap_or_else(|| AuditEvent::DEFAULT_EVENT_TYPE.to_owned());
        self.record(AuditEvent::new(req.id, event_type, req.new_state))
            .await;
        Ok(())
    }

    async fn create_device(&self, req: CreateDeviceRequest) -> Result<(), GatewayError> {
        let row = NewDevice {
            name: req.name,
            device_type: req.device_type,
            location_id: req.location_id,
            state: req.state,
            metadata: req.metadata,
            last_seen: Utc::now(),
        };
        self.store.insert(Table::Devices, to_row(&row)?).await?;
        info!(name = %row.name, device_type = %row.device_type, "device created");
        Ok(())
    }

    async fn update_device(&self, req: UpdateDeviceRequest) -> Result<(), GatewayError> {
        let patch = DeviceDetailsPatch {
            name: req.name,
            device_type: req.device_type,
            location_id: req.location_id,
        };
        self.store
            .update(Table::Devices, &req.id, to_row(&patch)?)
            .await?;
        Ok(())
    }

    async fn delete_device(&self, id: &str) -> Result<(), GatewayError> {
        self.store.delete(Table::Devices, id).await?;
        info!(device_id = id, "device deleted");
        Ok(())
    }

    /// Apply every step of a scene in order, auditing each one.
    ///
    /// Stops at the first failed device write; steps already applied stay
    /// applied.
    async fn activate_scene(&self, scene_id: &str) -> Result<(), GatewayError> {
        let rows = self
            .store
            .select(Table::SceneActions, "scene_id", scene_id)
            .await?;

        let steps = rows
            .into_iter()
            .map(serde_json::from_value::<SceneAction>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("malformed scene action row: {e}")))?;

        let count = steps.len();
        for step in steps {
            let state = if step.desired_state.is_null() {
                empty_object()
            } else {
                step.desired_state
            };
            self.write_state(&step.device_id, state.clone()).await?;
            self.record(AuditEvent::new(
                step.device_id,
                AuditEvent::SCENE_APPLIED,
                state,
            ))
            .await;
        }

        info!(scene_id, steps = count, "scene activated");
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────────

    async fn write_state(&self, device_id: &str, state: Value) -> Result<(), CoreError> {
        let patch = DeviceStatePatch {
            state,
            last_seen: Utc::now(),
        };
        self.store
            .update(Table::Devices, device_id, to_row(&patch)?)
            .await
    }

    /// Append an audit event. Failures are logged and swallowed.
    async fn record(&self, event: AuditEvent) {
        let row = match to_row(&event) {
            Ok(row) => row,
            Err(e) => {
                warn!(device_id = %event.device_id, error = %e, "audit event not encoded");
                return;
            }
        };

        if let Err(e) = self.store.insert(Table::SensorEvents, row).await {
            warn!(
                device_id = %event.device_id,
                event_type = %event.event_type,
                error = %e,
                "audit event not recorded"
            );
        }
    }
}

fn to_row<T: Serialize>(row: &T) -> Result<Value, CoreError> {
    serde_json::to_value(row).map_err(|e| CoreError::Internal(format!("failed to encode row: {e}")))
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
