//! Business logic behind the homedeck control panel's privileged endpoints.
//!
//! - **[`AdminGateway`]**: Validates a tagged [`AdminAction`] and performs the
//!   matching write against a [`DataService`] with elevated credentials. State
//!   updates append a best-effort [`AuditEvent`]; a failed audit write never
//!   fails the action.
//!
//! - **[`Relay`]**: Delivers an arbitrary JSON payload to a caller-chosen URL,
//!   either synchronously (the caller sees the downstream status and body) or
//!   in the background (the caller gets an immediate acknowledgement and the
//!   outcome only reaches the logs). Deliveries are bounded by a timeout and a
//!   concurrency cap, and tracked so a host can drain them before exiting.
//!
//! - **[`DataService`]**: The record-store seam. [`homedeck_api::DataClient`]
//!   implements it against a PostgREST-style service; tests substitute their own.
//!
//! Core never reads configuration files: hosts build [`DataServiceConfig`] and
//! [`RelayConfig`] and hand them in.

pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod relay;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DataServiceConfig, RelayConfig, TlsVerification};
pub use error::CoreError;
pub use gateway::action::{
    AdminAction, CreateDeviceRequest, UpdateDeviceRequest, UpdateDeviceStateRequest,
};
pub use gateway::{AdminGateway, GatewayError};
pub use model::{AuditEvent, SceneAction, Table};
pub use relay::{Delivery, Relay, RelayError, RelayOutcome, RelayRequest};
pub use store::DataService;
