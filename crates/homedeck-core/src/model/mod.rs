// ── Domain model ──
//
// Row shapes the gateway writes to (and reads from) the data service.
// Nothing here is cached: every request builds its rows from scratch.

pub mod device;
pub mod event;
pub mod scene;
pub mod table;

pub use device::{DeviceDetailsPatch, DeviceStatePatch, NewDevice};
pub use event::AuditEvent;
pub use scene::SceneAction;
pub use table::Table;
