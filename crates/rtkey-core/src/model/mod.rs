// ── Domain model ──
//
// Canonical types produced by the normalizer and consumed by the
// coordinator, the presentation layer and the CLI.

pub mod device;
pub mod event;
pub mod snapshot;

pub use device::{
    Capability, Device, DeviceType, DeviceTypeInfo, OPEN_DOOR_CAPABILITY, resolve_display_name,
};
pub use event::{Event, EventType};
pub use snapshot::{EventsByDevice, Snapshot};
