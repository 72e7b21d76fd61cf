// ── Refresh snapshot ──

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::Device;
use super::event::Event;
use crate::selector::latest_event;

/// Events grouped by device id.
pub type EventsByDevice = BTreeMap<String, Vec<Event>>;

/// Result of one completed refresh cycle.
///
/// Built in full and then published as a whole: consumers never observe a
/// device list from one cycle paired with events from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub devices: Vec<Device>,
    pub events_by_device: EventsByDevice,
    pub fetched_at: DateTime<Utc>,
    /// The device phase succeeded. Always `true` for published snapshots.
    pub success: bool,
    /// `false` when the event phase failed and `events_by_device` was
    /// left empty.
    pub events_available: bool,
}

impl Snapshot {
    pub fn new(devices: Vec<Device>, events_by_device: EventsByDevice, events_available: bool) -> Self {
        Self {
            devices,
            events_by_device,
            fetched_at: Utc::now(),
            success: true,
            events_available,
        }
    }

    /// A hub with no intercoms or gates.
    pub fn empty() -> Self {
        Self::new(Vec::new(), EventsByDevice::new(), true)
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn events_for(&self, id: &str) -> &[Event] {
        self.events_by_device.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn latest_event(&self, id: &str) -> Option<&Event> {
        latest_event(self.events_for(id))
    }

    pub fn actionable_devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.is_actionable())
    }

    /// Same devices and events, ignoring `fetched_at`.
    pub fn same_data(&self, other: &Self) -> bool {
        self.devices == other.devices && self.events_by_device == other.events_by_device
    }
}
