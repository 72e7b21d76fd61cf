// ── Host-facing presentation ──
//
// Maps a snapshot onto the objects a host shows: one "open" button per
// actionable device and one "last opened" sensor per device, with a
// formatted status line and structured attributes.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::coordinator::Coordinator;
use crate::error::ActionError;
use crate::model::{Device, DeviceType, Event, EventType, Snapshot};
use crate::selector::to_local;

pub const DOMAIN: &str = "rtkey";
pub const MANUFACTURER: &str = "RTKkey";
pub const NEVER_OPENED: &str = "Never opened";
pub const LAST_OPEN_ICON: &str = "mdi:key";

const STATUS_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";
const LAST_UPDATED_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Registry entry for the physical device behind a button/sensor pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: (String, String),
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub sw_version: Option<String>,
    pub serial_number: Option<String>,
}

impl From<&Device> for DeviceInfo {
    fn from(device: &Device) -> Self {
        Self {
            identifiers: (DOMAIN.to_owned(), device.id.clone()),
            name: device.display_name.clone(),
            manufacturer: MANUFACTURER,
            model: device.model_label(),
            sw_version: device.firmware_version.clone(),
            serial_number: device.serial_number.clone(),
        }
    }
}

// ── Open button ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenButton {
    pub unique_id: String,
    pub name: String,
    pub icon: &'static str,
    pub device_id: String,
    pub device_info: DeviceInfo,
}

impl OpenButton {
    /// `None` unless the device has an enabled `open_door` capability.
    pub fn for_device(device: &Device) -> Option<Self> {
        if !device.is_actionable() {
            return None;
        }
        let info = device.device_type.info();
        Some(Self {
            unique_id: format!("{}_open", device.id),
            name: format!("{} - {}", device.display_name, info.action_label),
            icon: info.icon,
            device_id: device.id.clone(),
            device_info: DeviceInfo::from(device),
        })
    }

    pub fn available(&self, coordinator: &Coordinator) -> bool {
        coordinator.last_update_success()
    }

    pub async fn press(&self, coordinator: &Coordinator) -> Result<(), ActionError> {
        coordinator.trigger_open(&self.device_id).await
    }
}

// ── Last-open sensor ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastOpenSensor {
    pub unique_id: String,
    pub name: String,
    pub icon: &'static str,
    pub device_id: String,
    pub device_type: DeviceType,
    pub device_info: DeviceInfo,
}

/// Extra state published alongside the status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorAttributes {
    pub last_updated: String,
    pub device_type: DeviceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raised_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rfid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
}

impl LastOpenSensor {
    pub fn for_device(device: &Device) -> Self {
        Self {
            unique_id: format!("{}_last_open", device.id),
            name: format!("{} - {}", device.display_name, device.device_type.info().status_label),
            icon: LAST_OPEN_ICON,
            device_id: device.id.clone(),
            device_type: device.device_type,
            device_info: DeviceInfo::from(device),
        }
    }

    pub fn available(&self, coordinator: &Coordinator) -> bool {
        coordinator.last_update_success()
    }

    pub fn latest_event<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a Event> {
        snapshot.latest_event(&self.device_id)
    }

    /// `"<dd.mm.YYYY> <HH:MM> <description>"` in `tz`, or [`NEVER_OPENED`].
    pub fn state<Tz>(&self, snapshot: &Snapshot, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        status_line(self.latest_event(snapshot), tz)
    }

    pub fn attributes<Tz>(&self, snapshot: &Snapshot, tz: &Tz) -> SensorAttributes
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut attrs = SensorAttributes {
            last_updated: to_local(snapshot.fetched_at, tz)
                .format(LAST_UPDATED_FORMAT)
                .to_string(),
            device_type: self.device_type,
            event_type: None,
            event_type_name: None,
            raised_at: None,
            device_id: None,
            user_id: None,
            user_agent: None,
            rfid: None,
            room_number: None,
        };

        if let Some(event) = self.latest_event(snapshot) {
            attrs.event_type = Some(event.event_type.code().to_owned());
            attrs.event_type_name = Some(event.event_type.label().to_owned());
            attrs.raised_at.clone_from(&event.raised_at);
            attrs.device_id = Some(event.device_id.clone());
            attrs.user_id.clone_from(&event.user_id);
            attrs.user_agent = event.user_agent.as_deref().map(|ua| user_agent_label(ua).to_owned());
            if event.event_type == EventType::RfidOpenLocal {
                attrs.rfid.clone_from(&event.rfid);
            }
            attrs.room_number.clone_from(&event.room_number);
        }
        attrs
    }
}

/// Buttons for every actionable device, in snapshot order.
pub fn buttons(snapshot: &Snapshot) -> Vec<OpenButton> {
    snapshot.devices.iter().filter_map(OpenButton::for_device).collect()
}

/// One sensor per device, in snapshot order.
pub fn sensors(snapshot: &Snapshot) -> Vec<LastOpenSensor> {
    snapshot.devices.iter().map(LastOpenSensor::for_device).collect()
}

// ── Text mapping ─────────────────────────────────────────────────────

pub fn status_line<Tz>(event: Option<&Event>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some((event, at)) = event.and_then(|e| e.raised_at_utc().map(|at| (e, at))) else {
        return NEVER_OPENED.to_owned();
    };
    let local: DateTime<Tz> = to_local(at, tz);
    format!("{} {}", local.format(STATUS_TIME_FORMAT), describe_event(event))
}

/// Opens made through this workspace carry `rtkey/<version>`.
fn is_own_client(user_agent: &str) -> bool {
    rtkey_api::USER_AGENT
        .split_once('/')
        .is_some_and(|(product, _)| {
            user_agent
                .strip_prefix(product)
                .is_some_and(|rest| rest.starts_with('/'))
        })
}

fn is_mobile(user_agent: &str) -> bool {
    let lower = user_agent.to_lowercase();
    lower.contains("android") || lower.contains("ios")
}

/// Short description used in the status line.
pub fn describe_event(event: &Event) -> &'static str {
    match &event.event_type {
        EventType::ApiOpenRemote => {
            let ua = event.user_agent.as_deref().unwrap_or_default();
            if is_own_client(ua) {
                "opened by button"
            } else if is_mobile(ua) {
                "opened by app"
            } else {
                "opened remotely"
            }
        }
        EventType::RfidOpenLocal => "opened by key",
        EventType::FaceOpenRemote => "opened by face",
        EventType::PinCodeOpenRemote => "opened by PIN code",
        EventType::CodeOpenLocal => "opened by code",
        EventType::DtmfOpenLocal => "opened by DTMF",
        EventType::Other(_) => "opened",
    }
}

/// Friendly label for the client that raised an event.
pub fn user_agent_label(user_agent: &str) -> &str {
    if user_agent.trim().is_empty() {
        return "Unknown";
    }
    if is_own_client(user_agent) {
        return "Home automation button";
    }

    let lower = user_agent.to_lowercase();
    let key_app = user_agent.contains("Key");
    if lower.contains("android") {
        return if key_app { "Key mobile app" } else { "Mobile app" };
    }
    if lower.contains("ios") || lower.contains("iphone") {
        return if key_app {
            "Key mobile app (iOS)"
        } else {
            "Mobile app (iOS)"
        };
    }
    user_agent
}
