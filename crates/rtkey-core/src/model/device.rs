// ── Device domain types ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Capability name that makes a device eligible for the open action.
pub const OPEN_DOOR_CAPABILITY: &str = "open_door";

/// The two device categories this workspace manages.
///
/// Anything else the backend reports is dropped during normalization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceType {
    Intercom,
    Gate,
}

/// Presentation attributes attached to a [`DeviceType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTypeInfo {
    /// Icon for the open action.
    pub icon: &'static str,
    /// Suffix of the open action name.
    pub action_label: &'static str,
    /// Suffix of the last-open status name.
    pub status_label: &'static str,
    /// Human-readable model name, also used in fallback display names.
    pub model_label: &'static str,
}

const INTERCOM_INFO: DeviceTypeInfo = DeviceTypeInfo {
    icon: "mdi:door-open",
    action_label: "Open door",
    status_label: "Door opening",
    model_label: "Intercom",
};

const GATE_INFO: DeviceTypeInfo = DeviceTypeInfo {
    icon: "mdi:gate",
    action_label: "Open gate",
    status_label: "Gate opening",
    model_label: "Gate",
};

impl DeviceType {
    pub fn info(self) -> &'static DeviceTypeInfo {
        match self {
            Self::Intercom => &INTERCOM_INFO,
            Self::Gate => &GATE_INFO,
        }
    }
}

/// A named feature flag on a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub enabled: bool,
}

/// The canonical device, normalized from the household API.
///
/// Invariant: `id` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub device_type: DeviceType,
    pub display_name: String,
    pub capabilities: Vec<Capability>,
    pub firmware_version: Option<String>,
    pub serial_number: Option<String>,
}

impl Device {
    /// Whether the device supports a configured open action.
    pub fn is_actionable(&self) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.name == OPEN_DOOR_CAPABILITY && c.enabled)
    }

    pub fn model_label(&self) -> &'static str {
        self.device_type.info().model_label
    }
}

/// Resolve a display name: description, then the user-assigned name, then
/// the company-assigned name, then `"<Model> <id>"`.
///
/// Blank candidates are skipped like missing ones.
pub fn resolve_display_name(
    description: Option<&str>,
    name_by_user: Option<&str>,
    name_by_company: Option<&str>,
    device_type: DeviceType,
    id: &str,
) -> String {
    [description, name_by_user, name_by_company]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map_or_else(
            || format!("{} {id}", device_type.info().model_label),
            ToOwned::to_owned,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(capabilities: Vec<Capability>) -> Device {
        Device {
            id: "1".into(),
            device_type: DeviceType::Intercom,
            display_name: "Front".into(),
            capabilities,
            firmware_version: None,
            serial_number: None,
        }
    }

    #[test]
    fn device_type_round_trips_through_strum() {
        assert_eq!("intercom".parse::<DeviceType>().ok(), Some(DeviceType::Intercom));
        assert_eq!("gate".parse::<DeviceType>().ok(), Some(DeviceType::Gate));
        assert!("camera".parse::<DeviceType>().is_err());
        assert_eq!(DeviceType::Gate.as_ref(), "gate");
    }

    #[test]
    fn lookup_table_per_type() {
        assert_eq!(DeviceType::Gate.info().icon, "mdi:gate");
        assert_eq!(DeviceType::Intercom.info().icon, "mdi:door-open");
        assert_eq!(DeviceType::Gate.info().model_label, "Gate");
    }

    #[test]
    fn company_name_used_when_others_missing() {
        let name = resolve_display_name(None, None, Some("Entrance"), DeviceType::Intercom, "7");
        assert_eq!(name, "Entrance");
    }

    #[test]
    fn description_wins_over_names() {
        let name = resolve_display_name(
            Some("Lobby"),
            Some("Mine"),
            Some("Entrance"),
            DeviceType::Intercom,
            "7",
        );
        assert_eq!(name, "Lobby");
    }

    #[test]
    fn blank_names_fall_through() {
        let name = resolve_display_name(Some(""), Some("  "), None, DeviceType::Gate, "42");
        assert_eq!(name, "Gate 42");
    }

    #[test]
    fn actionable_requires_enabled_open_door() {
        assert!(device(vec![Capability { name: "open_door".into(), enabled: true }]).is_actionable());
        assert!(!device(vec![Capability { name: "open_door".into(), enabled: false }]).is_actionable());
        assert!(!device(vec![Capability { name: "video".into(), enabled: true }]).is_actionable());
        assert!(!device(vec![]).is_actionable());
    }
}
