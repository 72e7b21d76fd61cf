// ── Response normalization ──
//
// Turns the raw, loosely-shaped JSON returned by the household and events
// APIs into canonical `Device` and `Event` values. Locating the list inside
// a response is an ordered sequence of pure probes; the first probe that
// matches wins, even when the list it finds is empty, unless the probe is
// marked `skip_empty`.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::model::{
    Capability, Device, DeviceType, Event, EventType, EventsByDevice, resolve_display_name,
};

type Object = Map<String, Value>;

/// A named attempt at locating a list inside a response object.
struct Probe {
    path: &'static str,
    extract: fn(&Object) -> Option<&Vec<Value>>,
    /// An empty list here falls through to the next probe.
    skip_empty: bool,
}

fn nested_list<'a>(root: &'a Object, outer: &str, inner: &str) -> Option<&'a Vec<Value>> {
    root.get(outer)?.as_object()?.get(inner)?.as_array()
}

fn top_list<'a>(root: &'a Object, key: &str) -> Option<&'a Vec<Value>> {
    root.get(key)?.as_array()
}

const DEVICE_PROBES: &[Probe] = &[
    Probe {
        path: "data.devices",
        extract: |root| nested_list(root, "data", "devices"),
        skip_empty: false,
    },
    Probe {
        path: "devices",
        extract: |root| top_list(root, "devices"),
        skip_empty: false,
    },
    Probe {
        path: "data",
        extract: |root| top_list(root, "data"),
        skip_empty: false,
    },
];

const EVENT_PROBES: &[Probe] = &[
    Probe {
        path: "data.items",
        extract: |root| nested_list(root, "data", "items"),
        skip_empty: true,
    },
    Probe {
        path: "items",
        extract: |root| top_list(root, "items"),
        skip_empty: false,
    },
    Probe {
        path: "events",
        extract: |root| top_list(root, "events"),
        skip_empty: false,
    },
    Probe {
        path: "data",
        extract: |root| top_list(root, "data"),
        skip_empty: false,
    },
];

fn first_match<'a>(root: &'a Object, probes: &[Probe]) -> Option<(&'static str, &'a Vec<Value>)> {
    probes
        .iter()
        .find_map(|probe| {
            (probe.extract)(root)
                .filter(|list| !(probe.skip_empty && list.is_empty()))
                .map(|list| (probe.path, list))
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a scalar field as a string. Numbers are stringified; blank strings
/// count as absent.
fn scalar(obj: &Object, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── Devices ────────────────────────────────────────────────────────

/// Parse the device listing into canonical devices.
///
/// Entries that are not objects, lack an `id`, or carry a `device_type`
/// other than intercom/gate are dropped. A response with no recognizable
/// list is a [`ParseError`].
pub fn parse_devices(json: &Value) -> Result<Vec<Device>, ParseError> {
    let root = json.as_object().ok_or(ParseError::NotAnObject {
        found: json_kind(json),
    })?;

    let Some((path, entries)) = first_match(root, DEVICE_PROBES) else {
        return Err(ParseError::UnrecognizedShape {
            keys: root.keys().cloned().collect(),
        });
    };
    debug!(path, count = entries.len(), "located device list");

    let devices: Vec<Device> = entries.iter().filter_map(parse_device).collect();
    if devices.is_empty() {
        warn!("no intercom or gate devices in response");
    }
    Ok(devices)
}

fn parse_device(entry: &Value) -> Option<Device> {
    let Some(obj) = entry.as_object() else {
        debug!(kind = json_kind(entry), "skipping non-object device entry");
        return None;
    };

    let raw_type = obj.get("device_type").and_then(Value::as_str).unwrap_or_default();
    let Ok(device_type) = raw_type.parse::<DeviceType>() else {
        debug!(device_type = raw_type, "skipping unsupported device type");
        return None;
    };

    let Some(id) = scalar(obj, "id") else {
        warn!(%device_type, "dropping device without id");
        return None;
    };

    let text = |key: &str| obj.get(key).and_then(Value::as_str);
    let display_name = resolve_display_name(
        text("description"),
        text("name_by_user"),
        text("name_by_company"),
        device_type,
        &id,
    );

    let capabilities = obj
        .get("capabilities")
        .and_then(Value::as_array)
        .map(|caps| caps.iter().filter_map(parse_capability).collect())
        .unwrap_or_default();

    debug!(%id, name = %display_name, %device_type, "parsed device");
    Some(Device {
        id,
        device_type,
        display_name,
        capabilities,
        firmware_version: scalar(obj, "firmware_version"),
        serial_number: scalar(obj, "serial_number"),
    })
}

/// The backend reports whether a capability is configured in `setup`;
/// `enabled` is accepted as an alias.
fn parse_capability(entry: &Value) -> Option<Capability> {
    let obj = entry.as_object()?;
    let name = obj.get("name")?.as_str()?.to_owned();
    let enabled = obj
        .get("setup")
        .or_else(|| obj.get("enabled"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Some(Capability { name, enabled })
}

// ── Events ─────────────────────────────────────────────────────────

/// Parse the event listing and group it by device id.
///
/// Never fails: anything unusable yields an empty map. Entries without a
/// `device_id` are dropped. Input order is kept within each device.
pub fn parse_events(json: &Value) -> EventsByDevice {
    let mut grouped = EventsByDevice::new();

    let Some(root) = json.as_object() else {
        warn!(kind = json_kind(json), "expected an object for events");
        return grouped;
    };
    let Some((path, entries)) = first_match(root, EVENT_PROBES) else {
        debug!(keys = ?root.keys().collect::<Vec<_>>(), "no event list in response");
        return grouped;
    };

    let mut kept = 0usize;
    for event in entries.iter().filter_map(parse_event) {
        grouped.entry(event.device_id.clone()).or_default().push(event);
        kept += 1;
    }
    debug!(path, total = entries.len(), kept, devices = grouped.len(), "parsed events");
    grouped
}

fn parse_event(entry: &Value) -> Option<Event> {
    let obj = entry.as_object()?;
    let Some(device_id) = scalar(obj, "device_id") else {
        debug!("dropping event without device_id");
        return None;
    };
    let event_type = obj
        .get("event_type")
        .and_then(Value::as_str)
        .map_or_else(|| EventType::Other("unknown".into()), EventType::from_code);

    Some(Event {
        device_id,
        event_type,
        raised_at: scalar(obj, "raised_at"),
        user_id: scalar(obj, "user_id"),
        user_agent: scalar(obj, "user_agent"),
        rfid: scalar(obj, "rfid"),
        room_number: scalar(obj, "room_number"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn device_list() -> Value {
        json!([
            {
                "id": 101,
                "device_type": "intercom",
                "description": null,
                "name_by_user": null,
                "name_by_company": "Entrance",
                "capabilities": [{ "name": "open_door", "setup": true }],
                "firmware_version": "2.1.0",
                "serial_number": "SN-1"
            },
            { "id": "202", "device_type": "gate", "description": "Yard gate" },
            { "id": 303, "device_type": "camera", "description": "Lobby cam" },
            "garbage",
            { "device_type": "intercom", "description": "no id" }
        ])
    }

    #[test]
    fn all_device_shapes_yield_the_same_set() {
        let nested = parse_devices(&json!({ "data": { "devices": device_list() } })).expect("nested");
        let top = parse_devices(&json!({ "devices": device_list() })).expect("top-level");
        let flat = parse_devices(&json!({ "data": device_list() })).expect("data list");
        assert_eq!(nested, top);
        assert_eq!(top, flat);

        let ids: Vec<&str> = nested.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["101", "202"]);
    }

    #[test]
    fn device_fields_are_normalized() {
        let devices = parse_devices(&json!({ "devices": device_list() })).expect("parse");
        let intercom = &devices[0];
        assert_eq!(intercom.display_name, "Entrance");
        assert_eq!(intercom.device_type, DeviceType::Intercom);
        assert!(intercom.is_actionable());
        assert_eq!(intercom.firmware_version.as_deref(), Some("2.1.0"));
        assert_eq!(intercom.serial_number.as_deref(), Some("SN-1"));

        let gate = &devices[1];
        assert_eq!(gate.display_name, "Yard gate");
        assert!(!gate.is_actionable());
    }

    #[test]
    fn only_intercoms_and_gates_survive() {
        let json = json!({ "devices": [
            { "id": 1, "device_type": "camera" },
            { "id": 2, "device_type": "INTERCOM" },
            { "id": 3, "device_type": null },
            { "id": 4 },
            { "id": 5, "device_type": "gate" }
        ]});
        let devices = parse_devices(&json).expect("parse");
        assert_eq!(devices.len(), 1);
        assert!(devices.iter().all(|d| matches!(d.device_type, DeviceType::Intercom | DeviceType::Gate)));
    }

    #[test]
    fn blank_id_is_dropped() {
        let json = json!({ "devices": [{ "id": "  ", "device_type": "gate" }] });
        assert!(parse_devices(&json).expect("parse").is_empty());
    }

    #[test]
    fn capability_enabled_alias() {
        let json = json!({ "devices": [{
            "id": 7,
            "device_type": "gate",
            "capabilities": [{ "name": "open_door", "enabled": true }]
        }]});
        assert!(parse_devices(&json).expect("parse")[0].is_actionable());
    }

    #[test]
    fn first_matching_device_probe_wins_even_if_empty() {
        let json = json!({ "data": { "devices": [] }, "devices": device_list() });
        assert!(parse_devices(&json).expect("parse").is_empty());
    }

    #[test]
    fn unrecognized_device_shape_is_an_error() {
        let err = parse_devices(&json!({ "result": [] })).expect_err("no list");
        assert_eq!(err, ParseError::UnrecognizedShape { keys: vec!["result".into()] });

        let err = parse_devices(&json!([1, 2])).expect_err("array root");
        assert_eq!(err, ParseError::NotAnObject { found: "array" });
    }

    fn event(device_id: Value, raised_at: &str) -> Value {
        json!({
            "device_id": device_id,
            "event_type": "rfid_open_local",
            "raised_at": raised_at,
            "rfid": "ABC123",
            "room_number": "12"
        })
    }

    #[test]
    fn events_are_grouped_by_device() {
        let json = json!({ "data": { "items": [
            event(json!(101), "2025-10-17T08:00:00Z"),
            event(json!("202"), "2025-10-17T09:00:00Z"),
            event(json!(101), "2025-10-17T10:00:00Z"),
            { "event_type": "rfid_open_local" },
            "junk"
        ]}});
        let grouped = parse_events(&json);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["101"].len(), 2);
        assert_eq!(grouped["101"][1].raised_at.as_deref(), Some("2025-10-17T10:00:00Z"));
        assert_eq!(grouped["202"][0].rfid.as_deref(), Some("ABC123"));
        assert_eq!(grouped["202"][0].event_type, EventType::RfidOpenLocal);
    }

    #[test]
    fn event_probe_order() {
        let a = json!([event(json!(1), "2025-10-17T08:00:00Z")]);
        let b = json!([event(json!(2), "2025-10-17T08:00:00Z")]);

        let grouped = parse_events(&json!({ "items": a, "events": b }));
        assert!(grouped.contains_key("1") && !grouped.contains_key("2"));

        let grouped = parse_events(&json!({ "events": b, "data": a }));
        assert!(grouped.contains_key("2") && !grouped.contains_key("1"));

        let grouped = parse_events(&json!({ "data": a }));
        assert!(grouped.contains_key("1"));
    }

    #[test]
    fn empty_nested_items_fall_back_to_top_level() {
        let json = json!({
            "data": { "items": [] },
            "items": [event(json!(1), "2025-10-17T08:00:00Z")]
        });
        let grouped = parse_events(&json);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["1"][0].event_type, EventType::RfidOpenLocal);
    }

    #[test]
    fn empty_top_level_items_do_not_fall_through() {
        let json = json!({
            "items": [],
            "events": [event(json!(2), "2025-10-17T08:00:00Z")]
        });
        assert!(parse_events(&json).is_empty());
    }

    #[test]
    fn malformed_events_yield_empty_map() {
        for json in [
            json!(null),
            json!("oops"),
            json!([]),
            json!({}),
            json!({ "data": { "items": "nope" } }),
            json!({ "items": [1, 2, 3] }),
        ] {
            assert!(parse_events(&json).is_empty(), "{json}");
        }
    }

    #[test]
    fn unknown_event_type_is_kept() {
        let json = json!({ "items": [{ "device_id": 1, "event_type": "call_missed" }] });
        let grouped = parse_events(&json);
        assert_eq!(grouped["1"][0].event_type, EventType::Other("call_missed".into()));
    }
}
