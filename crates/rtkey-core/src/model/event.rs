// ── Opening event domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumIter, EnumString, IntoEnumIterator};

use crate::selector::parse_raised_at;

/// Cause code of a door/gate opening.
///
/// Codes outside the known set are kept verbatim in [`EventType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    ApiOpenRemote,
    FaceOpenRemote,
    PinCodeOpenRemote,
    CodeOpenLocal,
    RfidOpenLocal,
    DtmfOpenLocal,
    #[strum(default)]
    Other(String),
}

impl EventType {
    /// Every known code, in the order the events API is queried with.
    pub fn known() -> impl Iterator<Item = Self> {
        Self::iter().filter(|t| !matches!(t, Self::Other(_)))
    }

    /// The wire code, e.g. `rfid_open_local`.
    pub fn code(&self) -> &str {
        match self {
            Self::ApiOpenRemote => "api_open_remote",
            Self::FaceOpenRemote => "face_open_remote",
            Self::PinCodeOpenRemote => "pin_code_open_remote",
            Self::CodeOpenLocal => "code_open_local",
            Self::RfidOpenLocal => "rfid_open_local",
            Self::DtmfOpenLocal => "dtmf_open_local",
            Self::Other(code) => code,
        }
    }

    /// Human-readable label; unknown codes are shown as-is.
    pub fn label(&self) -> &str {
        match self {
            Self::ApiOpenRemote => "API opening",
            Self::FaceOpenRemote => "Face opening",
            Self::PinCodeOpenRemote => "PIN code opening",
            Self::CodeOpenLocal => "Code opening",
            Self::RfidOpenLocal => "RFID opening",
            Self::DtmfOpenLocal => "DTMF opening",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        code.parse()
            .unwrap_or_else(|_| Self::Other(code.to_owned()))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code))
    }
}

/// A recorded opening, normalized from the events API.
///
/// `raised_at` is kept as the raw string: an event whose timestamp does not
/// parse stays in the per-device list but never wins "most recent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub device_id: String,
    pub event_type: EventType,
    pub raised_at: Option<String>,
    pub user_id: Option<String>,
    pub user_agent: Option<String>,
    pub rfid: Option<String>,
    pub room_number: Option<String>,
}

impl Event {
    /// Raise time in UTC, if the raw value parses.
    pub fn raised_at_utc(&self) -> Option<DateTime<Utc>> {
        self.raised_at.as_deref().and_then(parse_raised_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_parse() {
        assert_eq!(EventType::from_code("rfid_open_local"), EventType::RfidOpenLocal);
        assert_eq!(
            EventType::from_code("pin_code_open_remote"),
            EventType::PinCodeOpenRemote
        );
    }

    #[test]
    fn unknown_code_is_preserved() {
        let t = EventType::from_code("call_missed");
        assert_eq!(t, EventType::Other("call_missed".into()));
        assert_eq!(t.code(), "call_missed");
        assert_eq!(t.label(), "call_missed");
    }

    #[test]
    fn known_set_has_six_codes_in_query_order() {
        let codes: Vec<String> = EventType::known().map(|t| t.code().to_owned()).collect();
        assert_eq!(
            codes,
            [
                "api_open_remote",
                "face_open_remote",
                "pin_code_open_remote",
                "code_open_local",
                "rfid_open_local",
                "dtmf_open_local",
            ]
        );
    }

    #[test]
    fn serializes_as_wire_code() {
        let json = serde_json::to_string(&EventType::DtmfOpenLocal).expect("serialize");
        assert_eq!(json, "\"dtmf_open_local\"");
        let back: EventType = serde_json::from_str("\"face_open_remote\"").expect("deserialize");
        assert_eq!(back, EventType::FaceOpenRemote);
    }
}
