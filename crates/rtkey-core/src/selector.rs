// ── Most-recent event selection ──
//
// Selection always compares in UTC. Conversion to a local zone happens
// only for display, in `presentation`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::model::Event;

/// Naive layouts tried after RFC 3339. `%.f` also accepts a missing
/// fractional part.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse an event raise time.
///
/// Accepts ISO-8601 with or without fractional seconds. The wall-clock
/// value is taken as UTC whatever suffix (`Z`, `+03:00`, none) is present,
/// matching how the backend writes these fields.
pub fn parse_raised_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().and_utc());
    }

    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|dt| dt.and_utc())
}

/// Pick the event with the greatest parseable raise time.
///
/// Events whose timestamp does not parse are skipped. On ties the earlier
/// event in input order wins. Returns `None` when nothing parses.
pub fn latest_event(events: &[Event]) -> Option<&Event> {
    let mut best: Option<(DateTime<Utc>, &Event)> = None;
    for event in events {
        let Some(at) = event.raised_at_utc() else {
            continue;
        };
        if best.is_none_or(|(best_at, _)| at > best_at) {
            best = Some((at, event));
        }
    }
    best.map(|(_, event)| event)
}

/// Convert a UTC instant into the caller's zone for display.
pub fn to_local<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> DateTime<Tz> {
    at.with_timezone(tz)
}
