// Events API: the door/gate opening log

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::debug;

use crate::client::RtkeyClient;
use crate::error::Error;

/// Timestamp format the events API expects for the raise-time window.
pub const RAISED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Hard page cap enforced by the events API.
pub const MAX_EVENTS_PER_PAGE: u32 = 100;

/// Query parameters for `GET {events}/events/list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub begin_raised_at: DateTime<Utc>,
    pub end_raised_at: DateTime<Utc>,
    pub device_ids: Vec<String>,
    pub event_types: Vec<String>,
    pub offset: u32,
    pub limit: u32,
}

impl EventQuery {
    /// Newest-first query over the trailing `window` ending at `now`.
    ///
    /// `limit` is clamped to [`MAX_EVENTS_PER_PAGE`].
    pub fn trailing(
        now: DateTime<Utc>,
        window: Duration,
        device_ids: Vec<String>,
        event_types: Vec<String>,
        limit: u32,
    ) -> Self {
        Self {
            begin_raised_at: now - window,
            end_raised_at: now,
            device_ids,
            event_types,
            offset: 0,
            limit: limit.min(MAX_EVENTS_PER_PAGE),
        }
    }

    /// Render as query pairs, sorted by raise time descending.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "begin_raised_at",
                self.begin_raised_at.format(RAISED_AT_FORMAT).to_string(),
            ),
            (
                "end_raised_at",
                self.end_raised_at.format(RAISED_AT_FORMAT).to_string(),
            ),
            ("device_ids", self.device_ids.join(",")),
            ("event_types", self.event_types.join(",")),
            ("sort_by", "raised_at".into()),
            ("sort_order", "desc".into()),
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

impl RtkeyClient {
    /// List opening events for the given query as raw JSON.
    ///
    /// `GET {events}/events/list`, bounded by the longer events timeout.
    pub async fn list_events(&self, query: &EventQuery) -> Result<Value, Error> {
        let url = self.events(&["events", "list"])?;
        debug!(
            devices = query.device_ids.len(),
            begin = %query.begin_raised_at,
            end = %query.end_raised_at,
            "listing events"
        );
        self.fetch_json(url, &query.to_params(), self.transport().events_timeout)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn trailing_window_params() {
        let now = Utc.with_ymd_and_hms(2025, 10, 17, 8, 30, 0).single().expect("valid");
        let query = EventQuery::trailing(
            now,
            Duration::days(7),
            vec!["1".into(), "2".into()],
            vec!["rfid_open_local".into(), "api_open_remote".into()],
            100,
        );

        assert_eq!(
            query.to_params(),
            vec![
                ("begin_raised_at", "2025-10-10T08:30:00Z".to_string()),
                ("end_raised_at", "2025-10-17T08:30:00Z".to_string()),
                ("device_ids", "1,2".to_string()),
                ("event_types", "rfid_open_local,api_open_remote".to_string()),
                ("sort_by", "raised_at".to_string()),
                ("sort_order", "desc".to_string()),
                ("offset", "0".to_string()),
                ("limit", "100".to_string()),
            ]
        );
    }

    #[test]
    fn limit_is_clamped_to_page_cap() {
        let query = EventQuery::trailing(Utc::now(), Duration::days(1), vec![], vec![], 500);
        assert_eq!(query.limit, MAX_EVENTS_PER_PAGE);
    }
}
