// ── Runtime coordinator configuration ──
//
// Describes what to poll and how often. Carries the credential but never
// touches disk: hosts build a `CoordinatorConfig` directly or read one back
// from their `ConfigStore`.

use std::fmt;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StoreError;
use crate::store::{CONF_BEARER_TOKEN, CONF_UPDATE_INTERVAL, ConfigStore};

/// Minutes between scheduled refreshes, validated to `1..=1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct UpdateInterval(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("update interval must be between {min} and {max} minutes, got {got}", min = UpdateInterval::MIN, max = UpdateInterval::MAX)]
pub struct IntervalOutOfRange {
    pub got: u32,
}

impl UpdateInterval {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 1440;
    pub const DEFAULT: Self = Self(5);

    pub fn new(minutes: u32) -> Result<Self, IntervalOutOfRange> {
        if (Self::MIN..=Self::MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(IntervalOutOfRange { got: minutes })
        }
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 60)
    }
}

impl Default for UpdateInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for UpdateInterval {
    type Error = IntervalOutOfRange;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<UpdateInterval> for u32 {
    fn from(interval: UpdateInterval) -> Self {
        interval.0
    }
}

impl fmt::Display for UpdateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

/// Everything the coordinator needs to run.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Bearer token sent on every call.
    pub token: SecretString,
    /// Base of the device listing and open endpoints.
    pub household_url: String,
    /// Base of the event listing endpoint.
    pub events_url: String,
    pub update_interval: UpdateInterval,
    /// Timeout for device listing and open calls.
    pub request_timeout: Duration,
    /// Timeout for the (heavier) event listing call.
    pub events_timeout: Duration,
    /// How far back event history is requested.
    pub event_window: chrono::Duration,
    /// Page size for the event listing; capped at 100 by the backend.
    pub event_limit: u32,
}

impl CoordinatorConfig {
    /// Production endpoints and default tuning for `token`.
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            household_url: rtkey_api::DEFAULT_HOUSEHOLD_URL.to_owned(),
            events_url: rtkey_api::DEFAULT_EVENTS_URL.to_owned(),
            update_interval: UpdateInterval::DEFAULT,
            request_timeout: rtkey_api::DEFAULT_REQUEST_TIMEOUT,
            events_timeout: rtkey_api::DEFAULT_EVENTS_TIMEOUT,
            event_window: chrono::Duration::days(7),
            event_limit: rtkey_api::MAX_EVENTS_PER_PAGE,
        }
    }

    #[must_use]
    pub fn with_update_interval(mut self, interval: UpdateInterval) -> Self {
        self.update_interval = interval;
        self
    }

    #[must_use]
    pub fn with_endpoints(mut self, household_url: impl Into<String>, events_url: impl Into<String>) -> Self {
        self.household_url = household_url.into();
        self.events_url = events_url.into();
        self
    }

    /// Read the token and interval persisted by [`setup`](crate::setup::setup).
    ///
    /// A missing interval falls back to the default; a missing token is an
    /// error.
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, StoreError> {
        let token = store
            .get(CONF_BEARER_TOKEN)?
            .filter(|t| !t.trim().is_empty())
            .ok_or(StoreError::Missing(CONF_BEARER_TOKEN))?;

        let update_interval = match store.get(CONF_UPDATE_INTERVAL)? {
            None => UpdateInterval::DEFAULT,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| e.to_string())
                .and_then(|m| UpdateInterval::new(m).map_err(|e| e.to_string()))
                .map_err(|message| StoreError::Invalid {
                    key: CONF_UPDATE_INTERVAL,
                    message,
                })?,
        };

        Ok(Self::new(SecretString::from(token)).with_update_interval(update_interval))
    }

    pub(crate) fn transport(&self) -> rtkey_api::TransportConfig {
        rtkey_api::TransportConfig {
            request_timeout: self.request_timeout,
            events_timeout: self.events_timeout,
            ..rtkey_api::TransportConfig::default()
        }
    }
}
