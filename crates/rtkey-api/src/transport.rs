// Shared transport configuration for building the reqwest::Client.
//
// Timeouts are applied per request rather than on the client, since the
// event-listing endpoint gets a longer budget than everything else.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// User agent sent with every request. Events raised by our own open
/// calls echo it back, which lets the presentation layer recognise them.
pub const USER_AGENT: &str = concat!("rtkey/", env!("CARGO_PKG_VERSION"));

/// Timeout for device listing and open actions.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the event-listing call (heavier endpoint).
pub const DEFAULT_EVENTS_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub request_timeout: Duration,
    pub events_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            events_timeout: DEFAULT_EVENTS_TIMEOUT,
            user_agent: USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` that sends `Authorization: Bearer <token>`
    /// on every request.
    ///
    /// Idle connections are not kept: each call opens and releases its own.
    pub fn build_client(&self, token: &SecretString) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer_header(token)?);

        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(Error::Http)
    }
}

fn bearer_header(token: &SecretString) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(|e| Error::InvalidToken(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_is_sensitive() {
        let token = SecretString::from("abc".to_string());
        let value = bearer_header(&token).expect("valid header");
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().expect("ascii"), "Bearer abc");
    }

    #[test]
    fn bearer_header_rejects_newlines() {
        let token = SecretString::from("abc\ndef".to_string());
        assert!(matches!(bearer_header(&token), Err(Error::InvalidToken(_))));
    }

    #[test]
    fn default_timeouts() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.events_timeout, Duration::from_secs(15));
        assert!(cfg.user_agent.starts_with("rtkey/"));
    }
}
