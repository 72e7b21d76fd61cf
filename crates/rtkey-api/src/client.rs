// RTKkey HTTP client
//
// Wraps `reqwest::Client` with bearer auth, base-URL handling and the
// status-code translation shared by every endpoint. Endpoint methods live
// in `devices.rs` and `events.rs` as inherent impls.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default base for the household (device) API.
pub const DEFAULT_HOUSEHOLD_URL: &str = "https://household.key.rt.ru/api/v2/app/";

/// Default base for the events API.
pub const DEFAULT_EVENTS_URL: &str = "https://events.key.rt.ru/api/v2/";

/// Outcome of a POST action that reached the server.
///
/// Any status other than 401 is returned here rather than as an error;
/// the caller decides whether the status counts as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ActionResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

/// Raw HTTP client for the RTKkey household and events APIs.
///
/// Returns untyped JSON: the response shapes are loosely defined, so
/// normalization happens one layer up in `rtkey-core`.
pub struct RtkeyClient {
    http: reqwest::Client,
    household_url: Url,
    events_url: Url,
    transport: TransportConfig,
}

impl RtkeyClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client that authenticates with `token`.
    pub fn new(
        household_url: &str,
        events_url: &str,
        token: &SecretString,
        transport: TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(token)?;
        Self::from_reqwest(household_url, events_url, http, transport)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        household_url: &str,
        events_url: &str,
        http: reqwest::Client,
        transport: TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            household_url: normalize_base_url(household_url)?,
            events_url: normalize_base_url(events_url)?,
            transport,
        })
    }

    pub fn household_url(&self) -> &Url {
        &self.household_url
    }

    pub fn events_url(&self) -> &Url {
        &self.events_url
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Household URL with each segment appended (and percent-encoded).
    pub(crate) fn household(&self, segments: &[&str]) -> Result<Url, Error> {
        append_segments(&self.household_url, segments)
    }

    pub(crate) fn events(&self, segments: &[&str]) -> Result<Url, Error> {
        append_segments(&self.events_url, segments)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// `GET url?query` bounded by `timeout`, returning the parsed JSON body.
    ///
    /// 401 maps to [`Error::Unauthorized`], any other non-2xx status to
    /// [`Error::Server`].
    pub async fn fetch_json(
        &self,
        url: Url,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value, Error> {
        debug!("GET {url}");
        let secs = timeout.as_secs();

        let resp = self
            .http
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, secs))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_reqwest(e, secs))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            return Err(Error::Server {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// `GET url` bounded by `timeout`, returning only the status code.
    ///
    /// No status is turned into an error; the body is not read.
    pub async fn fetch_status(&self, url: Url, timeout: Duration) -> Result<StatusCode, Error> {
        debug!("GET {url} (status only)");
        let secs = timeout.as_secs();
        let resp = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, secs))?;
        Ok(resp.status())
    }

    /// `POST url` with a JSON body, bounded by `timeout`.
    ///
    /// Only a 401 is turned into an error; other statuses come back in the
    /// [`ActionResponse`] together with the body.
    pub async fn post_action<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
        timeout: Duration,
    ) -> Result<ActionResponse, Error> {
        debug!("POST {url}");
        let secs = timeout.as_secs();

        let resp = self
            .http
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, secs))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(%status, error = %e, "could not read action response body");
                String::new()
            }
        };
        Ok(ActionResponse { status, body })
    }
}

/// Parse a base URL and make sure it ends with `/` so segments append
/// instead of replacing the last path component.
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}

fn append_segments(base: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
