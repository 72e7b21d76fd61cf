use thiserror::Error;

/// Top-level error type for the `rtkey-api` crate.
///
/// Every HTTP call made by [`RtkeyClient`](crate::RtkeyClient) fails with
/// exactly one of these. `rtkey-core` decides which of them are fatal to a
/// refresh cycle and which only degrade it.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The backend rejected the bearer token (HTTP 401).
    #[error("Unauthorized -- the bearer token was rejected")]
    Unauthorized,

    /// The token cannot be encoded as an HTTP header value.
    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),

    // ── Transport ───────────────────────────────────────────────────
    /// The call did not complete within its timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// DNS failure, refused connection, TLS handshake failure, etc.
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// Any other reqwest failure (body read, redirect loop, ...).
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Server ──────────────────────────────────────────────────────
    /// Non-2xx status other than 401. The body is kept for diagnostics.
    #[error("Server returned HTTP {status}: {body}")]
    Server { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The body of a 2xx response was not valid JSON.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Classify a reqwest failure into timeout / connect / other.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else if err.is_connect() {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: err.to_string(),
            }
        } else {
            Self::Http(err)
        }
    }

    /// Returns `true` if the credential must be re-entered.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status of a server-side failure, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
