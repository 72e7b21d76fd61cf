// ── Core error types ──
//
// Errors surfaced to hosts of the coordinator. Transport failures from
// rtkey-api are classified once, in the `From` impls below, into the
// phase-specific enums the host acts on.

use thiserror::Error;

/// The device response had no recognizable structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Expected a JSON object at the top level, got {found}")]
    NotAnObject { found: &'static str },

    #[error("No device list found (tried data.devices, devices, data); keys present: {keys:?}")]
    UnrecognizedShape { keys: Vec<String> },
}

/// A refresh cycle failed in its device phase.
///
/// `Auth` is the one variant that should prompt for a new token; the others
/// are retried at the next scheduled tick.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Authentication failed -- re-enter the bearer token")]
    Auth,

    #[error("Error communicating with API: {0}")]
    Transport(#[source] rtkey_api::Error),

    #[error("Malformed device response: {0}")]
    Parse(#[from] ParseError),

    #[error("Coordinator has been shut down")]
    ShutDown,
}

impl RefreshError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }
}

impl From<rtkey_api::Error> for RefreshError {
    fn from(err: rtkey_api::Error) -> Self {
        match err {
            rtkey_api::Error::Unauthorized => Self::Auth,
            other => Self::Transport(other),
        }
    }
}

/// The open action failed. Never retried automatically.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Unauthorized -- the bearer token was rejected")]
    Unauthorized,

    #[error("Device {device_id} rejected the open request (HTTP {status}): {body}")]
    DeviceRejected {
        device_id: String,
        status: u16,
        body: String,
    },

    #[error("Open request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Open request failed: {0}")]
    Transport(#[source] rtkey_api::Error),
}

impl From<rtkey_api::Error> for ActionError {
    fn from(err: rtkey_api::Error) -> Self {
        match err {
            rtkey_api::Error::Unauthorized => Self::Unauthorized,
            rtkey_api::Error::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            other => Self::Transport(other),
        }
    }
}

/// Token validation during setup or re-authentication.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid authentication")]
    InvalidAuth,

    #[error("Cannot connect: {0}")]
    CannotConnect(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rtkey_api::Error> for SetupError {
    fn from(err: rtkey_api::Error) -> Self {
        match err {
            rtkey_api::Error::Unauthorized => Self::InvalidAuth,
            other => Self::CannotConnect(other.to_string()),
        }
    }
}

/// Failure reading or writing the host key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing required key: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Store backend error: {0}")]
    Backend(String),
}
