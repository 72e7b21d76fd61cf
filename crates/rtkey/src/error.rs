//! CLI error types with miette diagnostics.
//!
//! Maps core, config and transport errors into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use rtkey_config::ConfigError;
use rtkey_core::{ActionError, RefreshError, SetupError, StoreError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(rtkey::connection_failed),
        help("Check network access to the Rostelecom Key API.\nURL: {url}\nReason: {reason}")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(rtkey::timeout),
        help("Raise request_timeout / events_timeout in the config file, or retry later.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed -- the bearer token was rejected")]
    #[diagnostic(
        code(rtkey::auth_failed),
        help("Obtain a fresh token and run: rtkey login --token <TOKEN>")
    )]
    AuthFailed,

    #[error("No bearer token configured")]
    #[diagnostic(
        code(rtkey::no_credentials),
        help(
            "Store one with: rtkey login --token <TOKEN>\n\
             Or set the RTKEY_TOKEN environment variable."
        )
    )]
    NoCredentials,

    // ── Devices ──────────────────────────────────────────────────────
    #[error("Device '{device_id}' not found")]
    #[diagnostic(
        code(rtkey::not_found),
        help("Run `rtkey devices` to list available device IDs.")
    )]
    NotFound { device_id: String },

    #[error("Device '{device_id}' refused to open (HTTP {status})")]
    #[diagnostic(
        code(rtkey::open_rejected),
        help("The account may not be allowed to open this device.\nResponse: {body}")
    )]
    OpenRejected {
        device_id: String,
        status: u16,
        body: String,
    },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(rtkey::api_error))]
    Api { message: String },

    #[error("Unexpected response shape: {0}")]
    #[diagnostic(
        code(rtkey::malformed_response),
        help("The backend format may have changed. Rerun with -vv for details.")
    )]
    MalformedResponse(String),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(rtkey::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(rtkey::config))]
    Config(Box<ConfigError>),

    #[error(transparent)]
    #[diagnostic(code(rtkey::store))]
    Store(#[from] StoreError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed | Self::NoCredentials => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::OpenRejected { .. } => exit_code::PERMISSION,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<rtkey_api::Error> for CliError {
    fn from(err: rtkey_api::Error) -> Self {
        match err {
            rtkey_api::Error::Unauthorized => Self::AuthFailed,
            rtkey_api::Error::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            rtkey_api::Error::ConnectionFailed { url, reason } => {
                Self::ConnectionFailed { url, reason }
            }
            rtkey_api::Error::InvalidToken(reason) => Self::Validation {
                field: "token".into(),
                reason,
            },
            rtkey_api::Error::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            rtkey_api::Error::Deserialization { message, .. } => Self::MalformedResponse(message),
            other => Self::Api {
                message: other.to_string(),
            },
        }
    }
}

impl From<RefreshError> for CliError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Auth => Self::AuthFailed,
            RefreshError::Transport(e) => e.into(),
            RefreshError::Parse(e) => Self::MalformedResponse(e.to_string()),
            e @ RefreshError::ShutDown => Self::Api {
                message: e.to_string(),
            },
        }
    }
}

impl From<ActionError> for CliError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::Unauthorized => Self::AuthFailed,
            ActionError::DeviceRejected {
                device_id,
                status,
                body,
            } => Self::OpenRejected {
                device_id,
                status,
                body,
            },
            ActionError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            ActionError::Transport(e) => e.into(),
        }
    }
}

impl From<SetupError> for CliError {
    fn from(err: SetupError) -> Self {
        match err {
            SetupError::InvalidAuth => Self::AuthFailed,
            SetupError::CannotConnect(reason) => Self::ConnectionFailed {
                url: "Rostelecom Key API".into(),
                reason,
            },
            SetupError::Store(e) => e.into(),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials => Self::NoCredentials,
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}
