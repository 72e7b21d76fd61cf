// rtkey-api: Async Rust client for the RTKkey household and events APIs

pub mod client;
pub mod devices;
pub mod error;
pub mod events;
pub mod transport;

pub use client::{ActionResponse, DEFAULT_EVENTS_URL, DEFAULT_HOUSEHOLD_URL, RtkeyClient};
pub use error::Error;
pub use events::{EventQuery, MAX_EVENTS_PER_PAGE, RAISED_AT_FORMAT};
pub use transport::{DEFAULT_EVENTS_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, TransportConfig, USER_AGENT};
