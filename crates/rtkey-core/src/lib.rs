//! Polling coordinator and domain model between `rtkey-api` and hosts.
//!
//! This crate owns everything above raw HTTP:
//!
//! - **[`Coordinator`]** -- Runs refresh cycles (devices, then events for
//!   those devices in one combined call), publishes each result as an
//!   atomically replaced [`Snapshot`], and exposes the "open" side-channel.
//!   Device-phase failures abort a cycle; event-phase failures only degrade
//!   it to an empty event map.
//!
//! - **Normalization** ([`normalize`]) -- Ordered shape probes that locate
//!   device and event lists in loosely structured JSON, dropping entries
//!   that cannot be used.
//!
//! - **Selection** ([`selector`]) -- Most-recent event per device, compared
//!   in UTC.
//!
//! - **Host seams** -- [`Scheduler`] for periodic ticks ([`TokioScheduler`]
//!   by default) and [`ConfigStore`] for persisting the token and interval.
//!
//! - **Presentation** ([`presentation`]) -- Open buttons, last-open sensors,
//!   status lines and attributes derived from a snapshot.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod normalize;
pub mod presentation;
pub mod scheduler;
pub mod selector;
pub mod setup;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CoordinatorConfig, IntervalOutOfRange, UpdateInterval};
pub use coordinator::{Coordinator, UpdateStatus};
pub use error::{ActionError, ParseError, RefreshError, SetupError, StoreError};
pub use scheduler::{Job, ScheduledTask, Scheduler, TokioScheduler};
pub use setup::{reauthenticate, setup, validate_token};
pub use store::{CONF_BEARER_TOKEN, CONF_UPDATE_INTERVAL, ConfigStore, MemoryConfigStore};

pub use model::{
    Capability, Device, DeviceType, DeviceTypeInfo, Event, EventType, EventsByDevice, Snapshot,
};
pub use presentation::{LastOpenSensor, OpenButton, SensorAttributes};
