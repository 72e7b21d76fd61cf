// ── Refresh coordinator ──
//
// Owns the one in-memory snapshot. Each cycle fetches devices, then the
// events for those devices in a single combined call, and publishes the
// result atomically. Cycles are serialized by `refresh_lock`; on-demand
// requests coalesce behind it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use chrono::Utc;
use futures_util::FutureExt;
use rtkey_api::{EventQuery, RtkeyClient};
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::CoordinatorConfig;
use crate::error::{ActionError, RefreshError};
use crate::model::{Device, EventType, EventsByDevice, Snapshot};
use crate::normalize::{parse_devices, parse_events};
use crate::scheduler::{Job, ScheduledTask, Scheduler};

/// Outcome of the most recent refresh, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UpdateStatus {
    /// No refresh has completed yet.
    #[default]
    Pending,
    Ok,
    /// Transient failure; retried at the next tick.
    Failed,
    /// The token was rejected; the host must re-authenticate.
    AuthFailed,
}

/// Periodic poller and action side-channel for one account.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    client: RtkeyClient,
    snapshot: ArcSwapOption<Snapshot>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    status: watch::Sender<UpdateStatus>,
    refresh_lock: Mutex<()>,
    refresh_pending: AtomicBool,
    scheduled: ArcSwapOption<ScheduledTask>,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Build a coordinator. Does NOT fetch anything -- call
    /// [`first_refresh()`](Self::first_refresh) before exposing it.
    pub fn new(config: CoordinatorConfig) -> Result<Self, RefreshError> {
        let client = RtkeyClient::new(
            &config.household_url,
            &config.events_url,
            &config.token,
            config.transport(),
        )?;
        Ok(Self::with_client(config, client))
    }

    /// Build around an existing client.
    pub fn with_client(config: CoordinatorConfig, client: RtkeyClient) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (status, _) = watch::channel(UpdateStatus::Pending);
        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                snapshot: ArcSwapOption::empty(),
                snapshot_tx,
                status,
                refresh_lock: Mutex::new(()),
                refresh_pending: AtomicBool::new(false),
                scheduled: ArcSwapOption::empty(),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// The initial refresh. The coordinator is not usable until this
    /// succeeds; an `Auth` error means the stored token must be replaced.
    pub async fn first_refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        let snapshot = self.refresh().await?;
        info!(
            devices = snapshot.devices.len(),
            interval = %self.inner.config.update_interval,
            "coordinator ready"
        );
        Ok(snapshot)
    }

    /// Register the periodic refresh with `scheduler`. Replaces any
    /// previously registered job.
    pub fn start(&self, scheduler: &dyn Scheduler) {
        let this = self.clone();
        let job: Job = Arc::new(move || {
            let this = this.clone();
            async move {
                if this.inner.cancel.is_cancelled() {
                    return;
                }
                if let Err(e) = this.refresh().await {
                    warn!(error = %e, "scheduled refresh failed");
                }
            }
            .boxed()
        });

        let period = self.inner.config.update_interval.as_duration();
        let task = scheduler.every(period, job);
        if let Some(previous) = self.inner.scheduled.swap(Some(Arc::new(task))) {
            previous.cancel();
        }
        debug!(?period, "periodic refresh scheduled");
    }

    /// Cancel scheduled work and discard the snapshot.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(task) = self.inner.scheduled.swap(None) {
            task.cancel();
        }
        self.inner.snapshot.store(None);
        self.inner.snapshot_tx.send_replace(None);
        self.inner.status.send_replace(UpdateStatus::Pending);
        debug!("coordinator shut down");
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run one full cycle and publish its snapshot.
    ///
    /// Waits for any in-flight cycle first. On error the previous snapshot
    /// stays in place. After [`shutdown()`](Self::shutdown) this returns
    /// [`RefreshError::ShutDown`] and publishes nothing.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        let _guard = self.inner.refresh_lock.lock().await;
        if self.inner.cancel.is_cancelled() {
            return Err(RefreshError::ShutDown);
        }
        self.refresh_locked().await
    }

    /// Ask for a refresh soon without waiting for it.
    ///
    /// At most one request is pending at a time; further requests made
    /// while one is waiting are folded into it. Returns `false` when the
    /// request was coalesced.
    pub fn request_refresh(&self) -> bool {
        if self.inner.refresh_pending.swap(true, Ordering::AcqRel) {
            debug!("refresh already pending, coalescing");
            return false;
        }

        let this = self.clone();
        tokio::spawn(async move {
            let _guard = this.inner.refresh_lock.lock().await;
            this.inner.refresh_pending.store(false, Ordering::Release);
            if this.inner.cancel.is_cancelled() {
                return;
            }
            if let Err(e) = this.refresh_locked().await {
                warn!(error = %e, "requested refresh failed");
            }
        });
        true
    }

    async fn refresh_locked(&self) -> Result<Arc<Snapshot>, RefreshError> {
        let result = self.fetch_snapshot().await;
        // Shutdown may land while the fetch is in flight.
        if self.inner.cancel.is_cancelled() {
            debug!("discarding refresh result after shutdown");
            return Err(RefreshError::ShutDown);
        }
        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.inner.snapshot.store(Some(Arc::clone(&snapshot)));
                self.inner.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));
                self.inner.status.send_replace(UpdateStatus::Ok);
                Ok(snapshot)
            }
            Err(e) => {
                let status = if e.is_auth() {
                    UpdateStatus::AuthFailed
                } else {
                    UpdateStatus::Failed
                };
                self.inner.status.send_replace(status);
                Err(e)
            }
        }
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, RefreshError> {
        debug!("starting refresh");
        let raw = self.inner.client.list_devices().await?;
        let devices = parse_devices(&raw)?;

        if devices.is_empty() {
            info!("no intercom or gate devices, skipping event fetch");
            return Ok(Snapshot::new(devices, EventsByDevice::new(), true));
        }

        let (events, events_available) = self.fetch_events(&devices).await?;
        info!(
            devices = devices.len(),
            devices_with_events = events.len(),
            events_available,
            "refresh complete"
        );
        Ok(Snapshot::new(devices, events, events_available))
    }

    /// Best-effort event fetch. Only a rejected token escapes as an error;
    /// everything else degrades to an empty map.
    async fn fetch_events(&self, devices: &[Device]) -> Result<(EventsByDevice, bool), RefreshError> {
        let config = &self.inner.config;
        let query = EventQuery::trailing(
            Utc::now(),
            config.event_window,
            devices.iter().map(|d| d.id.clone()).collect(),
            EventType::known().map(|t| t.code().to_owned()).collect(),
            config.event_limit,
        );

        match self.inner.client.list_events(&query).await {
            Ok(raw) => Ok((parse_events(&raw), true)),
            Err(rtkey_api::Error::Unauthorized) => Err(RefreshError::Auth),
            Err(e) => {
                warn!(error = %e, "event fetch failed, continuing without events");
                Ok((EventsByDevice::new(), false))
            }
        }
    }

    // ── Actions ──────────────────────────────────────────────────

    /// Press "open" on a device, then request an immediate refresh so the
    /// new event shows up.
    pub async fn trigger_open(&self, device_id: &str) -> Result<(), ActionError> {
        let response = self.inner.client.open_device(device_id).await.map_err(|e| {
            error!(device_id, error = %e, "open request failed");
            ActionError::from(e)
        })?;

        if !response.is_ok() {
            error!(device_id, status = %response.status, "device rejected open request");
            return Err(ActionError::DeviceRejected {
                device_id: device_id.to_owned(),
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        info!(device_id, "open request accepted");
        self.request_refresh();
        Ok(())
    }

    // ── State observation ────────────────────────────────────────

    /// The latest published snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot.load_full()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn status(&self) -> UpdateStatus {
        *self.inner.status.borrow()
    }

    pub fn status_changes(&self) -> watch::Receiver<UpdateStatus> {
        self.inner.status.subscribe()
    }

    /// Whether the most recent cycle succeeded. Entity availability
    /// follows this.
    pub fn last_update_success(&self) -> bool {
        self.status() == UpdateStatus::Ok
    }
}
