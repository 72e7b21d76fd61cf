//! `rtkey open <device-id>`

use std::sync::Arc;
use std::time::Duration;

use rtkey_core::{Coordinator, OpenButton, Snapshot};

use crate::cli::{GlobalOpts, OpenArgs};
use crate::error::CliError;
use crate::output;

use super::status;

pub async fn handle(
    coordinator: &Coordinator,
    args: &OpenArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = coordinator.first_refresh().await?;
    let device = snapshot.device(&args.device_id).ok_or_else(|| CliError::NotFound {
        device_id: args.device_id.clone(),
    })?;
    let button = OpenButton::for_device(device).ok_or_else(|| CliError::Validation {
        field: "device_id".into(),
        reason: format!("'{}' cannot be opened remotely", device.display_name),
    })?;

    let mut updates = coordinator.subscribe();
    updates.mark_unchanged();
    button.press(coordinator).await?;

    if !global.quiet {
        eprintln!("{}: open request sent", button.name);
    }

    let refreshed = wait_for_refresh(coordinator, &mut updates).await;
    let entries = status::entries(coordinator, &refreshed, Some(&args.device_id))?;
    output::print_output(&status::render(&entries, global)?, global.quiet);
    Ok(())
}

/// The snapshot published by the refresh the open action requested, or the
/// current one if it does not arrive in time.
async fn wait_for_refresh(
    coordinator: &Coordinator,
    updates: &mut tokio::sync::watch::Receiver<Option<Arc<Snapshot>>>,
) -> Arc<Snapshot> {
    let config = coordinator.config();
    let limit: Duration = config.request_timeout + config.events_timeout;

    match tokio::time::timeout(limit, updates.changed()).await {
        Ok(Ok(())) => {
            if let Some(snapshot) = updates.borrow_and_update().clone() {
                return snapshot;
            }
        }
        Ok(Err(_)) => {}
        Err(_) => tracing::warn!(?limit, "refresh after open did not finish in time"),
    }
    coordinator
        .snapshot()
        .unwrap_or_else(|| Arc::new(Snapshot::empty()))
}
