//! `rtkey watch` -- run the coordinator on its update interval and print
//! status lines whenever a new snapshot is published.

use chrono::Local;
use tracing::{info, warn};

use rtkey_core::{Coordinator, TokioScheduler, UpdateStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::status;

pub async fn handle(coordinator: &Coordinator, global: &GlobalOpts) -> Result<(), CliError> {
    let first = coordinator.first_refresh().await?;
    print_snapshot(coordinator, &first, global)?;

    let scheduler = TokioScheduler::new();
    coordinator.start(&scheduler);
    info!(interval = %coordinator.config().update_interval, "watching, Ctrl-C to stop");

    let mut snapshots = coordinator.subscribe();
    snapshots.mark_unchanged();
    let mut statuses = coordinator.status_changes();
    statuses.mark_unchanged();

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let latest = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    if let Err(e) = print_snapshot(coordinator, &snapshot, global) {
                        break Err(e);
                    }
                }
            }

            changed = statuses.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let status = *statuses.borrow_and_update();
                match status {
                    UpdateStatus::AuthFailed => break Err(CliError::AuthFailed),
                    UpdateStatus::Failed => warn!("refresh failed, keeping last known state"),
                    UpdateStatus::Ok | UpdateStatus::Pending => {}
                }
            }
        }
    };

    coordinator.shutdown();
    scheduler.shutdown();
    result
}

fn print_snapshot(
    coordinator: &Coordinator,
    snapshot: &rtkey_core::Snapshot,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let entries = status::entries(coordinator, snapshot, None)?;
    if global.quiet {
        return Ok(());
    }
    let color = output::should_color(global.color);
    let stamp = Local::now().format("%H:%M:%S").to_string();
    eprintln!("{}", output::dim(&format!("-- {stamp}"), color));
    output::print_output(&status::render(&entries, global)?, false);
    Ok(())
}
