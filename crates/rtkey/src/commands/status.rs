//! `rtkey status` and the status rendering shared with `open` and `watch`.

use chrono::Local;
use serde::Serialize;
use tabled::Tabled;

use rtkey_core::presentation::{self, NEVER_OPENED};
use rtkey_core::{Coordinator, SensorAttributes, Snapshot};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

/// One device's last-open sensor, rendered in local time.
#[derive(Debug, Serialize)]
pub struct StatusEntry {
    pub device_id: String,
    pub name: String,
    pub state: String,
    pub available: bool,
    pub attributes: SensorAttributes,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Last opening")]
    state: String,
    #[tabled(rename = "Opened via")]
    via: String,
}

impl StatusRow {
    fn new(entry: &StatusEntry, color: bool) -> Self {
        let state = if entry.state == NEVER_OPENED {
            output::dim(&entry.state, color)
        } else {
            entry.state.clone()
        };
        Self {
            id: entry.device_id.clone(),
            name: entry.name.clone(),
            state,
            via: entry
                .attributes
                .user_agent
                .clone()
                .unwrap_or_else(|| "-".into()),
        }
    }
}

/// Sensor entries for `snapshot`, optionally narrowed to one device.
pub fn entries(
    coordinator: &Coordinator,
    snapshot: &Snapshot,
    only: Option<&str>,
) -> Result<Vec<StatusEntry>, CliError> {
    if let Some(id) = only {
        if snapshot.device(id).is_none() {
            return Err(CliError::NotFound {
                device_id: id.to_owned(),
            });
        }
    }

    Ok(presentation::sensors(snapshot)
        .into_iter()
        .filter(|sensor| only.is_none_or(|id| sensor.device_id == id))
        .map(|sensor| StatusEntry {
            state: sensor.state(snapshot, &Local),
            attributes: sensor.attributes(snapshot, &Local),
            available: sensor.available(coordinator),
            device_id: sensor.device_id,
            name: sensor.name,
        })
        .collect())
}

pub fn render(entries: &[StatusEntry], global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(global.color);
    output::render_list(
        global.output,
        entries,
        |e| StatusRow::new(e, color),
        |e| format!("{}\t{}", e.device_id, e.state),
    )
}

pub async fn handle(
    coordinator: &Coordinator,
    args: &StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = coordinator.first_refresh().await?;
    if !snapshot.events_available {
        tracing::warn!("event history unavailable, showing devices only");
    }
    let entries = entries(coordinator, &snapshot, args.device_id.as_deref())?;
    output::print_output(&render(&entries, global)?, global.quiet);
    Ok(())
}
