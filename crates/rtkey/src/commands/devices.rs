//! `rtkey devices`

use tabled::Tabled;

use rtkey_core::{Coordinator, Device};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Open")]
    actionable: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Serial")]
    serial: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.clone(),
            name: d.display_name.clone(),
            dtype: d.model_label().to_owned(),
            actionable: if d.is_actionable() { "yes" } else { "no" }.into(),
            firmware: d.firmware_version.clone().unwrap_or_else(|| "-".into()),
            serial: d.serial_number.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

fn plain_line(d: &Device) -> String {
    format!("{}\t{}\t{}", d.id, d.device_type, d.display_name)
}

pub async fn handle(coordinator: &Coordinator, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = coordinator.first_refresh().await?;
    let out = output::render_list(
        global.output,
        &snapshot.devices,
        |d| DeviceRow::from(d),
        plain_line,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
