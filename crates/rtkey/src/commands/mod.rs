//! Command dispatch: bridges CLI args -> coordinator calls -> output.

pub mod config_cmd;
pub mod devices;
pub mod login;
pub mod open;
pub mod status;
pub mod watch;

use rtkey_core::Coordinator;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that needs a configured coordinator.
pub async fn dispatch(
    cmd: Command,
    coordinator: &Coordinator,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices => devices::handle(coordinator, global).await,
        Command::Status(args) => status::handle(coordinator, &args, global).await,
        Command::Open(args) => open::handle(coordinator, &args, global).await,
        Command::Watch => watch::handle(coordinator, global).await,
        Command::Config(_) | Command::Completions(_) | Command::Login(_) => {
            unreachable!("handled before dispatch")
        }
    }
}
