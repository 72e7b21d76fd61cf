//! CLI configuration -- thin layer over `rtkey_config` that applies the
//! `--token` and `--interval` flags.

use rtkey_config::Config;
use rtkey_core::{Coordinator, CoordinatorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use rtkey_config::config_path;

/// File + environment config with `--interval` applied.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = rtkey_config::load_config()?;
    if let Some(interval) = global.interval {
        cfg.update_interval = interval;
    }
    Ok(cfg)
}

/// Resolve the token through the full chain and build a core config.
pub fn coordinator_config(global: &GlobalOpts) -> Result<CoordinatorConfig, CliError> {
    let cfg = load(global)?;
    let token = rtkey_config::resolve_token(&cfg, global.token.as_deref())?;
    Ok(rtkey_config::to_coordinator_config(&cfg, token)?)
}

pub fn coordinator(global: &GlobalOpts) -> Result<Coordinator, CliError> {
    Ok(Coordinator::new(coordinator_config(global)?)?)
}
