//! Config subcommand handlers.

use std::fmt::Write;

use rtkey_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

fn detail(cfg: &Config) -> String {
    let mut out = String::new();
    if let Some(ref token) = cfg.token {
        let _ = writeln!(out, "token = \"{token}\"");
    }
    if let Some(ref env) = cfg.token_env {
        let _ = writeln!(out, "token_env = \"{env}\"");
    }
    let _ = writeln!(out, "update_interval = {}", cfg.update_interval);
    let _ = writeln!(out, "household_url = \"{}\"", cfg.household_url);
    let _ = writeln!(out, "events_url = \"{}\"", cfg.events_url);
    let _ = writeln!(out, "request_timeout = {}", cfg.request_timeout);
    let _ = writeln!(out, "events_timeout = {}", cfg.events_timeout);
    let _ = writeln!(out, "event_window_days = {}", cfg.event_window_days);
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = write!(out, "color = \"{}\"", cfg.defaults.color);
    out
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?.redacted();
            let out = output::render_single(global.output, &cfg, detail, detail)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
