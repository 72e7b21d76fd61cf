//! `rtkey login` -- validate a bearer token and store it.
//!
//! First login writes the token and update interval; later logins only
//! replace the token unless `--interval` is given.

use secrecy::SecretString;

use rtkey_config::FileConfigStore;
use rtkey_core::{CONF_BEARER_TOKEN, ConfigStore, reauthenticate, setup};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config;
use crate::error::CliError;

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn read_token(global: &GlobalOpts) -> Result<String, CliError> {
    if let Some(token) = global.token.as_deref().filter(|t| !t.trim().is_empty()) {
        return Ok(token.trim().to_owned());
    }

    let token = rpassword::prompt_password("Bearer token: ").map_err(prompt_err)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token.to_owned())
}

pub async fn handle(args: &LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let token = SecretString::from(read_token(global)?);
    let core = rtkey_config::to_coordinator_config(&cfg, token)?;

    let path = config::config_path();
    let store = if args.plaintext {
        FileConfigStore::plaintext(&path)
    } else {
        FileConfigStore::new(&path)
    };

    let existing = store
        .get(CONF_BEARER_TOKEN)?
        .is_some_and(|t| !t.trim().is_empty());

    if existing && global.interval.is_none() {
        reauthenticate(&store, &core).await?;
        if !global.quiet {
            eprintln!("✓ Bearer token replaced ({})", path.display());
        }
    } else {
        setup(&store, &core).await?;
        if !global.quiet {
            eprintln!(
                "✓ Logged in, refreshing every {} ({})",
                core.update_interval,
                path.display()
            );
        }
    }
    Ok(())
}
