// ── Setup and re-authentication ──
//
// Both flows make the same validation call (one device listing) and then
// write to the host's `ConfigStore`.

use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::config::CoordinatorConfig;
use crate::error::SetupError;
use crate::store::{CONF_BEARER_TOKEN, CONF_UPDATE_INTERVAL, ConfigStore};

/// Check that `config.token` is accepted by the household API.
///
/// Only a 200 is success, whatever its body. 401 is
/// [`SetupError::InvalidAuth`]; any other status or a transport failure is
/// [`SetupError::CannotConnect`].
pub async fn validate_token(config: &CoordinatorConfig) -> Result<(), SetupError> {
    let client = rtkey_api::RtkeyClient::new(
        &config.household_url,
        &config.events_url,
        &config.token,
        config.transport(),
    )?;

    match client.device_listing_status().await?.as_u16() {
        200 => Ok(()),
        401 => Err(SetupError::InvalidAuth),
        status => {
            debug!(status, "token validation got unexpected status");
            Err(SetupError::CannotConnect(format!("HTTP {status}")))
        }
    }
}

/// Initial setup: validate, then persist the token and update interval.
pub async fn setup(store: &dyn ConfigStore, config: &CoordinatorConfig) -> Result<(), SetupError> {
    validate_token(config).await?;
    store.set(CONF_BEARER_TOKEN, config.token.expose_secret())?;
    store.set(CONF_UPDATE_INTERVAL, &config.update_interval.minutes().to_string())?;
    info!(interval = %config.update_interval, "setup complete");
    Ok(())
}

/// Replace the stored token after validating it. The interval is left
/// untouched.
pub async fn reauthenticate(store: &dyn ConfigStore, config: &CoordinatorConfig) -> Result<(), SetupError> {
    validate_token(config).await?;
    store.set(CONF_BEARER_TOKEN, config.token.expose_secret())?;
    info!("bearer token replaced");
    Ok(())
}
