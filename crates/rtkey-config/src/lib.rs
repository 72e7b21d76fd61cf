//! Configuration for the rtkey command-line host.
//!
//! TOML file + `RTKEY_` environment overrides, bearer-token resolution
//! (flag, env, keyring, plaintext), translation to
//! `rtkey_core::CoordinatorConfig`, and a file-backed
//! `rtkey_core::ConfigStore`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rtkey_core::{
    CONF_BEARER_TOKEN, CONF_UPDATE_INTERVAL, ConfigStore, CoordinatorConfig, StoreError,
    UpdateInterval,
};

/// Keyring service name; the token is stored under [`KEYRING_USER`].
pub const KEYRING_SERVICE: &str = "rtkey";
pub const KEYRING_USER: &str = "bearer-token";

/// Environment variable holding the token, checked after `token_env`.
pub const TOKEN_ENV: &str = "RTKEY_TOKEN";
/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "RTKEY_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no bearer token configured (use --token, {TOKEN_ENV}, or `rtkey login`)")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Bearer token (plaintext -- prefer the keyring or an env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Name of an environment variable holding the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Minutes between refreshes in `watch` mode (1-1440).
    #[serde(default = "default_update_interval")]
    pub update_interval: u32,

    #[serde(default = "default_household_url")]
    pub household_url: String,

    #[serde(default = "default_events_url")]
    pub events_url: String,

    /// Device listing and open timeout, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Event listing timeout, in seconds.
    #[serde(default = "default_events_timeout")]
    pub events_timeout: u64,

    /// Days of event history to request.
    #[serde(default = "default_event_window_days")]
    pub event_window_days: u32,

    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            token_env: None,
            update_interval: default_update_interval(),
            household_url: default_household_url(),
            events_url: default_events_url(),
            request_timeout: default_request_timeout(),
            events_timeout: default_events_timeout(),
            event_window_days: default_event_window_days(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_update_interval() -> u32 {
    UpdateInterval::DEFAULT.minutes()
}
fn default_household_url() -> String {
    rtkey_api::DEFAULT_HOUSEHOLD_URL.into()
}
fn default_events_url() -> String {
    rtkey_api::DEFAULT_EVENTS_URL.into()
}
fn default_request_timeout() -> u64 {
    rtkey_api::DEFAULT_REQUEST_TIMEOUT.as_secs()
}
fn default_events_timeout() -> u64 {
    rtkey_api::DEFAULT_EVENTS_TIMEOUT.as_secs()
}
fn default_event_window_days() -> u32 {
    7
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Config {
    /// A copy safe to print: the plaintext token is masked.
    pub fn redacted(&self) -> Self {
        Self {
            token: self.token.as_ref().map(|_| "********".into()),
            ..self.clone()
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `RTKEY_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("ru", "rtkey", "rtkey").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("rtkey");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file = defaults), then apply `RTKEY_*` env
/// overrides. The token itself is never taken from the env layer here;
/// [`resolve_token`] handles `RTKEY_TOKEN` at its place in the chain.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RTKEY_").ignore(&["token", "config"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Read only the file layer (no env), for read-modify-write updates.
fn read_file(path: &Path) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(toml::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the bearer token: explicit flag, `token_env`, `RTKEY_TOKEN`,
/// system keyring, then plaintext `token`.
pub fn resolve_token(cfg: &Config, flag: Option<&str>) -> Result<SecretString, ConfigError> {
    resolve_token_from(cfg, flag, |name| std::env::var(name).ok(), keyring_token)
}

/// [`resolve_token`] with the environment and keyring lookups supplied by
/// the caller.
pub fn resolve_token_from(
    cfg: &Config,
    flag: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let non_blank = |s: String| (!s.trim().is_empty()).then_some(s);

    // 1. Explicit flag
    if let Some(token) = flag.map(str::to_owned).and_then(non_blank) {
        return Ok(SecretString::from(token));
    }

    // 2. Config's token_env → env var lookup
    if let Some(token) = cfg.token_env.as_deref().and_then(&env).and_then(non_blank) {
        return Ok(SecretString::from(token));
    }

    // 3. RTKEY_TOKEN
    if let Some(token) = env(TOKEN_ENV).and_then(non_blank) {
        return Ok(SecretString::from(token));
    }

    // 4. System keyring
    if let Some(token) = keyring().and_then(non_blank) {
        return Ok(SecretString::from(token));
    }

    // 5. Plaintext in config
    cfg.token
        .clone()
        .and_then(non_blank)
        .map(SecretString::from)
        .ok_or(ConfigError::NoCredentials)
}

fn keyring_entry() -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?)
}

/// Token from the system keyring, if one is stored and reachable.
pub fn keyring_token() -> Option<String> {
    keyring_entry().ok()?.get_password().ok()
}

pub fn store_keyring_token(token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry()?.set_password(token.expose_secret())?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `CoordinatorConfig` from file settings and a resolved token.
pub fn to_coordinator_config(
    cfg: &Config,
    token: SecretString,
) -> Result<CoordinatorConfig, ConfigError> {
    let update_interval =
        UpdateInterval::new(cfg.update_interval).map_err(|e| ConfigError::Validation {
            field: "update_interval".into(),
            reason: e.to_string(),
        })?;

    for (field, value) in [("household_url", &cfg.household_url), ("events_url", &cfg.events_url)] {
        url::Url::parse(value).map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("{e}: {value}"),
        })?;
    }

    if cfg.event_window_days == 0 {
        return Err(ConfigError::Validation {
            field: "event_window_days".into(),
            reason: "must be at least 1".into(),
        });
    }

    let mut core = CoordinatorConfig::new(token)
        .with_endpoints(cfg.household_url.clone(), cfg.events_url.clone())
        .with_update_interval(update_interval);
    core.request_timeout = Duration::from_secs(cfg.request_timeout);
    core.events_timeout = Duration::from_secs(cfg.events_timeout);
    core.event_window = chrono::Duration::days(i64::from(cfg.event_window_days));
    Ok(core)
}

// ── File-backed ConfigStore ─────────────────────────────────────────

/// `ConfigStore` over the TOML config file, with the token optionally
/// kept in the system keyring instead of the file.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
    use_keyring: bool,
}

impl FileConfigStore {
    /// Store at `path`, preferring the keyring for the token.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_keyring: true,
        }
    }

    /// Store at `path` that keeps the token in the file.
    pub fn plaintext(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_keyring: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Config, StoreError> {
        read_file(&self.path).map_err(backend)
    }

    fn write(&self, cfg: &Config) -> Result<(), StoreError> {
        save_config_to(cfg, &self.path).map_err(backend)
    }
}

fn backend(err: ConfigError) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn unsupported(key: &str) -> StoreError {
    StoreError::Backend(format!("unsupported key: {key}"))
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match key {
            CONF_BEARER_TOKEN => {
                if self.use_keyring {
                    if let Some(token) = keyring_token() {
                        return Ok(Some(token));
                    }
                }
                Ok(self.read()?.token)
            }
            CONF_UPDATE_INTERVAL => Ok(Some(self.read()?.update_interval.to_string())),
            other => Err(unsupported(other)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut cfg = self.read()?;
        match key {
            CONF_BEARER_TOKEN => {
                let secret = SecretString::from(value.to_owned());
                if self.use_keyring && store_keyring_token(&secret).is_ok() {
                    cfg.token = None;
                } else {
                    cfg.token = Some(value.to_owned());
                }
            }
            CONF_UPDATE_INTERVAL => {
                cfg.update_interval = value.trim().parse().map_err(|_| StoreError::Invalid {
                    key: CONF_UPDATE_INTERVAL,
                    message: format!("not a number: {value}"),
                })?;
            }
            other => return Err(unsupported(other)),
        }
        self.write(&cfg)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut cfg = self.read()?;
        match key {
            CONF_BEARER_TOKEN => {
                if self.use_keyring {
                    if let Ok(entry) = keyring_entry() {
                        let _ = entry.delete_credential();
                    }
                }
                cfg.token = None;
            }
            CONF_UPDATE_INTERVAL => cfg.update_interval = default_update_interval(),
            other => return Err(unsupported(other)),
        }
        self.write(&cfg)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn resolved(cfg: &Config, flag: Option<&str>, env: &[(&str, &str)], keyring: Option<&str>) -> Option<String> {
        let keyring = keyring.map(str::to_owned);
        resolve_token_from(cfg, flag, env_of(env), move || keyring)
            .ok()
            .map(|s| s.expose_secret().to_owned())
    }

    #[test]
    fn token_chain_precedence() {
        let cfg = Config {
            token: Some("plain".into()),
            token_env: Some("MY_TOKEN".into()),
            ..Config::default()
        };
        let env = [("MY_TOKEN", "custom-env"), ("RTKEY_TOKEN", "rtkey-env")];

        assert_eq!(resolved(&cfg, Some("flag"), &env, Some("ring")).as_deref(), Some("flag"));
        assert_eq!(resolved(&cfg, None, &env, Some("ring")).as_deref(), Some("custom-env"));
        assert_eq!(resolved(&cfg, None, &env[1..], Some("ring")).as_deref(), Some("rtkey-env"));
        assert_eq!(resolved(&cfg, None, &[], Some("ring")).as_deref(), Some("ring"));
        assert_eq!(resolved(&cfg, None, &[], None).as_deref(), Some("plain"));
    }

    #[test]
    fn blank_values_are_skipped() {
        let cfg = Config {
            token: Some("plain".into()),
            ..Config::default()
        };
        assert_eq!(resolved(&cfg, Some("  "), &[("RTKEY_TOKEN", "")], Some("")).as_deref(), Some("plain"));
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = resolve_token_from(&Config::default(), None, |_| None, || None).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.update_interval, 5);
        assert_eq!(cfg.household_url, rtkey_api::DEFAULT_HOUSEHOLD_URL);
        assert_eq!(cfg.defaults.output, "table");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "update_interval = 30\nevents_timeout = 20\n\n[defaults]\noutput = \"json\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.update_interval, 30);
        assert_eq!(cfg.events_timeout, 20);
        assert_eq!(cfg.request_timeout, 10);
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            token_env: Some("HOME_TOKEN".into()),
            update_interval: 42,
            ..Config::default()
        };
        save_config_to(&cfg, &path).unwrap();
        assert_eq!(read_file(&path).unwrap(), cfg);
    }

    #[test]
    fn coordinator_config_translation() {
        let cfg = Config {
            update_interval: 15,
            events_timeout: 30,
            event_window_days: 3,
            ..Config::default()
        };
        let core = to_coordinator_config(&cfg, SecretString::from("t")).unwrap();
        assert_eq!(core.update_interval.minutes(), 15);
        assert_eq!(core.events_timeout, Duration::from_secs(30));
        assert_eq!(core.request_timeout, Duration::from_secs(10));
        assert_eq!(core.event_window, chrono::Duration::days(3));
        assert_eq!(core.token.expose_secret(), "t");
    }

    #[test]
    fn coordinator_config_validation() {
        let bad_interval = Config {
            update_interval: 0,
            ..Config::default()
        };
        assert!(matches!(
            to_coordinator_config(&bad_interval, SecretString::from("t")),
            Err(ConfigError::Validation { field, .. }) if field == "update_interval"
        ));

        let bad_url = Config {
            events_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            to_coordinator_config(&bad_url, SecretString::from("t")),
            Err(ConfigError::Validation { field, .. }) if field == "events_url"
        ));
    }

    #[test]
    fn redacted_hides_token() {
        let cfg = Config {
            token: Some("secret".into()),
            ..Config::default()
        };
        assert_eq!(cfg.redacted().token.as_deref(), Some("********"));
        assert_eq!(Config::default().redacted().token, None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::plaintext(dir.path().join("config.toml"));

        assert_eq!(store.get(CONF_BEARER_TOKEN).unwrap(), None);
        assert_eq!(store.get(CONF_UPDATE_INTERVAL).unwrap().as_deref(), Some("5"));

        store.set(CONF_BEARER_TOKEN, "abc").unwrap();
        store.set(CONF_UPDATE_INTERVAL, "20").unwrap();
        assert_eq!(store.get(CONF_BEARER_TOKEN).unwrap().as_deref(), Some("abc"));

        let core = CoordinatorConfig::from_store(&store).unwrap();
        assert_eq!(core.update_interval.minutes(), 20);

        store.remove(CONF_BEARER_TOKEN).unwrap();
        assert_eq!(store.get(CONF_BEARER_TOKEN).unwrap(), None);
    }

    #[test]
    fn file_store_rejects_unknown_keys_and_bad_interval() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::plaintext(dir.path().join("config.toml"));
        assert!(store.get("color").is_err());
        assert!(matches!(
            store.set(CONF_UPDATE_INTERVAL, "soon"),
            Err(StoreError::Invalid { .. })
        ));
    }
}
