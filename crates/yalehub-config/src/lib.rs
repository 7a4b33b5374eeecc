//! Shared configuration for yalehub.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `yalehub_core::PanelConfig`. The core crate never
//! reads files; it receives a pre-built `PanelConfig`.

use std::collections::HashMap;
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

use yalehub_core::PanelConfig;
use yalehub_core::config::{DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL_SECS};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "yalehub";

/// Environment variable consulted first for the account password.
pub const PASSWORD_ENV: &str = "YALEHUB_PASSWORD";

/// Environment variable consulted when a profile has no username.
pub const USERNAME_ENV: &str = "YALEHUB_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring access failed: {0}")]
    Keyring(#[from] keyring::Error),

}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, listing the known names on failure.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }

    fn profile_names(&self) -> String {
        if self.profiles.is_empty() {
            return "(none)".into();
        }
        let mut names: Vec<_> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

/// A named Yale account profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Account e-mail.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// API root override.
    pub base_url: Option<String>,

    /// Pre-encoded `client_id:client_secret` for basic auth on the token
    /// endpoint. Required by the production cloud: without it every login
    /// is refused and reported as an authentication failure.
    pub client_token: Option<String>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override poll interval (seconds).
    pub poll_interval: Option<u64>,

    /// Smoke history window (minutes).
    pub smoke_window: Option<u32>,

    /// History event code that marks a smoke alarm.
    pub smoke_on_event: Option<String>,

    /// History event code that marks a smoke restore.
    pub smoke_off_event: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "yalehub", "yalehub").map_or_else(
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
    p.push("yalehub");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` layered over defaults, then `YALEHUB_*` env.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("YALEHUB_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Resolve the password: env var, then system keyring, then plaintext.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve username + password for a profile.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = resolve_password(profile, profile_name)?;
    Ok((username, password))
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

// ── Profile → PanelConfig ───────────────────────────────────────────

/// Build a `PanelConfig` from a profile, resolving credentials.
pub fn profile_to_panel_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<PanelConfig, ConfigError> {
    let (username, password) = resolve_credentials(profile, profile_name)?;
    build_panel_config(profile, defaults, username, password)
}

/// Validate a profile and combine it with already-resolved credentials.
pub fn build_panel_config(
    profile: &Profile,
    defaults: &Defaults,
    username: String,
    password: SecretString,
) -> Result<PanelConfig, ConfigError> {
    let raw_url = profile.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let base_url = raw_url.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw_url}"),
    })?;
    let base = PanelConfig::new(base_url, username, password);

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let poll_interval_secs = profile.poll_interval.unwrap_or(defaults.poll_interval);
    if poll_interval_secs == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let smoke_window_minutes = profile.smoke_window.unwrap_or(base.smoke_window_minutes);
    if smoke_window_minutes == 0 {
        return Err(ConfigError::Validation {
            field: "smoke_window".into(),
            reason: "must be at least 1 minute".into(),
        });
    }

    Ok(PanelConfig {
        client_token: profile
            .client_token
            .as_ref()
            .map(|t| SecretString::from(t.clone())),
        timeout: Duration::from_secs(timeout),
        poll_interval_secs,
        smoke_window_minutes,
        smoke_on_event: profile
            .smoke_on_event
            .clone()
            .unwrap_or(base.smoke_on_event),
        smoke_off_event: profile
            .smoke_off_event
            .clone()
            .unwrap_or(base.smoke_off_event),
        ..base
    })
}
