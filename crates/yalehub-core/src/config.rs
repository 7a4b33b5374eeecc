// ── Runtime panel configuration ──
//
// Describes *how* to reach a Yale panel and how to interpret its data.
// Carries credentials and tuning but never touches disk. The CLI builds a
// `PanelConfig` from its profile and hands it in.

use std::time::Duration;

use chrono::TimeDelta;
use secrecy::SecretString;
use url::Url;

pub use yalehub_api::DEFAULT_BASE_URL;
use yalehub_api::{Credentials, TransportConfig};

use crate::model::HistoryTrigger;
use crate::model::smoke::{DEFAULT_SMOKE_OFF_EVENT, DEFAULT_SMOKE_ON_EVENT};
use crate::normalize::{DEFAULT_SMOKE_WINDOW_MINUTES, NormalizeSettings};

/// Default seconds between poll cycles.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Configuration for one Yale account/panel.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// API root, e.g. `https://mob.yalehomesystem.co.uk/yapi`.
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    /// Pre-encoded `client_id:client_secret` sent as basic auth on the
    /// token endpoint. The production cloud refuses password-grant logins
    /// without it, so leaving it unset there fails as an auth failure.
    pub client_token: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Seconds between background poll cycles.
    pub poll_interval_secs: u64,
    /// Trailing history window for smoke events.
    pub smoke_window_minutes: u32,
    pub smoke_on_event: String,
    pub smoke_off_event: String,
}

impl PanelConfig {
    /// Config for one account with default tuning.
    pub fn new(base_url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url,
            username: username.into(),
            password,
            client_token: None,
            timeout: Duration::from_secs(30),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            smoke_window_minutes: DEFAULT_SMOKE_WINDOW_MINUTES,
            smoke_on_event: DEFAULT_SMOKE_ON_EVENT.into(),
            smoke_off_event: DEFAULT_SMOKE_OFF_EVENT.into(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
            client_token: self.client_token.clone(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
        }
    }

    pub fn normalize_settings(&self) -> NormalizeSettings {
        NormalizeSettings {
            smoke_window: TimeDelta::minutes(i64::from(self.smoke_window_minutes)),
            smoke_events: HistoryTrigger {
                on_event: self.smoke_on_event.clone(),
                off_event: self.smoke_off_event.clone(),
            },
        }
    }

    /// Poll period, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn panel() -> PanelConfig {
        PanelConfig::new(
            DEFAULT_BASE_URL.parse().unwrap(),
            "user@example.com",
            SecretString::from("secret".to_string()),
        )
    }

    #[test]
    fn defaults_match_cloud_and_normalizer() {
        let config = panel();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.normalize_settings(), NormalizeSettings::default());
        assert!(config.credentials().client_token.is_none());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = PanelConfig {
            poll_interval_secs: 0,
            ..panel()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }
}
