//! CLI glue over `yalehub-config`: active-profile selection and flag
//! overrides on top of the resolved `PanelConfig`.

use std::time::Duration;

use yalehub_config::{Config, Profile, USERNAME_ENV};
use yalehub_core::PanelConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Profile selected by `--profile`, then the config default, then "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Resolve the active profile into a `PanelConfig`, applying CLI overrides.
///
/// Without a matching profile, credentials may still come entirely from
/// `YALEHUB_USERNAME` / `YALEHUB_PASSWORD`.
pub fn build_panel_config(global: &GlobalOpts) -> Result<(String, PanelConfig), CliError> {
    let cfg = yalehub_config::load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let env_only = Profile::default();
    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile,
        None if std::env::var_os(USERNAME_ENV).is_some() => &env_only,
        None => cfg.profile(&profile_name)?,
    };

    let mut panel = yalehub_config::profile_to_panel_config(profile, &profile_name, &cfg.defaults)?;

    if let Some(secs) = global.timeout {
        panel.timeout = validated_secs("timeout", secs)?;
    }

    Ok((profile_name, panel))
}

/// Reject zero-second overrides.
pub fn validated_secs(field: &str, secs: u64) -> Result<Duration, CliError> {
    if secs == 0 {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}
