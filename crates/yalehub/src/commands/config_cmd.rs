//! Config subcommand handlers.

use secrecy::SecretString;
use serde::Serialize;

use yalehub_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

/// Config view with plaintext passwords masked.
#[derive(Debug, Serialize)]
struct RedactedConfig<'a> {
    default_profile: Option<&'a str>,
    defaults: &'a config::Defaults,
    profiles: Vec<RedactedProfile<'a>>,
}

#[derive(Debug, Serialize)]
struct RedactedProfile<'a> {
    name: &'a str,
    username: Option<&'a str>,
    password: Option<&'static str>,
    base_url: Option<&'a str>,
    timeout: Option<u64>,
    poll_interval: Option<u64>,
    smoke_window: Option<u32>,
    smoke_on_event: Option<&'a str>,
    smoke_off_event: Option<&'a str>,
}

impl<'a> RedactedConfig<'a> {
    fn new(cfg: &'a Config) -> Self {
        let mut profiles: Vec<_> = cfg
            .profiles
            .iter()
            .map(|(name, p)| RedactedProfile {
                name,
                username: p.username.as_deref(),
                password: p.password.as_ref().map(|_| "********"),
                base_url: p.base_url.as_deref(),
                timeout: p.timeout,
                poll_interval: p.poll_interval,
                smoke_window: p.smoke_window,
                smoke_on_event: p.smoke_on_event.as_deref(),
                smoke_off_event: p.smoke_off_event.as_deref(),
            })
            .collect();
        profiles.sort_by(|a, b| a.name.cmp(b.name));

        Self {
            default_profile: cfg.default_profile.as_deref(),
            defaults: &cfg.defaults,
            profiles,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let view = RedactedConfig::new(&cfg);
            let out = output::render_single(&global.output, &view, |v| format!("{v:#?}"));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { name } => {
            let cfg = config::load_config()?;
            let profile_name = name.unwrap_or_else(|| active_profile_name(global, &cfg));
            cfg.profile(&profile_name)?;

            let secret = rpassword::prompt_password("Password: ")?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            config::store_password(&profile_name, &SecretString::from(secret))?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
