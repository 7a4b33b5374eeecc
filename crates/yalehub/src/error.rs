//! CLI error types with miette diagnostics.
//!
//! Maps `RefreshError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use yalehub_config::ConfigError;
use yalehub_core::RefreshError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Refresh ──────────────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(yalehub::auth_failed),
        help(
            "Verify the account credentials for profile '{profile}'.\n\
             Run: yalehub config set-password {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("Could not refresh panel state: {message}")]
    #[diagnostic(
        code(yalehub::refresh_failed),
        help("The Yale cloud may be unreachable or busy. Retry shortly, or raise --timeout.")
    )]
    RefreshFailed { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(yalehub::no_credentials),
        help(
            "Set `username` in the profile, then store the password with:\n\
             yalehub config set-password {profile}\n\
             Or set YALEHUB_USERNAME / YALEHUB_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(yalehub::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Config file: {path}"
        )
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(yalehub::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(yalehub::config))]
    Config(ConfigError),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::RefreshFailed { .. } => exit_code::CONNECTION,
            Self::ProfileNotFound { .. } | Self::Validation { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to a refresh failure.
    pub fn from_refresh(err: RefreshError, profile: &str) -> Self {
        match err {
            RefreshError::AuthFailure { message } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            RefreshError::TransientFailure { message } => Self::RefreshFailed { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => Self::ProfileNotFound {
                name,
                available,
                path: yalehub_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_errors_map_to_exit_codes() {
        let auth = CliError::from_refresh(
            RefreshError::AuthFailure {
                message: "login failed (HTTP 401)".into(),
            },
            "home",
        );
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let transient = CliError::from_refresh(
            RefreshError::TransientFailure {
                message: "HTTP 502: bad gateway".into(),
            },
            "home",
        );
        assert_eq!(transient.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn config_errors_map_to_exit_codes() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "home".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err = CliError::from(ConfigError::Validation {
            field: "poll_interval".into(),
            reason: "must be at least 1 second".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
