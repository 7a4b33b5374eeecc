// ── Core error types ──
//
// Refresh failures reach consumers as exactly one of two kinds. The
// `From<yalehub_api::Error>` impl decides which; device-level data problems
// found by the normalizer always fail the whole cycle as transient.

use thiserror::Error;

/// Outcome of a failed refresh cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// Credentials or session rejected. Not retried automatically; the
    /// caller must re-authenticate.
    #[error("Authentication failed: {message}")]
    AuthFailure { message: String },

    /// Any other failure. The next scheduled cycle may succeed.
    #[error("Refresh failed: {message}")]
    TransientFailure { message: String },
}

impl RefreshError {
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::AuthFailure { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFailure { .. })
    }

    pub(crate) fn transient(message: impl Into<String>) -> Self {
        Self::TransientFailure {
            message: message.into(),
        }
    }
}

/// Malformed device or history data found while normalizing a bundle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("lock {address}: invalid status bitmask '{value}'")]
    InvalidLockStatus { address: String, value: String },

    #[error("temperature sensor {address}: invalid reading {value}")]
    InvalidTemperature { address: String, value: String },

    #[error("history entry has invalid timestamp '{value}'")]
    InvalidHistoryTime { value: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<yalehub_api::Error> for RefreshError {
    fn from(err: yalehub_api::Error) -> Self {
        let auth = err.is_auth_expired();
        let message = match err {
            yalehub_api::Error::Authentication { message } => message,
            yalehub_api::Error::Transport(ref e) if e.is_timeout() => {
                format!("request timed out: {e}")
            }
            yalehub_api::Error::Transport(ref e) if e.is_connect() => {
                format!("cannot connect to Yale cloud: {e}")
            }
            yalehub_api::Error::InvalidUrl(e) => format!("invalid URL: {e}"),
            yalehub_api::Error::Api { message } => message,
            yalehub_api::Error::Deserialization { message, body: _ } => {
                format!("unexpected response: {message}")
            }
            other => other.to_string(),
        };

        if auth {
            Self::AuthFailure { message }
        } else {
            Self::TransientFailure { message }
        }
    }
}

impl From<NormalizeError> for RefreshError {
    fn from(err: NormalizeError) -> Self {
        Self::transient(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_are_not_retryable() {
        let err = RefreshError::from(yalehub_api::Error::Authentication {
            message: "bad password".into(),
        });
        assert!(err.requires_reauth());
        assert!(!err.is_retryable());

        let err = RefreshError::from(yalehub_api::Error::SessionExpired);
        assert!(err.requires_reauth());
    }

    #[test]
    fn everything_else_is_transient() {
        let err = RefreshError::from(yalehub_api::Error::Http {
            status: 502,
            body: "bad gateway".into(),
        });
        assert_eq!(
            err,
            RefreshError::TransientFailure {
                message: "HTTP 502: bad gateway".into()
            }
        );

        let err = RefreshError::from(yalehub_api::Error::Api {
            message: "panel offline".into(),
        });
        assert!(err.is_retryable());

        let err = RefreshError::from(NormalizeError::InvalidTemperature {
            address: "RF:02".into(),
            value: "\"warm\"".into(),
        });
        assert!(err.is_retryable());
    }
}
