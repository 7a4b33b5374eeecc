use thiserror::Error;

/// Top-level error type for the `yalehub-api` crate.
///
/// Covers every failure mode of the cloud API: authentication, transport,
/// HTTP status, the `{ result, message, data }` envelope, and payload decoding.
/// `yalehub-core` folds these into its two-kind refresh taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Access token was rejected on a data request.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status that is not an auth rejection.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── API ─────────────────────────────────────────────────────────
    /// The envelope reported `result: false`.
    #[error("Yale API error: {message}")]
    Api { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A timestamp field did not match the expected format.
    #[error("Invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl Error {
    /// Returns `true` if this error indicates the credentials or session
    /// were rejected and only re-authentication can resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }
}
