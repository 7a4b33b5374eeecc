// Yale cloud API HTTP client
//
// Wraps `reqwest::Client` with base-URL path joining, bearer-token
// injection and envelope unwrapping. Endpoint methods live in `panel.rs`
// and the token login flow in `auth.rs` to keep this module focused on
// transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ApiResponse;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://mob.yalehomesystem.co.uk/yapi";

/// Authenticated HTTP client for the Yale cloud API.
///
/// Holding a `YaleClient` means holding a session: it is only obtainable
/// through [`login()`](Self::login) (or [`with_client()`](Self::with_client)
/// when a token is already known). All data methods return unwrapped `data`
/// payloads -- the envelope is stripped before the caller sees it.
pub struct YaleClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: SecretString,
}

impl std::fmt::Debug for YaleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YaleClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl YaleClient {
    /// Create a client around an existing access token.
    pub fn with_client(http: reqwest::Client, base_url: Url, access_token: SecretString) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path relative to the base URL.
    ///
    /// The base URL carries a path prefix (`/yapi`), so `Url::join` with
    /// an absolute path would drop it; paths are appended instead.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        endpoint_url(&self.base_url, path)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_envelope(resp).await
    }
}

pub(crate) fn endpoint_url(base_url: &Url, path: &str) -> Result<Url, Error> {
    let full = format!(
        "{}/{}",
        base_url.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&full)?)
}

/// Parse the `{ result, message, data }` envelope, returning `data` on
/// success or an `Error::Api` if `result` is `false`.
async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::SessionExpired);
    }

    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            body,
        });
    }

    let envelope: ApiResponse<serde_json::Value> =
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })?;

    if envelope.result == Some(false) {
        return Err(Error::Api {
            message: envelope
                .message
                .unwrap_or_else(|| "request rejected".into()),
        });
    }

    serde_json::from_value(envelope.data).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}
