// Token authentication
//
// Password-grant login against `/o/token/`. A successful login yields a
// bearer token; the resulting `YaleClient` sends it on every request.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::client::{YaleClient, endpoint_url};
use crate::error::Error;
use crate::models::TokenResponse;
use crate::transport::TransportConfig;

const TOKEN_PATH: &str = "o/token/";

/// Account credentials for the Yale cloud.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    /// Pre-encoded `client_id:client_secret` sent as HTTP basic auth on the
    /// token request, when the deployment requires one.
    pub client_token: Option<SecretString>,
}

impl YaleClient {
    /// Authenticate with username/password and return a session client.
    ///
    /// HTTP 400/401/403 from the token endpoint mean the credentials were
    /// refused and map to [`Error::Authentication`]; anything else is a
    /// transport or server failure.
    pub async fn login(
        base_url: Url,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let url = endpoint_url(&base_url, TOKEN_PATH)?;

        debug!("requesting access token at {}", url);

        let form = [
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.expose_secret()),
        ];

        let mut request = http.post(url).form(&form);
        if let Some(ref client_token) = credentials.client_token {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", client_token.expose_secret()),
            );
        }

        let resp = request.send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if matches!(status.as_u16(), 400 | 401 | 403) {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        debug!(expires_in = ?token.expires_in, "login successful");
        Ok(Self::with_client(
            http,
            base_url,
            SecretString::from(token.access_token),
        ))
    }
}
