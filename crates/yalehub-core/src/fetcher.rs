// ── Session-owning fetcher ──
//
// Holds the cloud session for one panel. The first fetch logs in; later
// fetches reuse the same session until `reauthenticate` or an auth failure
// drops it. A reused session whose token has expired is replaced by one
// fresh login before the cycle gives up.

use tracing::{debug, info};
use url::Url;

use yalehub_api::{Credentials, Error, TransportConfig, YaleClient};

use crate::config::PanelConfig;
use crate::error::RefreshError;
use crate::model::RawBundle;

/// Fetches raw panel data, classifying every failure as
/// [`RefreshError::AuthFailure`] or [`RefreshError::TransientFailure`].
#[derive(Debug)]
pub struct Fetcher {
    base_url: Url,
    credentials: Credentials,
    transport: TransportConfig,
    session: Option<YaleClient>,
}

impl Fetcher {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            credentials: config.credentials(),
            transport: config.transport(),
            session: None,
        }
    }

    /// Drop the current session, optionally replacing the credentials.
    /// The next [`fetch()`](Self::fetch) logs in again.
    pub fn reauthenticate(&mut self, credentials: Option<Credentials>) {
        if let Some(credentials) = credentials {
            self.credentials = credentials;
        }
        self.session = None;
        debug!("session cleared; next fetch will log in");
    }

    /// Run one fetch: arm status, the full data set and the server
    /// reference time.
    ///
    /// If a reused session is rejected the fetcher logs in once more and
    /// retries the cycle; only a refused login or a rejected fresh session
    /// surfaces as [`RefreshError::AuthFailure`]. An auth failure drops the
    /// session.
    pub async fn fetch(&mut self) -> Result<RawBundle, RefreshError> {
        let resumed = self.session.is_some();

        let result = match self.fetch_with_session().await {
            Err(Error::SessionExpired) if resumed => {
                self.session = None;
                info!("session token expired; logging in again");
                self.fetch_with_session().await
            }
            other => other,
        };

        if let Err(ref e) = result {
            if e.is_auth_expired() && self.session.take().is_some() {
                debug!("dropped rejected session");
            }
        }
        result.map_err(RefreshError::from)
    }

    async fn fetch_with_session(&mut self) -> Result<RawBundle, Error> {
        let client = self.session().await?;

        let (arm_status, data) = tokio::join!(client.get_armed_status(), client.get_all());
        let arm_status = arm_status?;
        let data = data?;
        let reference_time = data.auth_check.token_time()?;

        debug!(
            devices = data.cycle.device_status.len(),
            history = data.history.len(),
            %arm_status,
            "fetched panel data"
        );

        Ok(RawBundle::new(arm_status, data, reference_time))
    }

    async fn session(&mut self) -> Result<&YaleClient, Error> {
        let client = match self.session.take() {
            Some(client) => client,
            None => {
                let client =
                    YaleClient::login(self.base_url.clone(), &self.credentials, &self.transport)
                        .await?;
                info!(username = %self.credentials.username, "logged in to Yale cloud");
                client
            }
        };
        Ok(self.session.insert(client))
    }
}
