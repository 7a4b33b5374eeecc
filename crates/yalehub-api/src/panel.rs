// Panel endpoints
//
// Arm mode, device cycle, status, connectivity, panel info, event history
// and token check. `get_all` gathers the bundle the refresh cycle needs.

use tracing::debug;

use crate::client::YaleClient;
use crate::error::Error;
use crate::models::{AllData, ArmStatus, AuthCheck, Cycle, HistoryEvent, ModeEntry};

impl YaleClient {
    /// Current arm mode of the panel.
    ///
    /// `GET /api/panel/mode/` -- the first area's mode is reported.
    pub async fn get_armed_status(&self) -> Result<ArmStatus, Error> {
        debug!("fetching panel mode");
        let modes: Vec<ModeEntry> = self.get("api/panel/mode/").await?;
        modes
            .into_iter()
            .next()
            .map(|entry| entry.mode)
            .ok_or_else(|| Error::Api {
                message: "panel reported no arm mode".into(),
            })
    }

    /// Device cycle: per-device status records.
    ///
    /// `GET /api/panel/cycle/`
    pub async fn get_cycle(&self) -> Result<Cycle, Error> {
        debug!("fetching device cycle");
        self.get("api/panel/cycle/").await
    }

    /// Overall panel status.
    ///
    /// `GET /api/panel/status/`
    pub async fn get_status(&self) -> Result<serde_json::Value, Error> {
        self.get("api/panel/status/").await
    }

    /// Panel connectivity.
    ///
    /// `GET /api/panel/online/`
    pub async fn get_online(&self) -> Result<serde_json::Value, Error> {
        self.get("api/panel/online/").await
    }

    /// Panel hardware/firmware information.
    ///
    /// `GET /api/panel/info/`
    pub async fn get_panel_info(&self) -> Result<serde_json::Value, Error> {
        self.get("api/panel/info/").await
    }

    /// First page of the event report, newest first.
    ///
    /// `GET /api/event/report/?page_num=1&set_utc=1`
    pub async fn get_history(&self) -> Result<Vec<HistoryEvent>, Error> {
        debug!("fetching event history");
        self.get("api/event/report/?page_num=1&set_utc=1").await
    }

    /// Token check; carries the server-side `token_time`.
    ///
    /// `GET /api/auth/check/`
    pub async fn get_auth_check(&self) -> Result<AuthCheck, Error> {
        self.get("api/auth/check/").await
    }

    /// Fetch cycle, status, online flag, panel info, history and auth check
    /// concurrently. Fails on the first error in declaration order.
    pub async fn get_all(&self) -> Result<AllData, Error> {
        let (cycle, status, online, panel_info, history, auth_check) = tokio::join!(
            self.get_cycle(),
            self.get_status(),
            self.get_online(),
            self.get_panel_info(),
            self.get_history(),
            self.get_auth_check(),
        );

        Ok(AllData {
            cycle: cycle?,
            status: status?,
            online: online?,
            panel_info: panel_info?,
            history: history?,
            auth_check: auth_check?,
        })
    }
}
