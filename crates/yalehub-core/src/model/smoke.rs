// ── Smoke detector state and history-window scan ──

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use strum::Display;

use yalehub_api::{Device, HistoryEvent};

use crate::error::NormalizeError;

/// Default smoke-alarm event code (Contact ID 111, new event).
pub const DEFAULT_SMOKE_ON_EVENT: &str = "1111";

/// Default smoke-restore event code (Contact ID 111, restore).
pub const DEFAULT_SMOKE_OFF_EVENT: &str = "3111";

/// Derived state of a smoke detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SmokeState {
    On,
    Off,
}

impl From<bool> for SmokeState {
    fn from(active: bool) -> Self {
        if active { Self::On } else { Self::Off }
    }
}

/// Pair of history event codes that switch a device on and off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTrigger {
    pub on_event: String,
    pub off_event: String,
}

impl Default for HistoryTrigger {
    fn default() -> Self {
        Self {
            on_event: DEFAULT_SMOKE_ON_EVENT.into(),
            off_event: DEFAULT_SMOKE_OFF_EVENT.into(),
        }
    }
}

impl HistoryTrigger {
    /// Whether `device` was switched on within `window` before `reference`.
    ///
    /// `history` must be newest first. The scan stops at the first entry
    /// older than the window, or at the first on/off event for the device's
    /// (type, area); an off event nearer to `reference` than any on event
    /// wins. Entries for other devices are skipped.
    pub fn is_active(
        &self,
        device: &Device,
        history: &[HistoryEvent],
        reference: NaiveDateTime,
        window: TimeDelta,
    ) -> Result<bool, NormalizeError> {
        let cutoff = reference - window;

        for entry in history {
            let at = entry
                .timestamp()
                .map_err(|_| NormalizeError::InvalidHistoryTime {
                    value: entry.time.clone(),
                })?;
            if at < cutoff {
                break;
            }
            if entry.device_type != device.device_type || entry.area != device.area {
                continue;
            }
            if entry.event_type == self.off_event {
                return Ok(false);
            }
            if entry.event_type == self.on_event {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
