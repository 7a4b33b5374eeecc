// Yale API response types
//
// Models for the Yale Smart Alarm cloud JSON API. All data responses are
// wrapped in the `ApiResponse<T>` envelope. Fields use `#[serde(default)]`
// liberally and numeric-or-string fields go through a lenient decoder
// because the API is inconsistent about both across panel firmware.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Error;

/// Format of `AUTH CHECK.token_time`.
pub const TOKEN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of `HistoryEvent.time`.
pub const HISTORY_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

// ── Response Envelope ────────────────────────────────────────────────

/// Standard Yale API response envelope.
///
/// ```json
/// { "result": true, "message": "OK!", "data": ... }
/// ```
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub result: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: T,
}

/// Body of a successful `POST /o/token/`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

// ── Panel mode ───────────────────────────────────────────────────────

/// Whether the alarm panel is armed, partially armed or disarmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArmStatus {
    Arm,
    Home,
    Disarm,
    #[serde(other)]
    Unknown,
}

/// One entry of `GET /api/panel/mode/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModeEntry {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub area: String,
    pub mode: ArmStatus,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Raw device record from the panel cycle.
///
/// Only the fields the normalizer reads are modelled; everything else
/// lands in `extra`. Never mutated after decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub area: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text status flags, e.g. `"device_status.lock"`.
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub status1: String,
    /// Hex-encoded lock bitmask (locks only).
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub minigw_lock_status: Option<String>,
    /// Temperature reading (temperature sensors only); number or string.
    #[serde(default)]
    pub status_temp: Option<serde_json::Value>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `GET /api/panel/cycle/` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    #[serde(default)]
    pub device_status: Vec<Device>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── History ──────────────────────────────────────────────────────────

/// A single entry from the event report, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub time: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub area: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub event_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HistoryEvent {
    /// Parse `time` using [`HISTORY_TIME_FORMAT`].
    pub fn timestamp(&self) -> Result<NaiveDateTime, Error> {
        parse_time(&self.time, HISTORY_TIME_FORMAT)
    }
}

// ── Auth check ───────────────────────────────────────────────────────

/// `GET /api/auth/check/` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthCheck {
    pub token_time: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AuthCheck {
    /// Parse `token_time` using [`TOKEN_TIME_FORMAT`].
    pub fn token_time(&self) -> Result<NaiveDateTime, Error> {
        parse_time(&self.token_time, TOKEN_TIME_FORMAT)
    }
}

// ── Bundle ───────────────────────────────────────────────────────────

/// Everything `YaleClient::get_all` gathers in one round.
#[derive(Debug, Clone, PartialEq)]
pub struct AllData {
    pub cycle: Cycle,
    pub status: serde_json::Value,
    pub online: serde_json::Value,
    pub panel_info: serde_json::Value,
    pub history: Vec<HistoryEvent>,
    pub auth_check: AuthCheck,
}

fn parse_time(value: &str, format: &str) -> Result<NaiveDateTime, Error> {
    NaiveDateTime::parse_from_str(value, format).map_err(|source| Error::Timestamp {
        value: value.to_owned(),
        source,
    })
}

mod de {
    use serde::{Deserialize, Deserializer, de::Error as _};
    use serde_json::Value;

    /// Accept a string, number, bool or null and render it as a string.
    /// Null becomes the empty string.
    pub(super) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(D::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }

    pub(super) fn lenient_opt_string<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<String>, D::Error> {
        let s = lenient_string(d)?;
        Ok(if s.is_empty() { None } else { Some(s) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_accepts_numeric_area_and_address() {
        let device: Device = serde_json::from_value(json!({
            "type": "device_type.door_contact",
            "area": 1,
            "address": "RF:0001",
            "status1": "device_status.dc_close",
            "no": "3"
        }))
        .unwrap();

        assert_eq!(device.area, "1");
        assert_eq!(device.address, "RF:0001");
        assert_eq!(device.minigw_lock_status, None);
        assert_eq!(device.extra.get("no"), Some(&json!("3")));
    }

    #[test]
    fn empty_lock_status_decodes_as_none() {
        let device: Device = serde_json::from_value(json!({
            "type": "device_type.door_lock",
            "area": "1",
            "address": "RF:0002",
            "status1": null,
            "minigw_lock_status": ""
        }))
        .unwrap();

        assert_eq!(device.status1, "");
        assert_eq!(device.minigw_lock_status, None);
    }

    #[test]
    fn arm_status_falls_back_to_unknown() {
        let entry: ModeEntry =
            serde_json::from_value(json!({ "area": "1", "mode": "partial" })).unwrap();
        assert_eq!(entry.mode, ArmStatus::Unknown);

        let entry: ModeEntry =
            serde_json::from_value(json!({ "area": 1, "mode": "home" })).unwrap();
        assert_eq!(entry.mode, ArmStatus::Home);
        assert_eq!(entry.mode.to_string(), "home");
    }

    #[test]
    fn history_and_token_time_formats() {
        let event: HistoryEvent = serde_json::from_value(json!({
            "time": "2024/06/15 10:30:00",
            "type": "device_type.smoke_detector",
            "area": 1,
            "event_type": 1111
        }))
        .unwrap();
        assert_eq!(event.event_type, "1111");
        assert_eq!(
            event.timestamp().unwrap().to_string(),
            "2024-06-15 10:30:00"
        );

        let check = AuthCheck {
            token_time: "2024-06-15 10:31:00".into(),
            extra: serde_json::Map::new(),
        };
        assert_eq!(check.token_time().unwrap().to_string(), "2024-06-15 10:31:00");
    }

    #[test]
    fn malformed_history_time_is_rejected() {
        let event: HistoryEvent =
            serde_json::from_value(json!({ "time": "15-06-2024", "type": "x" })).unwrap();
        assert!(matches!(event.timestamp(), Err(Error::Timestamp { .. })));
    }
}
