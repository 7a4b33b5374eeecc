// ── Bundle normalization ──
//
// Classifies raw devices by type tag, derives each one's display state and
// indexes the results by address. Pure: no IO, no shared state.

use chrono::TimeDelta;
use tracing::debug;

use yalehub_api::Device;

use crate::error::NormalizeError;
use crate::model::lock::lock_reading;
use crate::model::snapshot::address_map;
use crate::model::{
    Classified, ContactState, DeviceKind, HistoryTrigger, RawBundle, SmokeState, Snapshot,
};

/// Default trailing window for smoke events.
pub const DEFAULT_SMOKE_WINDOW_MINUTES: u32 = 3;

/// Tunables for [`normalize()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeSettings {
    pub smoke_window: TimeDelta,
    pub smoke_events: HistoryTrigger,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            smoke_window: TimeDelta::minutes(i64::from(DEFAULT_SMOKE_WINDOW_MINUTES)),
            smoke_events: HistoryTrigger::default(),
        }
    }
}

/// Turn a raw bundle into a [`Snapshot`].
///
/// Devices with an unrecognized type tag are left out of every list and
/// map. Any malformed lock bitmask, temperature reading or history
/// timestamp fails the whole bundle; a partial snapshot is never returned.
pub fn normalize(
    raw: &RawBundle,
    settings: &NormalizeSettings,
) -> Result<Snapshot, NormalizeError> {
    let mut locks = Vec::new();
    let mut contacts = Vec::new();
    let mut temperature_sensors = Vec::new();
    let mut smoke_detectors = Vec::new();

    for device in &raw.devices {
        let Some(kind) = DeviceKind::of(device) else {
            debug!(
                device_type = %device.device_type,
                address = %device.address,
                "skipping device of unrecognized type"
            );
            continue;
        };

        match kind {
            DeviceKind::Lock => {
                let reading = lock_reading(device)?;
                locks.push(Classified::new(device.clone(), reading));
            }
            DeviceKind::Contact => {
                let state = ContactState::from_status_flags(&device.status1);
                contacts.push(Classified::new(device.clone(), state));
            }
            DeviceKind::TemperatureSensor => {
                let celsius = temperature(device)?;
                temperature_sensors.push(Classified::new(device.clone(), celsius));
            }
            DeviceKind::SmokeDetector => {
                let active = settings.smoke_events.is_active(
                    device,
                    &raw.history,
                    raw.reference_time,
                    settings.smoke_window,
                )?;
                smoke_detectors.push(Classified::new(device.clone(), SmokeState::from(active)));
            }
        }
    }

    debug!(
        locks = locks.len(),
        contacts = contacts.len(),
        temperature_sensors = temperature_sensors.len(),
        smoke_detectors = smoke_detectors.len(),
        "normalized device cycle"
    );

    Ok(Snapshot {
        arm_status: raw.arm_status,
        status: raw.status.clone(),
        online: raw.online.clone(),
        panel_info: raw.panel_info.clone(),
        reference_time: raw.reference_time,
        lock_map: address_map(&locks),
        contact_map: address_map(&contacts),
        temperature_map: address_map(&temperature_sensors),
        smoke_map: address_map(&smoke_detectors),
        locks,
        contacts,
        temperature_sensors,
        smoke_detectors,
    })
}

/// Numeric reading of `status_temp`, given as a JSON number or a numeric
/// string.
fn temperature(device: &Device) -> Result<f64, NormalizeError> {
    let parsed = match &device.status_temp {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| NormalizeError::InvalidTemperature {
        address: device.address.clone(),
        value: device
            .status_temp
            .as_ref()
            .map_or_else(|| "null".into(), ToString::to_string),
    })
}
