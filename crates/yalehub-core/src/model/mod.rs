// ── Domain model ──
//
// Wire records stay as decoded by `yalehub-api`; derived state lives in
// separate value types composed through `Classified<S>`.

pub mod bundle;
pub mod contact;
pub mod lock;
pub mod smoke;
pub mod snapshot;

use serde::Serialize;
use strum::{Display, EnumString};

use yalehub_api::Device;

pub use bundle::RawBundle;
pub use contact::ContactState;
pub use lock::{DoorState, LockReading, LockSignals, LockState, LockStatus, derive_lock_reading};
pub use smoke::{HistoryTrigger, SmokeState};
pub use snapshot::Snapshot;

/// Device categories the normalizer understands, keyed by the wire `type`
/// tag. Any other tag is not classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum DeviceKind {
    #[strum(serialize = "device_type.door_lock")]
    Lock,
    #[strum(serialize = "device_type.door_contact")]
    Contact,
    #[strum(serialize = "device_type.temperature_sensor")]
    TemperatureSensor,
    #[strum(serialize = "device_type.smoke_detector")]
    SmokeDetector,
}

impl DeviceKind {
    pub fn of(device: &Device) -> Option<Self> {
        device.device_type.parse().ok()
    }
}

/// A wire device paired with the state derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classified<S> {
    pub device: Device,
    pub state: S,
}

impl<S> Classified<S> {
    pub fn new(device: Device, state: S) -> Self {
        Self { device, state }
    }

    pub fn address(&self) -> &str {
        &self.device.address
    }
}
