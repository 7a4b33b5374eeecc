// ── Lock domain types ──

use bitflags::bitflags;
use serde::Serialize;
use strum::Display;

use yalehub_api::Device;

use crate::error::NormalizeError;

const LOCK_MARKER: &str = "device_status.lock";
const UNLOCK_MARKER: &str = "device_status.unlock";

bitflags! {
    /// Decoded `minigw_lock_status` bitmask. Unknown bits are retained so a
    /// nonzero mask stays nonzero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LockStatus: u64 {
        const LOCKED = 0x01;
        const CLOSED = 0x10;
    }
}

impl LockStatus {
    /// Parse the hex string reported by the gateway. Absent, empty or
    /// blank input decodes as zero.
    pub fn parse_hex(raw: Option<&str>) -> Result<Self, ParseLockStatusError> {
        let trimmed = raw.map_or("", str::trim);
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        u64::from_str_radix(digits, 16)
            .map(Self::from_bits_retain)
            .map_err(|_| ParseLockStatusError)
    }

    pub fn is_locked(self) -> bool {
        self.contains(Self::LOCKED)
    }

    pub fn is_closed(self) -> bool {
        self.contains(Self::CLOSED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLockStatusError;

/// Primary lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocked,
    Unavailable,
}

/// Door position reported alongside the lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DoorState {
    Closed,
    Open,
    Unknown,
}

/// Derived state of a lock device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LockReading {
    pub state: LockState,
    /// Unset when the lock is unavailable.
    pub secondary: Option<DoorState>,
}

impl LockReading {
    pub const UNAVAILABLE: Self = Self {
        state: LockState::Unavailable,
        secondary: None,
    };

    const fn new(state: LockState, secondary: DoorState) -> Self {
        Self {
            state,
            secondary: Some(secondary),
        }
    }
}

/// Inputs of the lock decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSignals {
    pub status: LockStatus,
    pub lock_marker: bool,
    pub unlock_marker: bool,
}

impl LockSignals {
    pub fn new(status: LockStatus, status_flags: &str) -> Self {
        Self {
            status,
            lock_marker: status_flags.contains(LOCK_MARKER),
            unlock_marker: status_flags.contains(UNLOCK_MARKER),
        }
    }

    fn any_marker(self) -> bool {
        self.lock_marker || self.unlock_marker
    }

    fn reporting(self) -> bool {
        !self.status.is_empty() && self.any_marker()
    }
}

// ── Decision table ──────────────────────────────────────────────────

struct LockRule {
    applies: fn(LockSignals) -> bool,
    reading: LockReading,
}

fn idle_locked(s: LockSignals) -> bool {
    s.status.is_empty() && s.lock_marker
}

fn idle_unlocked(s: LockSignals) -> bool {
    s.status.is_empty() && s.unlock_marker
}

fn closed_and_locked(s: LockSignals) -> bool {
    s.reporting() && s.status.is_closed() && s.status.is_locked()
}

fn closed_not_locked(s: LockSignals) -> bool {
    s.reporting() && s.status.is_closed() && !s.status.is_locked()
}

fn door_open(s: LockSignals) -> bool {
    s.reporting() && !s.status.is_closed()
}

/// Evaluated top to bottom; first match wins. No match means unavailable.
const LOCK_RULES: [LockRule; 5] = [
    LockRule {
        applies: idle_locked,
        reading: LockReading::new(LockState::Locked, DoorState::Unknown),
    },
    LockRule {
        applies: idle_unlocked,
        reading: LockReading::new(LockState::Unlocked, DoorState::Unknown),
    },
    LockRule {
        applies: closed_and_locked,
        reading: LockReading::new(LockState::Locked, DoorState::Closed),
    },
    LockRule {
        applies: closed_not_locked,
        reading: LockReading::new(LockState::Unlocked, DoorState::Closed),
    },
    LockRule {
        applies: door_open,
        reading: LockReading::new(LockState::Unlocked, DoorState::Open),
    },
];

/// Run the decision table.
pub fn derive_lock_reading(signals: LockSignals) -> LockReading {
    LOCK_RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .map_or(LockReading::UNAVAILABLE, |rule| rule.reading)
}

/// Derive the reading for a `device_type.door_lock` record.
pub(crate) fn lock_reading(device: &Device) -> Result<LockReading, NormalizeError> {
    let status = LockStatus::parse_hex(device.minigw_lock_status.as_deref()).map_err(|_| {
        NormalizeError::InvalidLockStatus {
            address: device.address.clone(),
            value: device.minigw_lock_status.clone().unwrap_or_default(),
        }
    })?;
    Ok(derive_lock_reading(LockSignals::new(status, &device.status1)))
}
