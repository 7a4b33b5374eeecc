// ── Door/window contact domain types ──

use serde::Serialize;
use strum::Display;

const CLOSED_MARKER: &str = "device_status.dc_close";
const OPEN_MARKER: &str = "device_status.dc_open";

/// Derived state of a door/window contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContactState {
    Closed,
    Open,
    Unavailable,
}

impl ContactState {
    /// Closed marker is checked first.
    pub fn from_status_flags(status_flags: &str) -> Self {
        if status_flags.contains(CLOSED_MARKER) {
            Self::Closed
        } else if status_flags.contains(OPEN_MARKER) {
            Self::Open
        } else {
            Self::Unavailable
        }
    }
}
