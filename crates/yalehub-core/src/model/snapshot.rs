// ── Normalized snapshot ──

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use yalehub_api::ArmStatus;

use super::{Classified, ContactState, LockReading, SmokeState};

/// Result of one refresh cycle. Built once by the normalizer and never
/// mutated; the coordinator replaces it wholesale.
///
/// Each `*_map` is keyed by device address and holds exactly the
/// addresses of the matching category list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub arm_status: ArmStatus,
    pub status: serde_json::Value,
    pub online: serde_json::Value,
    pub panel_info: serde_json::Value,
    pub reference_time: NaiveDateTime,

    pub locks: Vec<Classified<LockReading>>,
    pub contacts: Vec<Classified<ContactState>>,
    pub temperature_sensors: Vec<Classified<f64>>,
    pub smoke_detectors: Vec<Classified<SmokeState>>,

    pub lock_map: BTreeMap<String, LockReading>,
    pub contact_map: BTreeMap<String, ContactState>,
    pub temperature_map: BTreeMap<String, f64>,
    pub smoke_map: BTreeMap<String, SmokeState>,
}

impl Snapshot {
    pub fn lock(&self, address: &str) -> Option<LockReading> {
        self.lock_map.get(address).copied()
    }

    pub fn contact(&self, address: &str) -> Option<ContactState> {
        self.contact_map.get(address).copied()
    }

    pub fn temperature(&self, address: &str) -> Option<f64> {
        self.temperature_map.get(address).copied()
    }

    pub fn smoke(&self, address: &str) -> Option<SmokeState> {
        self.smoke_map.get(address).copied()
    }

    /// Interpret the `online` payload. The API has reported this as a bool
    /// and as the strings `"online"` / `"offline"`.
    pub fn is_online(&self) -> bool {
        match &self.online {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => {
                s.eq_ignore_ascii_case("online") || s.eq_ignore_ascii_case("true") || s == "1"
            }
            serde_json::Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
            _ => false,
        }
    }

    /// Number of classified devices across all categories.
    pub fn device_count(&self) -> usize {
        self.locks.len()
            + self.contacts.len()
            + self.temperature_sensors.len()
            + self.smoke_detectors.len()
    }
}

/// Index a category list by address. Later entries win on duplicates.
pub(crate) fn address_map<S: Copy>(items: &[Classified<S>]) -> BTreeMap<String, S> {
    items
        .iter()
        .map(|item| (item.address().to_owned(), item.state))
        .collect()
}
