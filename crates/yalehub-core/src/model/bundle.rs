// ── Raw fetch result ──

use chrono::NaiveDateTime;

use yalehub_api::{AllData, ArmStatus, Device, HistoryEvent};

/// Everything one fetch gathered, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBundle {
    pub arm_status: ArmStatus,
    pub devices: Vec<Device>,
    /// Newest first.
    pub history: Vec<HistoryEvent>,
    pub status: serde_json::Value,
    pub online: serde_json::Value,
    pub panel_info: serde_json::Value,
    /// Server token time; anchors history windows.
    pub reference_time: NaiveDateTime,
}

impl RawBundle {
    pub fn new(arm_status: ArmStatus, data: AllData, reference_time: NaiveDateTime) -> Self {
        Self {
            arm_status,
            devices: data.cycle.device_status,
            history: data.history,
            status: data.status,
            online: data.online,
            panel_info: data.panel_info,
            reference_time,
        }
    }
}
