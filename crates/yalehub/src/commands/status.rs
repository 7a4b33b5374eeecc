//! `status`: one refresh, then print the snapshot.

use serde::Serialize;
use tabled::Tabled;

use yalehub_core::{Classified, Coordinator, LockReading, Snapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Views ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Tabled)]
pub struct DeviceRow {
    #[tabled(rename = "Category")]
    pub category: &'static str,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "State")]
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub arm_status: String,
    pub online: bool,
    pub reference_time: String,
    pub devices: Vec<DeviceRow>,
}

impl StatusView {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut devices = Vec::with_capacity(snapshot.device_count());
        devices.extend(rows("lock", &snapshot.locks, lock_text));
        devices.extend(rows("contact", &snapshot.contacts, ToString::to_string));
        devices.extend(rows("temperature", &snapshot.temperature_sensors, |c| {
            format!("{c:.1} °C")
        }));
        devices.extend(rows("smoke", &snapshot.smoke_detectors, ToString::to_string));

        Self {
            arm_status: snapshot.arm_status.to_string(),
            online: snapshot.is_online(),
            reference_time: snapshot.reference_time.to_string(),
            devices,
        }
    }

    fn detail(&self) -> String {
        let online = if self.online { "online" } else { "offline" };
        format!(
            "Panel: {}, {online} (as of {})\n{}",
            self.arm_status,
            self.reference_time,
            output::render_table(&self.devices)
        )
    }
}

fn rows<S>(
    category: &'static str,
    items: &[Classified<S>],
    state_text: impl Fn(&S) -> String,
) -> impl Iterator<Item = DeviceRow> {
    items.iter().map(move |item| DeviceRow {
        category,
        address: item.address().to_owned(),
        name: item.device.name.clone().unwrap_or_default(),
        state: state_text(&item.state),
    })
}

fn lock_text(reading: &LockReading) -> String {
    match reading.secondary {
        Some(door) => format!("{} (door {door})", reading.state),
        None => reading.state.to_string(),
    }
}

/// Render a snapshot in the selected output format.
pub fn render(snapshot: &Snapshot, global: &GlobalOpts) -> String {
    let view = StatusView::from_snapshot(snapshot);
    output::render_single(&global.output, &view, StatusView::detail)
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = coordinator
        .refresh()
        .await
        .map_err(|e| CliError::from_refresh(e, profile))?;

    output::print_output(&render(&snapshot, global), global.quiet);
    Ok(())
}
