//! Polling and normalization layer between `yalehub-api` and consumers.
//!
//! This crate owns the refresh cycle for a Yale Smart Alarm panel:
//!
//! - **[`Coordinator`]**: Central facade. [`refresh()`](Coordinator::refresh)
//!   runs one fetch+normalize cycle and atomically publishes the resulting
//!   [`Snapshot`]; [`start()`](Coordinator::start) spawns a background poll
//!   loop that serializes cycles on a fixed interval.
//!
//! - **[`Fetcher`]**: Owns the lazily created cloud session and folds every
//!   client failure into the two-kind [`RefreshError`] taxonomy.
//!
//! - **[`normalize()`]**: Pure classification of the raw device list into
//!   locks, contacts, temperature sensors and smoke detectors, each paired
//!   with its derived state and indexed by address.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod normalize;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::PanelConfig;
pub use coordinator::{ConnectionState, Coordinator};
pub use error::{NormalizeError, RefreshError};
pub use fetcher::Fetcher;
pub use normalize::{NormalizeSettings, normalize};

pub use model::{
    Classified, ContactState, DeviceKind, DoorState, HistoryTrigger, LockReading, LockState,
    LockStatus, RawBundle, SmokeState, Snapshot,
};
