// yalehub-api: Async Rust client for the Yale Smart Alarm cloud API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod panel;
pub mod transport;

pub use auth::Credentials;
pub use client::{DEFAULT_BASE_URL, YaleClient};
pub use error::Error;
pub use models::{AllData, ArmStatus, AuthCheck, Cycle, Device, HistoryEvent};
pub use transport::TransportConfig;
