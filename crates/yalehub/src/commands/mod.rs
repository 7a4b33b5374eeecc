//! Command handlers: bridge CLI args -> coordinator -> output formatting.

pub mod config_cmd;
pub mod status;
pub mod watch;
