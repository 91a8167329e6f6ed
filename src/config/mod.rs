//! Configuration loading and management for the workforce engine.
//!
//! This module loads the YAML configuration file: server address, the
//! maximum shift length, logging options, and optional seed data.
//!
//! # Example
//!
//! ```no_run
//! use workforce_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config.yaml").unwrap();
//! println!("Listening on {}", config.config().server.listen_addr);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AttendanceConfig, DEFAULT_MAX_SHIFT_HOURS, LeaveConfig, LoggingConfig, PolicySeed,
    ServerConfig, WorkforceConfig,
};
