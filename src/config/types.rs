//! Configuration types for the workforce engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every section has
//! defaults, so an empty file is a valid configuration.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{Employee, LeaveType};

/// Default maximum length of a shift before it is auto-closed.
pub const DEFAULT_MAX_SHIFT_HOURS: u32 = 14;

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Attendance engine settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    /// Hours after check-in at which an open shift is force-closed.
    pub max_shift_hours: u32,
}

impl AttendanceConfig {
    /// The maximum shift length as a duration.
    pub fn max_shift(&self) -> Duration {
        Duration::hours(i64::from(self.max_shift_hours))
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            max_shift_hours: DEFAULT_MAX_SHIFT_HOURS,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// A leave policy to apply at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicySeed {
    /// The calendar year.
    pub year: i32,
    /// The leave type.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// Annual entitlement in days.
    pub total: Decimal,
}

/// Leave settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeaveConfig {
    /// Policies applied at startup.
    pub policies: Vec<PolicySeed>,
}

/// The complete configuration loaded from YAML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkforceConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Attendance engine settings.
    pub attendance: AttendanceConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Leave settings.
    pub leave: LeaveConfig,
    /// Employee records to seed the in-memory store with.
    pub employees: Vec<Employee>,
}
