//! Application state for the workforce API.
//!
//! This module defines the shared application state that is available
//! to all request handlers, and builds it from configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::attendance::AttendanceService;
use crate::clock::{Clock, SystemClock};
use crate::config::WorkforceConfig;
use crate::error::EngineResult;
use crate::leave::{LeaveService, PolicyEntry};
use crate::store::{MemoryStore, Store};

/// Shared application state.
///
/// Both engines share one store and one clock.
#[derive(Clone)]
pub struct AppState {
    attendance: Arc<AttendanceService>,
    leave: Arc<LeaveService>,
}

impl AppState {
    /// Creates a new application state over the given engines.
    pub fn new(attendance: AttendanceService, leave: LeaveService) -> Self {
        Self {
            attendance: Arc::new(attendance),
            leave: Arc::new(leave),
        }
    }

    /// Builds an in-memory state from configuration using the system clock.
    pub fn from_config(config: &WorkforceConfig) -> EngineResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Builds an in-memory state from configuration, seeding the employees
    /// and policies it lists.
    pub fn with_clock(config: &WorkforceConfig, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        let store = Arc::new(MemoryStore::new());
        for employee in &config.employees {
            store.insert_employee(employee.clone())?;
        }

        let store: Arc<dyn Store> = store;
        let attendance =
            AttendanceService::new(store.clone(), clock.clone(), config.attendance);
        let leave = LeaveService::new(store, clock);

        let mut by_year: BTreeMap<i32, Vec<PolicyEntry>> = BTreeMap::new();
        for seed in &config.leave.policies {
            by_year.entry(seed.year).or_default().push(PolicyEntry {
                leave_type: seed.leave_type,
                total: seed.total,
            });
        }
        for (year, entries) in &by_year {
            leave.apply_policies(*year, entries)?;
        }

        info!(
            employees = config.employees.len(),
            policy_years = by_year.len(),
            "Seeded in-memory store"
        );
        Ok(Self::new(attendance, leave))
    }

    /// Returns the attendance engine.
    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }

    /// Returns the leave engine.
    pub fn leave(&self) -> &LeaveService {
        &self.leave
    }
}
