//! Leave request engine and balance ledger.
//!
//! Requests move through `pending`, `approved` and `rejected`. Approving a
//! request books its days against the employee's balance for the request's
//! year and type; moving an approved request anywhere else gives them back.
//! Balances are derived from policy overrides (or built-in defaults) prorated
//! by hire date, and are repaired on every read.

mod ledger;
mod policy;
mod requests;

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, LeaveBalance, LeavePolicy, LeaveType};
use crate::store::Store;

pub use ledger::{consume, ensure_available, ensure_balance, recompute_totals, release};
pub use policy::{prorate, resolve_entitlement, round2};

/// The editable fields of a leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequestInput {
    /// The kind of leave.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
}

/// One entry of a policy update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    /// The leave type the total applies to.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// The full-year entitlement in days.
    pub total: Decimal,
}

/// Entry point for every leave operation.
pub struct LeaveService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl LeaveService {
    /// Creates the service over a store and a clock.
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The current calendar year in server-local time.
    fn current_year(&self) -> i32 {
        self.clock.now().with_timezone(&Local).year()
    }

    /// Returns the balances of every leave type for the targeted employees,
    /// creating and repairing rows as needed.
    ///
    /// Self-service callers always get their own balances. Privileged callers
    /// get one employee's, or everyone's when `employee_id` is `None`.
    pub fn list_balances(
        &self,
        actor: &Actor,
        year: Option<i32>,
        employee_id: Option<Uuid>,
    ) -> EngineResult<Vec<LeaveBalance>> {
        let year = year.unwrap_or_else(|| self.current_year());
        let now = self.clock.now();
        let scope = if actor.is_privileged() {
            employee_id
        } else {
            Some(actor.own_employee_id()?)
        };

        let mut tx = self.store.begin()?;
        let targets = match scope {
            Some(id) => vec![id],
            None => tx.list_employees()?.into_iter().map(|e| e.id).collect(),
        };
        for id in targets {
            for leave_type in LeaveType::ALL {
                ensure_balance(tx.as_mut(), id, year, leave_type, now)?;
            }
        }
        let balances = tx.list_balances(year, None, scope)?;
        tx.commit()?;
        Ok(balances)
    }

    /// Lists stored policy overrides, newest year first. Privileged only.
    pub fn list_policies(&self, actor: &Actor, year: Option<i32>) -> EngineResult<Vec<LeavePolicy>> {
        actor.require_privileged()?;
        let mut tx = self.store.begin()?;
        tx.list_policies(year)
    }

    /// Replaces the entitlement of each listed type for `year` and recomputes
    /// every affected balance. Privileged only.
    ///
    /// All entries apply in one transaction; if any fails, none apply.
    pub fn update_policies(
        &self,
        actor: &Actor,
        year: i32,
        entries: &[PolicyEntry],
    ) -> EngineResult<Vec<LeavePolicy>> {
        actor.require_privileged()?;
        self.apply_policies(year, entries)
    }

    /// Applies policy entries without an actor check; used for startup seeding.
    pub fn apply_policies(&self, year: i32, entries: &[PolicyEntry]) -> EngineResult<Vec<LeavePolicy>> {
        if let Some(entry) = entries.iter().find(|e| e.total < Decimal::ZERO) {
            return Err(EngineError::invalid_input(format!(
                "total for {} must not be negative",
                entry.leave_type
            )));
        }

        let now = self.clock.now();
        let mut tx = self.store.begin()?;
        for entry in entries {
            let policy = match tx.find_policy(year, entry.leave_type)? {
                Some(mut existing) => {
                    existing.total = entry.total;
                    existing.updated_at = now;
                    existing
                }
                None => LeavePolicy {
                    id: Uuid::new_v4(),
                    year,
                    leave_type: entry.leave_type,
                    total: entry.total,
                    created_at: now,
                    updated_at: now,
                },
            };
            tx.upsert_policy(&policy)?;
            recompute_totals(tx.as_mut(), year, entry.leave_type, now)?;
        }
        let policies = tx.list_policies(Some(year))?;
        tx.commit()?;

        info!(year, entries = entries.len(), "Updated leave policies");
        Ok(policies)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Employee;
    use crate::store::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};

    pub(crate) struct Harness {
        pub service: LeaveService,
        pub clock: Arc<ManualClock>,
        pub store: Arc<MemoryStore>,
        pub employee_id: Uuid,
        pub admin: Actor,
        pub employee: Actor,
    }

    /// 2026-03-02 12:00 UTC.
    pub(crate) fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    pub(crate) fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    pub(crate) fn input(leave_type: LeaveType, start: NaiveDate, end: NaiveDate) -> LeaveRequestInput {
        LeaveRequestInput {
            leave_type,
            start_date: start,
            end_date: end,
            reason: "family".to_string(),
        }
    }

    pub(crate) fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let employee_id = Uuid::new_v4();
        store
            .insert_employee(Employee {
                id: employee_id,
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                hired_at: None,
            })
            .unwrap();
        let clock = Arc::new(ManualClock::new(t0()));
        let service = LeaveService::new(store.clone(), clock.clone());
        Harness {
            service,
            clock,
            store,
            employee_id,
            admin: Actor::admin(Uuid::new_v4()),
            employee: Actor::employee(Uuid::new_v4(), employee_id),
        }
    }
}
