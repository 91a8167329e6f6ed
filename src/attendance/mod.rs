//! Attendance engine.
//!
//! Maintains check-in/check-out shifts and their nested breaks so that an
//! employee never has two open shifts, a shift never has two open breaks,
//! and breaks always lie inside their shift. Shifts left open longer than the
//! configured maximum are closed at their deadline by the expiry sweep.

mod breaks;
mod expiry;
mod shifts;
mod timestamp;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::AttendanceConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Shift};
use crate::store::{Store, Transaction};

pub use timestamp::{local_day_bounds, parse_operator_time};

/// Identifies the shift a checkout or break operation applies to.
///
/// Self-service callers always resolve to their own open shift and both
/// fields are ignored. Privileged callers may name the shift directly, or
/// name an employee whose open shift is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftTarget {
    /// An explicit shift id.
    pub shift_id: Option<Uuid>,
    /// An employee whose open shift is meant.
    pub employee_id: Option<Uuid>,
}

impl ShiftTarget {
    /// Targets the caller's own open shift.
    pub fn own() -> Self {
        Self::default()
    }

    /// Targets a shift by id.
    pub fn shift(shift_id: Uuid) -> Self {
        Self {
            shift_id: Some(shift_id),
            employee_id: None,
        }
    }

    /// Targets an employee's open shift.
    pub fn employee(employee_id: Uuid) -> Self {
        Self {
            shift_id: None,
            employee_id: Some(employee_id),
        }
    }
}

/// Entry point for every attendance operation.
pub struct AttendanceService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    config: AttendanceConfig,
}

impl AttendanceService {
    /// Creates the service over a store and a clock.
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, config: AttendanceConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// The current instant according to the service clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn max_shift(&self) -> Duration {
        self.config.max_shift()
    }

    /// Loads the shift an operation targets.
    ///
    /// The returned shift may be closed only when a privileged caller named
    /// it by id; callers decide how to treat that.
    fn resolve_shift(
        &self,
        tx: &mut dyn Transaction,
        actor: &Actor,
        target: ShiftTarget,
    ) -> EngineResult<Shift> {
        let target = if actor.is_privileged() {
            target
        } else {
            ShiftTarget::employee(actor.own_employee_id()?)
        };

        if let Some(shift_id) = target.shift_id {
            return tx
                .find_shift(shift_id)?
                .ok_or_else(|| EngineError::not_found("shift"));
        }

        let employee_id = target
            .employee_id
            .ok_or_else(|| EngineError::invalid_input("shift_id or employee_id required"))?;
        tx.find_open_shift(employee_id)?
            .ok_or_else(|| EngineError::not_found("open shift"))
    }
}

/// Picks the instant an operation takes effect at.
///
/// Only privileged callers may supply a time, and it must not be in the
/// future. Everyone else gets `now`.
fn effective_time(
    actor: &Actor,
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    field: &str,
) -> EngineResult<DateTime<Utc>> {
    match requested {
        Some(at) if actor.is_privileged() => {
            if at > now {
                Err(EngineError::invalid_input(format!(
                    "{field} cannot be in the future"
                )))
            } else {
                Ok(at)
            }
        }
        _ => Ok(now),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_service_time_is_ignored() {
        let actor = Actor::employee(Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();
        let earlier = now - Duration::hours(3);
        assert_eq!(
            effective_time(&actor, Some(earlier), now, "check_in_at").unwrap(),
            now
        );
    }

    #[test]
    fn test_privileged_time_may_be_backdated() {
        let actor = Actor::admin(Uuid::new_v4());
        let now = Utc::now();
        let earlier = now - Duration::hours(3);
        assert_eq!(
            effective_time(&actor, Some(earlier), now, "check_in_at").unwrap(),
            earlier
        );
    }

    #[test]
    fn test_privileged_future_time_is_rejected() {
        let actor = Actor::admin(Uuid::new_v4());
        let now = Utc::now();
        let err = effective_time(&actor, Some(now + Duration::minutes(1)), now, "check_out_at")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: check_out_at cannot be in the future"
        );
    }
}
