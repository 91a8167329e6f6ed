//! Shift lifecycle: check-in, check-out, listing and removal.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Shift};

use super::expiry::close_if_expired;
use super::timestamp::local_day_bounds;
use super::{AttendanceService, ShiftTarget, effective_time};

impl AttendanceService {
    /// Opens a new shift.
    ///
    /// Self-service callers check in themselves at the current time, at most
    /// once per server-local calendar day. Privileged callers name the
    /// employee and may backdate the check-in.
    ///
    /// An existing open shift that has outlived the maximum shift length is
    /// closed first; one that has not is a `Conflict`.
    pub fn check_in(
        &self,
        actor: &Actor,
        employee_id: Option<Uuid>,
        requested: Option<DateTime<Utc>>,
    ) -> EngineResult<Shift> {
        let employee_id = actor.target_employee(employee_id)?;
        let now = self.clock.now();
        let check_in = effective_time(actor, requested, now, "check_in_at")?;

        // The stale shift is closed in its own transaction so the correction
        // survives even if this check-in is rejected below.
        {
            let mut tx = self.store.begin()?;
            if let Some(mut open) = tx.find_open_shift(employee_id)? {
                if !close_if_expired(tx.as_mut(), &mut open, self.max_shift(), now)? {
                    return Err(EngineError::conflict("open shift exists"));
                }
                tx.commit()?;
            }
        }

        let mut tx = self.store.begin()?;
        if tx.find_employee(employee_id)?.is_none() {
            return Err(EngineError::not_found("employee"));
        }

        if !actor.is_privileged() {
            let (day_start, day_end) = local_day_bounds(check_in)?;
            if tx.count_check_ins_between(employee_id, day_start, day_end)? > 0 {
                return Err(EngineError::conflict("already checked in"));
            }
        }

        let shift = Shift::open(employee_id, check_in, now);
        tx.insert_shift(&shift)?;
        tx.commit()?;

        info!(
            shift_id = %shift.id,
            employee_id = %employee_id,
            check_in = %check_in,
            "Checked in"
        );
        Ok(shift)
    }

    /// Closes a shift.
    ///
    /// The checkout time is capped at `check_in + max_shift_hours` without
    /// error. Breaks still running end at the checkout time and breaks that
    /// reach past it are cut back; those corrections are written before the
    /// shift itself.
    pub fn check_out(
        &self,
        actor: &Actor,
        target: ShiftTarget,
        requested: Option<DateTime<Utc>>,
    ) -> EngineResult<Shift> {
        let now = self.clock.now();
        let check_out = effective_time(actor, requested, now, "check_out_at")?;

        let mut tx = self.store.begin()?;
        let mut shift = self.resolve_shift(tx.as_mut(), actor, target)?;
        if !shift.is_open() {
            return Err(EngineError::conflict("already checked out"));
        }
        if check_out < shift.check_in {
            return Err(EngineError::invalid_input(
                "check_out_at cannot be before check-in",
            ));
        }

        let check_out = check_out.min(shift.deadline(self.max_shift()));
        for brk in shift.close_at(check_out) {
            tx.update_break(&brk)?;
        }
        tx.update_shift(&shift)?;
        tx.commit()?;

        info!(
            shift_id = %shift.id,
            employee_id = %shift.employee_id,
            check_out = %check_out,
            "Checked out"
        );
        Ok(shift)
    }

    /// Lists shifts visible to the caller, newest first.
    ///
    /// Self-service callers see their own shifts only. Privileged callers see
    /// everyone's, or one employee's when `employee_id` is given. Expired open
    /// shifts in scope are closed first on a best-effort basis.
    pub fn list_shifts(&self, actor: &Actor, employee_id: Option<Uuid>) -> EngineResult<Vec<Shift>> {
        let scope = if actor.is_privileged() {
            employee_id
        } else {
            Some(actor.own_employee_id()?)
        };

        if let Err(err) = self.sweep_expired(scope) {
            warn!(error = %err, "Expiry sweep failed before listing shifts");
        }

        let mut tx = self.store.begin()?;
        tx.list_shifts(scope)
    }

    /// Deletes a shift and its breaks. Privileged only.
    pub fn delete_shift(&self, actor: &Actor, shift_id: Uuid) -> EngineResult<()> {
        actor.require_privileged()?;

        let mut tx = self.store.begin()?;
        if !tx.delete_shift(shift_id)? {
            return Err(EngineError::not_found("shift"));
        }
        tx.commit()?;

        info!(shift_id = %shift_id, "Deleted shift");
        Ok(())
    }

    /// Deletes every shift of one employee. Privileged only.
    pub fn delete_employee_shifts(&self, actor: &Actor, employee_id: Uuid) -> EngineResult<usize> {
        actor.require_privileged()?;

        let mut tx = self.store.begin()?;
        let removed = tx.delete_employee_shifts(employee_id)?;
        tx.commit()?;

        info!(employee_id = %employee_id, removed, "Deleted employee shifts");
        Ok(removed)
    }
}
