//! Leave request lifecycle and decision transitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, LeaveRequest, LeaveSpan, LeaveStatus};
use crate::store::{LeaveRequestFilter, Transaction};

use super::ledger::{consume, ensure_available, ensure_balance, release};
use super::{LeaveRequestInput, LeaveService};

/// Validates a request's dates, overlap and balance for `employee_id`.
///
/// `exclude` names the request being edited so it does not collide with
/// itself. Returns the inclusive day count.
fn validate(
    tx: &mut dyn Transaction,
    employee_id: Uuid,
    input: &LeaveRequestInput,
    exclude: Option<Uuid>,
    now: DateTime<Utc>,
) -> EngineResult<Decimal> {
    let span = LeaveSpan::new(input.start_date, input.end_date)?;
    let days = Decimal::from(span.days());

    let filter = LeaveRequestFilter {
        employee_id: Some(employee_id),
        ..Default::default()
    };
    let overlapping = tx.list_leave_requests(&filter)?.into_iter().any(|r| {
        Some(r.id) != exclude && r.is_active() && r.overlaps(span.start, span.end)
    });
    if overlapping {
        return Err(EngineError::conflict("overlapping leave request"));
    }

    let balance = ensure_balance(tx, employee_id, span.year(), input.leave_type, now)?;
    ensure_available(&balance, days)?;
    Ok(days)
}

fn require_access(actor: &Actor, request: &LeaveRequest) -> EngineResult<()> {
    if actor.is_privileged() || actor.owns(request.employee_id) {
        Ok(())
    } else {
        Err(EngineError::forbidden("not your leave request"))
    }
}

impl LeaveService {
    /// Files a new pending request.
    ///
    /// Self-service callers file for themselves; privileged callers name the
    /// employee. The request must not overlap another non-rejected request
    /// and must fit into the remaining balance of its year and type.
    pub fn create_request(
        &self,
        actor: &Actor,
        employee_id: Option<Uuid>,
        input: LeaveRequestInput,
    ) -> EngineResult<LeaveRequest> {
        let employee_id = actor.target_employee(employee_id)?;
        let now = self.clock.now();

        let mut tx = self.store.begin()?;
        let days = validate(tx.as_mut(), employee_id, &input, None, now)?;

        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id,
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date: input.end_date,
            days,
            reason: input.reason,
            status: LeaveStatus::Pending,
            approver_id: None,
            decided_at: None,
            created_at: now,
            updated_at: now,
        };
        tx.insert_leave_request(&request)?;
        tx.commit()?;

        info!(
            request_id = %request.id,
            employee_id = %employee_id,
            leave_type = %request.leave_type,
            days = %days,
            "Leave requested"
        );
        Ok(request)
    }

    /// Rewrites a pending request, re-validating it as on creation.
    pub fn update_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
        input: LeaveRequestInput,
    ) -> EngineResult<LeaveRequest> {
        let now = self.clock.now();

        let mut tx = self.store.begin()?;
        let mut request = load(tx.as_mut(), request_id)?;
        require_access(actor, &request)?;
        if request.status != LeaveStatus::Pending {
            return Err(EngineError::conflict("only pending requests can be edited"));
        }

        let days = validate(tx.as_mut(), request.employee_id, &input, Some(request.id), now)?;
        request.leave_type = input.leave_type;
        request.start_date = input.start_date;
        request.end_date = input.end_date;
        request.reason = input.reason;
        request.days = days;
        request.updated_at = now;
        tx.update_leave_request(&request)?;
        tx.commit()?;

        info!(request_id = %request.id, days = %days, "Leave request updated");
        Ok(request)
    }

    /// Deletes a request that is not approved.
    ///
    /// Owners may only delete their pending requests; privileged callers may
    /// also delete rejected ones.
    pub fn delete_request(&self, actor: &Actor, request_id: Uuid) -> EngineResult<()> {
        let mut tx = self.store.begin()?;
        let request = load(tx.as_mut(), request_id)?;
        require_access(actor, &request)?;
        if request.status == LeaveStatus::Approved {
            return Err(EngineError::conflict(
                "approved requests cannot be deleted",
            ));
        }
        if !actor.is_privileged() && request.status != LeaveStatus::Pending {
            return Err(EngineError::conflict("only pending requests can be deleted"));
        }

        tx.delete_leave_request(request_id)?;
        tx.commit()?;

        info!(request_id = %request_id, "Leave request deleted");
        Ok(())
    }

    /// Lists requests newest first.
    ///
    /// Self-service callers only ever see their own requests.
    pub fn list_requests(
        &self,
        actor: &Actor,
        mut filter: LeaveRequestFilter,
    ) -> EngineResult<Vec<LeaveRequest>> {
        if !actor.is_privileged() {
            filter.employee_id = Some(actor.own_employee_id()?);
        }
        let mut tx = self.store.begin()?;
        tx.list_leave_requests(&filter)
    }

    /// Approves a request and books its days. Privileged only.
    pub fn approve(&self, actor: &Actor, request_id: Uuid) -> EngineResult<LeaveRequest> {
        self.decide(actor, request_id, LeaveStatus::Approved)
    }

    /// Rejects a request, returning its days if it was approved.
    pub fn reject(&self, actor: &Actor, request_id: Uuid) -> EngineResult<LeaveRequest> {
        self.decide(actor, request_id, LeaveStatus::Rejected)
    }

    /// Moves a request back to pending, returning its days if it was approved.
    pub fn mark_pending(&self, actor: &Actor, request_id: Uuid) -> EngineResult<LeaveRequest> {
        self.decide(actor, request_id, LeaveStatus::Pending)
    }

    /// Applies one decision transition.
    ///
    /// The balance check and the balance write happen in the same
    /// transaction as the status change. Re-applying the current status
    /// changes nothing.
    fn decide(
        &self,
        actor: &Actor,
        request_id: Uuid,
        target: LeaveStatus,
    ) -> EngineResult<LeaveRequest> {
        actor.require_privileged()?;
        let now = self.clock.now();

        let mut tx = self.store.begin()?;
        let mut request = load(tx.as_mut(), request_id)?;
        let previous = request.status;
        if previous == target {
            return Ok(request);
        }
        if !previous.can_transition_to(target) {
            return Err(EngineError::conflict(format!(
                "cannot move a {previous} request to {target}"
            )));
        }

        let mut balance = ensure_balance(
            tx.as_mut(),
            request.employee_id,
            request.balance_year(),
            request.leave_type,
            now,
        )?;
        match (previous, target) {
            (_, LeaveStatus::Approved) => consume(&mut balance, request.days, now)?,
            (LeaveStatus::Approved, _) => release(&mut balance, request.days, now),
            _ => {}
        }

        request.status = target;
        request.approver_id = match target {
            LeaveStatus::Approved => Some(actor.user_id),
            _ => None,
        };
        request.decided_at = match target {
            LeaveStatus::Pending => None,
            _ => Some(now),
        };
        request.updated_at = now;

        tx.update_balance(&balance)?;
        tx.update_leave_request(&request)?;
        tx.commit()?;

        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            from = %previous,
            to = %target,
            used = %balance.used,
            total = %balance.total,
            "Leave request decided"
        );
        Ok(request)
    }
}

fn load(tx: &mut dyn Transaction, request_id: Uuid) -> EngineResult<LeaveRequest> {
    tx.find_leave_request(request_id)?
        .ok_or_else(|| EngineError::not_found("leave request"))
}
