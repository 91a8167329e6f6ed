//! Request types for the workforce API.
//!
//! This module defines the JSON bodies and query strings accepted by the
//! attendance and leave endpoints. Operator timestamps stay strings here and
//! are interpreted by [`parse_operator_time`] so naive local values work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attendance::{ShiftTarget, parse_operator_time};
use crate::error::EngineResult;
use crate::leave::{LeaveRequestInput, PolicyEntry};
use crate::models::{Actor, LeaveStatus};
use crate::store::LeaveRequestFilter;

/// Parses an optional operator timestamp. Self-service callers may not
/// backdate, so their value is dropped unparsed.
fn parse_optional_time(
    actor: &Actor,
    field: &str,
    value: Option<&str>,
    now: DateTime<Utc>,
) -> EngineResult<Option<DateTime<Utc>>> {
    if !actor.is_privileged() {
        return Ok(None);
    }
    value
        .map(|v| parse_operator_time(field, v, now))
        .transpose()
}

/// Request body for `POST /api/attendance/checkin`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckInRequest {
    /// The employee to check in; privileged callers only.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    /// Backdated check-in time; privileged callers only.
    #[serde(default)]
    pub check_in_at: Option<String>,
}

impl CheckInRequest {
    /// Parses the optional check-in time for `actor`.
    pub fn check_in_at(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<DateTime<Utc>>> {
        parse_optional_time(actor, "check_in_at", self.check_in_at.as_deref(), now)
    }
}

/// Request body for `POST /api/attendance/checkout`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftActionRequest {
    /// An explicit shift; privileged callers only.
    #[serde(default)]
    pub shift_id: Option<Uuid>,
    /// An employee whose open shift is meant; privileged callers only.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    /// Backdated check-out time; privileged callers only.
    #[serde(default)]
    pub check_out_at: Option<String>,
}

impl ShiftActionRequest {
    /// The shift this request targets.
    pub fn target(&self) -> ShiftTarget {
        ShiftTarget {
            shift_id: self.shift_id,
            employee_id: self.employee_id,
        }
    }

    /// Parses the optional check-out time for `actor`.
    pub fn check_out_at(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<DateTime<Utc>>> {
        parse_optional_time(actor, "check_out_at", self.check_out_at.as_deref(), now)
    }
}

/// Request body for break start and end. Breaks always use the current
/// time, so any other field is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakActionRequest {
    /// An explicit shift; privileged callers only.
    #[serde(default)]
    pub shift_id: Option<Uuid>,
    /// An employee whose open shift is meant; privileged callers only.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
}

impl BreakActionRequest {
    /// The shift this request targets.
    pub fn target(&self) -> ShiftTarget {
        ShiftTarget {
            shift_id: self.shift_id,
            employee_id: self.employee_id,
        }
    }
}

/// Request body for `POST /api/attendance/breaks/manual`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualBreakRequest {
    /// The shift the break belongs to.
    pub shift_id: Uuid,
    /// When the break started.
    pub break_start_at: String,
    /// When the break ended.
    pub break_end_at: String,
}

impl ManualBreakRequest {
    /// Parses both ends of the break.
    pub fn interval(&self, now: DateTime<Utc>) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((
            parse_operator_time("break_start_at", &self.break_start_at, now)?,
            parse_operator_time("break_end_at", &self.break_end_at, now)?,
        ))
    }
}

/// Query string for `GET /api/attendance`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftQuery {
    /// Restrict to one employee; ignored for self-service callers.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
}

/// Request body for `POST /api/leave/requests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeaveRequest {
    /// The employee the leave is for; privileged callers only.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    /// Type, dates and reason.
    #[serde(flatten)]
    pub leave: LeaveRequestInput,
}

/// Query string for `GET /api/leave/requests`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveRequestQuery {
    /// Restrict to one employee.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    /// Restrict to one status.
    #[serde(default)]
    pub status: Option<LeaveStatus>,
    /// Restrict to one year.
    #[serde(default)]
    pub year: Option<i32>,
}

impl From<LeaveRequestQuery> for LeaveRequestFilter {
    fn from(query: LeaveRequestQuery) -> Self {
        LeaveRequestFilter {
            employee_id: query.employee_id,
            status: query.status,
            year: query.year,
        }
    }
}

/// Query string for `GET /api/leave/balances`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceQuery {
    /// The leave year; defaults to the current year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Restrict to one employee; ignored for self-service callers.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
}

/// Query string for `GET /api/leave/policies`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyQuery {
    /// Restrict to one year.
    #[serde(default)]
    pub year: Option<i32>,
}

/// Request body for `PUT /api/leave/policies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePoliciesRequest {
    /// The year the totals apply to.
    pub year: i32,
    /// One entry per leave type to change.
    pub policies: Vec<PolicyEntry>,
}
