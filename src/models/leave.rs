//! Leave models: types, policies, balances and requests.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The closed set of leave types the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Sick leave.
    Sick,
    /// Casual leave.
    Casual,
}

impl LeaveType {
    /// Every leave type, in display order.
    pub const ALL: [LeaveType; 2] = [LeaveType::Sick, LeaveType::Casual];

    /// The built-in annual entitlement in days when no policy overrides it.
    ///
    /// ```
    /// use workforce_engine::models::LeaveType;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(LeaveType::Sick.default_entitlement(), Decimal::new(10, 0));
    /// assert_eq!(LeaveType::Casual.default_entitlement(), Decimal::new(7, 0));
    /// ```
    pub const fn default_entitlement(self) -> Decimal {
        match self {
            LeaveType::Sick => Decimal::from_parts(10, 0, 0, false, 0),
            LeaveType::Casual => Decimal::from_parts(7, 0, 0, false, 0),
        }
    }

    /// The wire name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            LeaveType::Sick => "sick",
            LeaveType::Casual => "casual",
        }
    }
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; its days are counted in the balance.
    Approved,
    /// Rejected; does not block overlapping requests.
    Rejected,
}

impl LeaveStatus {
    /// Returns true if a decision may move a request from `self` to `target`.
    ///
    /// Re-applying the current status is always allowed and is a no-op for
    /// the balance.
    pub fn can_transition_to(self, target: LeaveStatus) -> bool {
        use LeaveStatus::*;
        self == target
            || matches!(
                (self, target),
                (Pending, Approved) | (Pending, Rejected) | (Approved, Pending) | (Approved, Rejected)
                    | (Rejected, Pending)
            )
    }

    /// The wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An override of the default entitlement for one (year, type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeavePolicy {
    /// Unique identifier for the policy row.
    pub id: Uuid,
    /// The calendar year the policy applies to.
    pub year: i32,
    /// The leave type the policy applies to.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// Annual entitlement in days.
    pub total: Decimal,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Granted vs. consumed days for one (employee, year, type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Unique identifier for the balance row.
    pub id: Uuid,
    /// The employee the balance belongs to.
    pub employee_id: Uuid,
    /// The calendar year.
    pub year: i32,
    /// The leave type.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// Prorated entitlement in days.
    pub total: Decimal,
    /// Days consumed by approved requests.
    pub used: Decimal,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last changed.
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    /// Days still available.
    pub fn remaining(&self) -> Decimal {
        self.total - self.used
    }
}

/// An employee's request for leave over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The requesting employee.
    pub employee_id: Uuid,
    /// The leave type requested.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Inclusive day count of the range.
    pub days: Decimal,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
    /// Decision state.
    pub status: LeaveStatus,
    /// The user who approved the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_id: Option<Uuid>,
    /// When the last approve/reject decision was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last changed.
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// The year whose balance this request draws from.
    pub fn balance_year(&self) -> i32 {
        self.start_date.year()
    }

    /// Inclusive overlap test against `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    /// Returns true if this request blocks overlapping requests.
    pub fn is_active(&self) -> bool {
        self.status != LeaveStatus::Rejected
    }
}

/// A validated leave date range within one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveSpan {
    /// First day of leave.
    pub start: NaiveDate,
    /// Last day of leave (inclusive).
    pub end: NaiveDate,
}

impl LeaveSpan {
    /// Validates ordering and same-year containment.
    ///
    /// ```
    /// use workforce_engine::models::LeaveSpan;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    /// let span = LeaveSpan::new(start, end).unwrap();
    /// assert_eq!(span.days(), 3);
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::invalid_input(
                "end_date must not be before start_date",
            ));
        }
        if start.year() != end.year() {
            return Err(EngineError::invalid_input(
                "leave must be within the same year",
            ));
        }
        Ok(Self { start, end })
    }

    /// Inclusive day count.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The calendar year of the span.
    pub fn year(&self) -> i32 {
        self.start.year()
    }
}
