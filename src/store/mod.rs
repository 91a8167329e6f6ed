//! Persistence boundary.
//!
//! The engines never touch storage directly: every read and write goes
//! through a [`Transaction`] opened from a [`Store`]. A transaction either
//! commits all of its writes or, when dropped without [`Transaction::commit`],
//! none of them.
//!
//! Implementations must enforce two exclusion constraints on insert:
//! at most one open shift per employee and at most one open break per shift.
//! Violations surface as [`EngineError::Conflict`](crate::error::EngineError::Conflict).

mod memory;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    Break, Employee, LeaveBalance, LeavePolicy, LeaveRequest, LeaveStatus, LeaveType, Shift,
};

pub use memory::MemoryStore;

/// Filter for listing leave requests. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveRequestFilter {
    /// Only requests of this employee.
    pub employee_id: Option<Uuid>,
    /// Only requests in this status.
    pub status: Option<LeaveStatus>,
    /// Only requests starting in this year.
    pub year: Option<i32>,
}

/// A source of transactions.
pub trait Store: Send + Sync {
    /// Opens a new transaction.
    fn begin(&self) -> EngineResult<Box<dyn Transaction + '_>>;
}

/// One atomic unit of work against the store.
///
/// Shifts are always returned with their breaks attached, ordered by
/// creation time.
pub trait Transaction {
    /// Loads a shift by id.
    fn find_shift(&mut self, id: Uuid) -> EngineResult<Option<Shift>>;

    /// Loads the employee's open shift, newest first if several exist.
    fn find_open_shift(&mut self, employee_id: Uuid) -> EngineResult<Option<Shift>>;

    /// Lists shifts, newest first, optionally restricted to one employee.
    fn list_shifts(&mut self, employee_id: Option<Uuid>) -> EngineResult<Vec<Shift>>;

    /// Lists open shifts whose check-in is strictly before `cutoff`.
    fn list_open_shifts_before(
        &mut self,
        cutoff: DateTime<Utc>,
        employee_id: Option<Uuid>,
    ) -> EngineResult<Vec<Shift>>;

    /// Counts the employee's shifts with a check-in in `[from, to)`.
    fn count_check_ins_between(
        &mut self,
        employee_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<usize>;

    /// Inserts a shift (its `breaks` are ignored).
    fn insert_shift(&mut self, shift: &Shift) -> EngineResult<()>;

    /// Persists the shift's own fields (its `breaks` are ignored).
    fn update_shift(&mut self, shift: &Shift) -> EngineResult<()>;

    /// Deletes a shift and its breaks. Returns false if it did not exist.
    fn delete_shift(&mut self, id: Uuid) -> EngineResult<bool>;

    /// Deletes every shift of an employee. Returns how many were removed.
    fn delete_employee_shifts(&mut self, employee_id: Uuid) -> EngineResult<usize>;

    /// Inserts a break under its shift.
    fn insert_break(&mut self, brk: &Break) -> EngineResult<()>;

    /// Persists a changed break.
    fn update_break(&mut self, brk: &Break) -> EngineResult<()>;

    /// Loads an employee record.
    fn find_employee(&mut self, id: Uuid) -> EngineResult<Option<Employee>>;

    /// Lists all employee records.
    fn list_employees(&mut self) -> EngineResult<Vec<Employee>>;

    /// Loads the policy override for (year, type).
    fn find_policy(&mut self, year: i32, leave_type: LeaveType)
    -> EngineResult<Option<LeavePolicy>>;

    /// Lists policy overrides, newest year first then by type.
    fn list_policies(&mut self, year: Option<i32>) -> EngineResult<Vec<LeavePolicy>>;

    /// Inserts or replaces the policy for its (year, type).
    fn upsert_policy(&mut self, policy: &LeavePolicy) -> EngineResult<()>;

    /// Loads the balance row for (employee, year, type).
    fn find_balance(
        &mut self,
        employee_id: Uuid,
        year: i32,
        leave_type: LeaveType,
    ) -> EngineResult<Option<LeaveBalance>>;

    /// Lists balances of one year, optionally narrowed by type and employee,
    /// ordered by type.
    fn list_balances(
        &mut self,
        year: i32,
        leave_type: Option<LeaveType>,
        employee_id: Option<Uuid>,
    ) -> EngineResult<Vec<LeaveBalance>>;

    /// Inserts a balance row; fails with `Conflict` if one exists for its key.
    fn insert_balance(&mut self, balance: &LeaveBalance) -> EngineResult<()>;

    /// Persists a changed balance row.
    fn update_balance(&mut self, balance: &LeaveBalance) -> EngineResult<()>;

    /// Loads a leave request.
    fn find_leave_request(&mut self, id: Uuid) -> EngineResult<Option<LeaveRequest>>;

    /// Lists leave requests matching `filter`, newest first.
    fn list_leave_requests(&mut self, filter: &LeaveRequestFilter)
    -> EngineResult<Vec<LeaveRequest>>;

    /// Inserts a leave request.
    fn insert_leave_request(&mut self, request: &LeaveRequest) -> EngineResult<()>;

    /// Persists a changed leave request.
    fn update_leave_request(&mut self, request: &LeaveRequest) -> EngineResult<()>;

    /// Deletes a leave request. Returns false if it did not exist.
    fn delete_leave_request(&mut self, id: Uuid) -> EngineResult<bool>;

    /// Publishes every write made through this transaction.
    fn commit(self: Box<Self>) -> EngineResult<()>;
}
