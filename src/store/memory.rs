//! In-process store.
//!
//! Transactions are serialized behind a single mutex and work on a private
//! copy of the tables, so concurrent callers observe serializable isolation
//! and an uncommitted transaction leaves no trace.
//!
//! Each table sits behind an `Arc` and is copied on first write, so `begin`
//! costs a reference count per table and a transaction pays O(rows) only for
//! the tables it modifies. Writers still queue on the one mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Break, Employee, LeaveBalance, LeavePolicy, LeaveRequest, LeaveType, Shift,
};

use super::{LeaveRequestFilter, Store, Transaction};

/// A table shared between the committed state and open transactions.
type Table<K, V> = Arc<HashMap<K, V>>;

#[derive(Debug, Clone, Default)]
struct Tables {
    shifts: Table<Uuid, Shift>,
    breaks: Table<Uuid, Break>,
    employees: Table<Uuid, Employee>,
    policies: Table<(i32, LeaveType), LeavePolicy>,
    balances: Table<(Uuid, i32, LeaveType), LeaveBalance>,
    requests: Table<Uuid, LeaveRequest>,
}

impl Tables {
    /// Returns the shift with its breaks attached in creation order.
    fn hydrate(&self, shift: &Shift) -> Shift {
        let mut breaks: Vec<Break> = self
            .breaks
            .values()
            .filter(|b| b.shift_id == shift.id)
            .cloned()
            .collect();
        breaks.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.break_start.cmp(&b.break_start))
        });

        let mut hydrated = shift.clone();
        hydrated.breaks = breaks;
        hydrated
    }

    fn hydrate_all<'a>(&self, shifts: impl Iterator<Item = &'a Shift>) -> Vec<Shift> {
        let mut result: Vec<Shift> = shifts.map(|s| self.hydrate(s)).collect();
        result.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.check_in.cmp(&a.check_in))
        });
        result
    }

    fn remove_shift(&mut self, id: Uuid) -> bool {
        if !self.shifts.contains_key(&id) {
            return false;
        }
        Arc::make_mut(&mut self.shifts).remove(&id);
        if self.breaks.values().any(|b| b.shift_id == id) {
            Arc::make_mut(&mut self.breaks).retain(|_, b| b.shift_id != id);
        }
        true
    }
}

/// A [`Store`] that keeps everything in memory.
///
/// # Example
///
/// ```
/// use workforce_engine::store::{MemoryStore, Store};
/// use workforce_engine::models::Employee;
/// use uuid::Uuid;
///
/// let store = MemoryStore::new();
/// let id = Uuid::new_v4();
/// store.insert_employee(Employee {
///     id,
///     first_name: "Grace".to_string(),
///     last_name: "Hopper".to_string(),
///     hired_at: None,
/// })?;
///
/// let mut tx = store.begin()?;
/// assert!(tx.find_employee(id)?.is_some());
/// # Ok::<(), workforce_engine::error::EngineError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee record.
    ///
    /// Employee records are maintained outside the engine; this is the
    /// seeding hook for them.
    pub fn insert_employee(&self, employee: Employee) -> EngineResult<()> {
        let mut tables = self.lock()?;
        Arc::make_mut(&mut tables.employees).insert(employee.id, employee);
        Ok(())
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| EngineError::internal("store lock poisoned"))
    }
}

impl Store for MemoryStore {
    fn begin(&self) -> EngineResult<Box<dyn Transaction + '_>> {
        let guard = self.lock()?;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction<'a> {
    guard: MutexGuard<'a, Tables>,
    working: Tables,
}

impl Transaction for MemoryTransaction<'_> {
    fn find_shift(&mut self, id: Uuid) -> EngineResult<Option<Shift>> {
        Ok(self.working.shifts.get(&id).map(|s| self.working.hydrate(s)))
    }

    fn find_open_shift(&mut self, employee_id: Uuid) -> EngineResult<Option<Shift>> {
        Ok(self
            .working
            .shifts
            .values()
            .filter(|s| s.employee_id == employee_id && s.is_open())
            .max_by_key(|s| s.created_at)
            .map(|s| self.working.hydrate(s)))
    }

    fn list_shifts(&mut self, employee_id: Option<Uuid>) -> EngineResult<Vec<Shift>> {
        let shifts = self
            .working
            .shifts
            .values()
            .filter(|s| employee_id.is_none_or(|id| s.employee_id == id));
        Ok(self.working.hydrate_all(shifts))
    }

    fn list_open_shifts_before(
        &mut self,
        cutoff: DateTime<Utc>,
        employee_id: Option<Uuid>,
    ) -> EngineResult<Vec<Shift>> {
        let shifts = self.working.shifts.values().filter(|s| {
            s.is_open()
                && s.check_in < cutoff
                && employee_id.is_none_or(|id| s.employee_id == id)
        });
        Ok(self.working.hydrate_all(shifts))
    }

    fn count_check_ins_between(
        &mut self,
        employee_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<usize> {
        Ok(self
            .working
            .shifts
            .values()
            .filter(|s| s.employee_id == employee_id && s.check_in >= from && s.check_in < to)
            .count())
    }

    fn insert_shift(&mut self, shift: &Shift) -> EngineResult<()> {
        if shift.is_open()
            && self
                .working
                .shifts
                .values()
                .any(|s| s.employee_id == shift.employee_id && s.is_open())
        {
            return Err(EngineError::conflict("open shift exists"));
        }

        let mut row = shift.clone();
        row.breaks.clear();
        Arc::make_mut(&mut self.working.shifts).insert(row.id, row);
        Ok(())
    }

    fn update_shift(&mut self, shift: &Shift) -> EngineResult<()> {
        let row = Arc::make_mut(&mut self.working.shifts)
            .get_mut(&shift.id)
            .ok_or_else(|| EngineError::not_found("shift"))?;
        row.check_in = shift.check_in;
        row.check_out = shift.check_out;
        Ok(())
    }

    fn delete_shift(&mut self, id: Uuid) -> EngineResult<bool> {
        Ok(self.working.remove_shift(id))
    }

    fn delete_employee_shifts(&mut self, employee_id: Uuid) -> EngineResult<usize> {
        let ids: Vec<Uuid> = self
            .working
            .shifts
            .values()
            .filter(|s| s.employee_id == employee_id)
            .map(|s| s.id)
            .collect();
        for id in &ids {
            self.working.remove_shift(*id);
        }
        Ok(ids.len())
    }

    fn insert_break(&mut self, brk: &Break) -> EngineResult<()> {
        if !self.working.shifts.contains_key(&brk.shift_id) {
            return Err(EngineError::not_found("shift"));
        }
        if brk.is_open()
            && self
                .working
                .breaks
                .values()
                .any(|b| b.shift_id == brk.shift_id && b.is_open())
        {
            return Err(EngineError::conflict("break already active"));
        }
        Arc::make_mut(&mut self.working.breaks).insert(brk.id, brk.clone());
        Ok(())
    }

    fn update_break(&mut self, brk: &Break) -> EngineResult<()> {
        let row = Arc::make_mut(&mut self.working.breaks)
            .get_mut(&brk.id)
            .ok_or_else(|| EngineError::not_found("break"))?;
        *row = brk.clone();
        Ok(())
    }

    fn find_employee(&mut self, id: Uuid) -> EngineResult<Option<Employee>> {
        Ok(self.working.employees.get(&id).cloned())
    }

    fn list_employees(&mut self) -> EngineResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = self.working.employees.values().cloned().collect();
        employees.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(employees)
    }

    fn find_policy(
        &mut self,
        year: i32,
        leave_type: LeaveType,
    ) -> EngineResult<Option<LeavePolicy>> {
        Ok(self.working.policies.get(&(year, leave_type)).cloned())
    }

    fn list_policies(&mut self, year: Option<i32>) -> EngineResult<Vec<LeavePolicy>> {
        let mut policies: Vec<LeavePolicy> = self
            .working
            .policies
            .values()
            .filter(|p| year.is_none_or(|y| p.year == y))
            .cloned()
            .collect();
        policies.sort_by(|a, b| b.year.cmp(&a.year).then(a.leave_type.cmp(&b.leave_type)));
        Ok(policies)
    }

    fn upsert_policy(&mut self, policy: &LeavePolicy) -> EngineResult<()> {
        Arc::make_mut(&mut self.working.policies)
            .insert((policy.year, policy.leave_type), policy.clone());
        Ok(())
    }

    fn find_balance(
        &mut self,
        employee_id: Uuid,
        year: i32,
        leave_type: LeaveType,
    ) -> EngineResult<Option<LeaveBalance>> {
        Ok(self
            .working
            .balances
            .get(&(employee_id, year, leave_type))
            .cloned())
    }

    fn list_balances(
        &mut self,
        year: i32,
        leave_type: Option<LeaveType>,
        employee_id: Option<Uuid>,
    ) -> EngineResult<Vec<LeaveBalance>> {
        let mut balances: Vec<LeaveBalance> = self
            .working
            .balances
            .values()
            .filter(|b| {
                b.year == year
                    && leave_type.is_none_or(|t| b.leave_type == t)
                    && employee_id.is_none_or(|id| b.employee_id == id)
            })
            .cloned()
            .collect();
        balances.sort_by(|a, b| {
            (a.leave_type, a.employee_id).cmp(&(b.leave_type, b.employee_id))
        });
        Ok(balances)
    }

    fn insert_balance(&mut self, balance: &LeaveBalance) -> EngineResult<()> {
        let key = (balance.employee_id, balance.year, balance.leave_type);
        if self.working.balances.contains_key(&key) {
            return Err(EngineError::conflict("leave balance already exists"));
        }
        Arc::make_mut(&mut self.working.balances).insert(key, balance.clone());
        Ok(())
    }

    fn update_balance(&mut self, balance: &LeaveBalance) -> EngineResult<()> {
        let key = (balance.employee_id, balance.year, balance.leave_type);
        let row = Arc::make_mut(&mut self.working.balances)
            .get_mut(&key)
            .ok_or_else(|| EngineError::not_found("leave balance"))?;
        *row = balance.clone();
        Ok(())
    }

    fn find_leave_request(&mut self, id: Uuid) -> EngineResult<Option<LeaveRequest>> {
        Ok(self.working.requests.get(&id).cloned())
    }

    fn list_leave_requests(
        &mut self,
        filter: &LeaveRequestFilter,
    ) -> EngineResult<Vec<LeaveRequest>> {
        let mut requests: Vec<LeaveRequest> = self
            .working
            .requests
            .values()
            .filter(|r| {
                filter.employee_id.is_none_or(|id| r.employee_id == id)
                    && filter.status.is_none_or(|s| r.status == s)
                    && filter.year.is_none_or(|y| r.balance_year() == y)
            })
            .cloned()
            .collect();
        requests.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.start_date.cmp(&a.start_date))
        });
        Ok(requests)
    }

    fn insert_leave_request(&mut self, request: &LeaveRequest) -> EngineResult<()> {
        Arc::make_mut(&mut self.working.requests).insert(request.id, request.clone());
        Ok(())
    }

    fn update_leave_request(&mut self, request: &LeaveRequest) -> EngineResult<()> {
        let row = Arc::make_mut(&mut self.working.requests)
            .get_mut(&request.id)
            .ok_or_else(|| EngineError::not_found("leave request"))?;
        *row = request.clone();
        Ok(())
    }

    fn delete_leave_request(&mut self, id: Uuid) -> EngineResult<bool> {
        if !self.working.requests.contains_key(&id) {
            return Ok(false);
        }
        Ok(Arc::make_mut(&mut self.working.requests).remove(&id).is_some())
    }

    fn commit(self: Box<Self>) -> EngineResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
