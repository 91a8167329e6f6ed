//! Per-employee leave balance ledger.
//!
//! A balance's `total` is derived state: it is recomputed from the current
//! policy and the employee's hire date every time the balance is read, and
//! written back when it has drifted. `used` only moves through
//! [`consume`] and [`release`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, LeaveBalance, LeaveType};
use crate::store::Transaction;

use super::policy::{prorate, resolve_entitlement};

/// Loads or creates the balance for (employee, year, type) and repairs its
/// total against the current entitlement.
///
/// Never changes `used`.
pub fn ensure_balance(
    tx: &mut dyn Transaction,
    employee_id: Uuid,
    year: i32,
    leave_type: LeaveType,
    now: DateTime<Utc>,
) -> EngineResult<LeaveBalance> {
    let employee = tx
        .find_employee(employee_id)?
        .ok_or_else(|| EngineError::not_found("employee"))?;
    let total = entitled_total(tx, &employee, year, leave_type)?;

    match tx.find_balance(employee_id, year, leave_type)? {
        Some(mut balance) => {
            if balance.total != total {
                debug!(
                    employee_id = %employee_id,
                    year,
                    leave_type = %leave_type,
                    old_total = %balance.total,
                    new_total = %total,
                    "Repaired leave balance total"
                );
                balance.total = total;
                balance.updated_at = now;
                tx.update_balance(&balance)?;
            }
            Ok(balance)
        }
        None => {
            let balance = LeaveBalance {
                id: Uuid::new_v4(),
                employee_id,
                year,
                leave_type,
                total,
                used: Decimal::ZERO,
                created_at: now,
                updated_at: now,
            };
            tx.insert_balance(&balance)?;
            Ok(balance)
        }
    }
}

/// Recomputes the total of every stored balance at (year, type).
///
/// Used after a policy change. Returns how many rows changed.
pub fn recompute_totals(
    tx: &mut dyn Transaction,
    year: i32,
    leave_type: LeaveType,
    now: DateTime<Utc>,
) -> EngineResult<usize> {
    let entitlement = resolve_entitlement(tx, year, leave_type)?;
    let mut changed = 0;

    for mut balance in tx.list_balances(year, Some(leave_type), None)? {
        let hired_at = tx
            .find_employee(balance.employee_id)?
            .and_then(|employee| employee.hired_at);
        let total = prorate(entitlement, hired_at, year);
        if balance.total != total {
            balance.total = total;
            balance.updated_at = now;
            tx.update_balance(&balance)?;
            changed += 1;
        }
    }

    info!(year, leave_type = %leave_type, changed, "Recomputed leave balances");
    Ok(changed)
}

/// Books `days` against the balance.
///
/// Fails with `Conflict` if the balance would be overdrawn.
pub fn consume(balance: &mut LeaveBalance, days: Decimal, now: DateTime<Utc>) -> EngineResult<()> {
    if balance.used + days > balance.total {
        return Err(EngineError::conflict("insufficient balance"));
    }
    balance.used += days;
    balance.updated_at = now;
    Ok(())
}

/// Returns `days` to the balance; `used` never drops below zero.
pub fn release(balance: &mut LeaveBalance, days: Decimal, now: DateTime<Utc>) {
    balance.used = (balance.used - days).max(Decimal::ZERO);
    balance.updated_at = now;
}

/// Fails with `Conflict` unless `days` more fit into the balance.
pub fn ensure_available(balance: &LeaveBalance, days: Decimal) -> EngineResult<()> {
    if balance.remaining() < days {
        Err(EngineError::conflict("insufficient balance"))
    } else {
        Ok(())
    }
}

fn entitled_total(
    tx: &mut dyn Transaction,
    employee: &Employee,
    year: i32,
    leave_type: LeaveType,
) -> EngineResult<Decimal> {
    let entitlement = resolve_entitlement(tx, year, leave_type)?;
    Ok(prorate(entitlement, employee.hired_at, year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeavePolicy;
    use crate::store::{MemoryStore, Store};
    use chrono::NaiveDate;

    fn seeded(hired_at: Option<NaiveDate>) -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .insert_employee(Employee {
                id,
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                hired_at,
            })
            .unwrap();
        (store, id)
    }

    fn balance(total: i64, used: i64) -> LeaveBalance {
        let now = Utc::now();
        LeaveBalance {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            year: 2026,
            leave_type: LeaveType::Sick,
            total: Decimal::from(total),
            used: Decimal::from(used),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_ensure_balance_creates_prorated_row() {
        let (store, id) = seeded(NaiveDate::from_ymd_opt(2026, 7, 1));
        let mut tx = store.begin().unwrap();

        let created = ensure_balance(tx.as_mut(), id, 2026, LeaveType::Sick, Utc::now()).unwrap();
        assert_eq!(created.total, Decimal::new(5, 0));
        assert_eq!(created.used, Decimal::ZERO);

        let again = ensure_balance(tx.as_mut(), id, 2026, LeaveType::Sick, Utc::now()).unwrap();
        assert_eq!(again.id, created.id);
    }

    #[test]
    fn test_ensure_balance_unknown_employee() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        let err = ensure_balance(tx.as_mut(), Uuid::new_v4(), 2026, LeaveType::Sick, Utc::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "employee not found");
    }

    #[test]
    fn test_ensure_balance_repairs_total_but_keeps_used() {
        let (store, id) = seeded(None);
        let mut tx = store.begin().unwrap();
        let mut row = ensure_balance(tx.as_mut(), id, 2026, LeaveType::Casual, Utc::now()).unwrap();
        row.used = Decimal::new(4, 0);
        row.total = Decimal::new(99, 0);
        tx.update_balance(&row).unwrap();

        let repaired = ensure_balance(tx.as_mut(), id, 2026, LeaveType::Casual, Utc::now()).unwrap();
        assert_eq!(repaired.total, Decimal::new(7, 0));
        assert_eq!(repaired.used, Decimal::new(4, 0));
    }

    #[test]
    fn test_recompute_totals_applies_policy() {
        let (store, id) = seeded(NaiveDate::from_ymd_opt(2026, 7, 1));
        let mut tx = store.begin().unwrap();
        ensure_balance(tx.as_mut(), id, 2026, LeaveType::Sick, Utc::now()).unwrap();

        let now = Utc::now();
        tx.upsert_policy(&LeavePolicy {
            id: Uuid::new_v4(),
            year: 2026,
            leave_type: LeaveType::Sick,
            total: Decimal::new(24, 0),
            created_at: now,
            updated_at: now,
        })
        .unwrap();

        assert_eq!(recompute_totals(tx.as_mut(), 2026, LeaveType::Sick, now).unwrap(), 1);
        let row = tx.find_balance(id, 2026, LeaveType::Sick).unwrap().unwrap();
        assert_eq!(row.total, Decimal::new(12, 0));
    }

    #[test]
    fn test_consume_rejects_overdraw() {
        let mut b = balance(10, 8);
        let err = consume(&mut b, Decimal::new(3, 0), Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Conflict: insufficient balance");
        assert_eq!(b.used, Decimal::new(8, 0));

        consume(&mut b, Decimal::new(2, 0), Utc::now()).unwrap();
        assert_eq!(b.used, Decimal::new(10, 0));
    }

    #[test]
    fn test_release_floors_at_zero() {
        let mut b = balance(10, 2);
        release(&mut b, Decimal::new(5, 0), Utc::now());
        assert_eq!(b.used, Decimal::ZERO);
    }

    #[test]
    fn test_ensure_available() {
        let b = balance(10, 8);
        assert!(ensure_available(&b, Decimal::new(2, 0)).is_ok());
        assert!(ensure_available(&b, Decimal::new(3, 0)).is_err());
    }
}
