//! Entitlement resolution and proration.
//!
//! This module provides functions for determining how many leave days an
//! employee is granted for a (year, type): the policy override or built-in
//! default, scaled by the part of the year remaining after the hire date.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::EngineResult;
use crate::models::LeaveType;
use crate::store::Transaction;

/// Rounds to two decimal places, halves away from zero.
///
/// # Examples
///
/// ```
/// use workforce_engine::leave::round2;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round2(Decimal::new(5835, 4)), Decimal::new(58, 2));
/// assert_eq!(round2(Decimal::new(1005, 3)), Decimal::new(101, 2));
/// ```
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Scales an annual entitlement by the months remaining after hire.
///
/// # Arguments
///
/// * `entitlement` - The full-year entitlement in days
/// * `hired_at` - The employee's hire date, if recorded
/// * `year` - The leave year being computed
///
/// # Returns
///
/// - `entitlement` unchanged when there is no hire date or the employee was
///   hired before `year`
/// - zero when the employee is hired after `year`
/// - otherwise `round2(entitlement / 12 * (13 - hire_month))`; the hire month
///   counts in full
///
/// # Examples
///
/// ```
/// use workforce_engine::leave::prorate;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let hired = NaiveDate::from_ymd_opt(2024, 7, 1);
/// assert_eq!(prorate(Decimal::new(10, 0), hired, 2024), Decimal::new(500, 2));
/// assert_eq!(prorate(Decimal::new(10, 0), hired, 2025), Decimal::new(10, 0));
/// assert_eq!(prorate(Decimal::new(10, 0), hired, 2023), Decimal::ZERO);
/// ```
pub fn prorate(entitlement: Decimal, hired_at: Option<NaiveDate>, year: i32) -> Decimal {
    let Some(hired_at) = hired_at else {
        return entitlement;
    };
    if hired_at.year() < year {
        return entitlement;
    }
    if hired_at.year() > year {
        return Decimal::ZERO;
    }

    let months_remaining = (13 - hired_at.month() as i64).clamp(0, 12);
    round2(entitlement / Decimal::from(12) * Decimal::from(months_remaining))
}

/// Returns the entitlement for (year, type): the stored policy override if
/// one exists, else the type's built-in default.
pub fn resolve_entitlement(
    tx: &mut dyn Transaction,
    year: i32,
    leave_type: LeaveType,
) -> EngineResult<Decimal> {
    Ok(tx
        .find_policy(year, leave_type)?
        .map_or_else(|| leave_type.default_entitlement(), |policy| policy.total))
}
