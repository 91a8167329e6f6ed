//! Expiry sweep for shifts left open past the maximum shift length.
//!
//! The sweep is not scheduled; it runs synchronously wherever a possibly
//! stale open shift is about to be read. Closing is idempotent: a shift that
//! is already closed is left untouched.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::Shift;
use crate::store::Transaction;

use super::AttendanceService;

/// Closes `shift` at its deadline if it has expired by `now`.
///
/// Returns true if the shift is closed afterwards (whether it was closed
/// here or already), false if it is open and still within its limit.
/// Break corrections are written before the shift.
pub(crate) fn close_if_expired(
    tx: &mut dyn Transaction,
    shift: &mut Shift,
    max_shift: Duration,
    now: DateTime<Utc>,
) -> EngineResult<bool> {
    if !shift.is_open() {
        return Ok(true);
    }
    if !shift.is_expired(max_shift, now) {
        return Ok(false);
    }

    let closed_at = shift.deadline(max_shift);
    for brk in shift.close_at(closed_at) {
        tx.update_break(&brk)?;
    }
    tx.update_shift(shift)?;

    info!(
        shift_id = %shift.id,
        employee_id = %shift.employee_id,
        closed_at = %closed_at,
        "Auto-closed expired shift"
    );
    Ok(true)
}

impl AttendanceService {
    /// Closes every expired open shift, optionally for one employee only.
    ///
    /// Each shift is corrected in its own transaction; a failure is logged
    /// and skipped. Returns how many shifts were closed.
    pub fn sweep_expired(&self, employee_id: Option<Uuid>) -> EngineResult<usize> {
        let now = self.clock.now();
        let cutoff = now - self.max_shift();

        let candidates = {
            let mut tx = self.store.begin()?;
            tx.list_open_shifts_before(cutoff, employee_id)?
        };

        let mut closed = 0;
        for shift in candidates {
            match self.close_expired_shift(shift.id, now) {
                Ok(true) => closed += 1,
                Ok(false) => {}
                Err(err) => warn!(
                    shift_id = %shift.id,
                    error = %err,
                    "Expiry correction failed"
                ),
            }
        }
        Ok(closed)
    }

    /// Reloads and closes one shift if it is still open and expired.
    fn close_expired_shift(&self, shift_id: Uuid, now: DateTime<Utc>) -> EngineResult<bool> {
        let mut tx = self.store.begin()?;
        let Some(mut shift) = tx.find_shift(shift_id)? else {
            return Ok(false);
        };
        if !shift.is_expired(self.max_shift(), now) {
            return Ok(false);
        }
        close_if_expired(tx.as_mut(), &mut shift, self.max_shift(), now)?;
        tx.commit()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Break;
    use crate::store::{MemoryStore, Store};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_expired_shift_closes_at_deadline_with_breaks() {
        let store = MemoryStore::new();
        let mut shift = Shift::open(Uuid::new_v4(), t0(), t0());
        let brk = Break::new(shift.id, t0() + Duration::hours(2), None, t0());

        let mut tx = store.begin().unwrap();
        tx.insert_shift(&shift).unwrap();
        tx.insert_break(&brk).unwrap();
        shift.breaks.push(brk);

        let now = t0() + Duration::hours(15);
        let closed = close_if_expired(tx.as_mut(), &mut shift, Duration::hours(14), now).unwrap();
        tx.commit().unwrap();

        assert!(closed);
        let mut tx = store.begin().unwrap();
        let stored = tx.find_shift(shift.id).unwrap().unwrap();
        assert_eq!(stored.check_out, Some(t0() + Duration::hours(14)));
        assert_eq!(
            stored.breaks[0].break_end,
            Some(t0() + Duration::hours(14))
        );
    }

    #[test]
    fn test_fresh_shift_stays_open() {
        let store = MemoryStore::new();
        let mut shift = Shift::open(Uuid::new_v4(), t0(), t0());
        let mut tx = store.begin().unwrap();
        tx.insert_shift(&shift).unwrap();

        let now = t0() + Duration::hours(14);
        let closed = close_if_expired(tx.as_mut(), &mut shift, Duration::hours(14), now).unwrap();
        assert!(!closed);
        assert!(shift.is_open());
    }

    #[test]
    fn test_closed_shift_is_untouched() {
        let store = MemoryStore::new();
        let mut shift = Shift::open(Uuid::new_v4(), t0(), t0());
        shift.check_out = Some(t0() + Duration::hours(8));
        let before = shift.clone();
        let mut tx = store.begin().unwrap();

        let now = t0() + Duration::hours(40);
        assert!(close_if_expired(tx.as_mut(), &mut shift, Duration::hours(14), now).unwrap());
        assert_eq!(shift, before);
    }
}
