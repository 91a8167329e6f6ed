//! Shift model and related types.
//!
//! This module defines the Shift and Break structs that record attendance
//! intervals: one check-in/check-out span per shift, with nested breaks.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A break taken during a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Break {
    /// Unique identifier for the break.
    pub id: Uuid,
    /// The shift this break belongs to.
    pub shift_id: Uuid,
    /// When the break started.
    pub break_start: DateTime<Utc>,
    /// When the break ended; `None` while the break is still running.
    pub break_end: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Break {
    /// Creates a new break record with a fresh id.
    pub fn new(
        shift_id: Uuid,
        break_start: DateTime<Utc>,
        break_end: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            shift_id,
            break_start,
            break_end,
            created_at,
        }
    }

    /// Returns true if the break has not ended yet.
    pub fn is_open(&self) -> bool {
        self.break_end.is_none()
    }

    /// Half-open overlap test against `[start, end)`.
    ///
    /// An open break never overlaps by this test; callers reject open breaks
    /// separately.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        match self.break_end {
            Some(existing_end) => start < existing_end && end > self.break_start,
            None => false,
        }
    }

    /// Returns the duration of a closed break in minutes.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.break_end
            .map(|end| (end - self.break_start).num_minutes())
    }
}

/// One continuous attendance record from check-in to check-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: Uuid,
    /// The employee who worked the shift.
    pub employee_id: Uuid,
    /// When the employee checked in.
    pub check_in: DateTime<Utc>,
    /// When the employee checked out; `None` while the shift is open.
    pub check_out: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Breaks taken during the shift, ordered by creation time.
    #[serde(default)]
    pub breaks: Vec<Break>,
}

impl Shift {
    /// Creates a new open shift with a fresh id and no breaks.
    pub fn open(employee_id: Uuid, check_in: DateTime<Utc>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            check_in,
            check_out: None,
            created_at,
            breaks: Vec::new(),
        }
    }

    /// Returns true if the shift has not been checked out.
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    /// The latest instant this shift may be closed at.
    pub fn deadline(&self, max_shift: Duration) -> DateTime<Utc> {
        self.check_in + max_shift
    }

    /// Returns true if the shift is open and has run past `max_shift` at `now`.
    pub fn is_expired(&self, max_shift: Duration, now: DateTime<Utc>) -> bool {
        self.is_open() && self.deadline(max_shift) < now
    }

    /// Returns the currently running break, if any.
    ///
    /// When several are open (only possible with corrupted data) the most
    /// recently created one wins.
    pub fn open_break(&self) -> Option<&Break> {
        self.breaks
            .iter()
            .filter(|b| b.is_open())
            .max_by_key(|b| b.created_at)
    }

    /// Clamps `instant` into `[check_in, check_out]`, or `[check_in, ∞)`
    /// while the shift is open.
    pub fn clamp_to_span(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let upper = self.check_out.map_or(instant, |out| instant.min(out));
        upper.max(self.check_in)
    }

    /// Closes the shift at `at` and pulls every break inside it.
    ///
    /// Open breaks end at `at`; breaks reaching past `at` are cut back to it.
    /// Returns the breaks that changed, which must be persisted before the
    /// shift itself. `at` must not precede `check_in`.
    pub fn close_at(&mut self, at: DateTime<Utc>) -> Vec<Break> {
        let check_in = self.check_in;
        self.check_out = Some(at);

        let mut changed = Vec::new();
        for brk in &mut self.breaks {
            let start = brk.break_start.min(at).max(check_in);
            let end = brk.break_end.map_or(at, |end| end.min(at)).max(start);
            if start != brk.break_start || brk.break_end != Some(end) {
                brk.break_start = start;
                brk.break_end = Some(end);
                changed.push(brk.clone());
            }
        }
        changed
    }

    /// Calculates the worked hours of a closed shift.
    ///
    /// The elapsed time between check-in and check-out minus all closed
    /// breaks. Returns `None` while the shift is open.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::models::{Break, Shift};
    /// use chrono::{Duration, TimeZone, Utc};
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let check_in = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
    /// let mut shift = Shift::open(Uuid::new_v4(), check_in, check_in);
    /// shift.check_out = Some(check_in + Duration::hours(8));
    /// shift.breaks.push(Break::new(
    ///     shift.id,
    ///     check_in + Duration::hours(4),
    ///     Some(check_in + Duration::minutes(270)),
    ///     check_in,
    /// ));
    /// assert_eq!(shift.worked_hours(), Some(Decimal::new(75, 1))); // 7.5 hours
    /// ```
    pub fn worked_hours(&self) -> Option<Decimal> {
        let check_out = self.check_out?;
        let total_minutes = (check_out - self.check_in).num_minutes();

        let break_minutes: i64 = self
            .breaks
            .iter()
            .filter_map(Break::duration_minutes)
            .sum();

        let worked_minutes = (total_minutes - break_minutes).max(0);
        Some(Decimal::new(worked_minutes, 0) / Decimal::new(60, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, hour, minute, 0).unwrap()
    }

    fn closed_break(shift_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Break {
        Break::new(shift_id, start, Some(end), start)
    }

    #[test]
    fn test_new_shift_is_open() {
        let shift = Shift::open(Uuid::new_v4(), at(9, 0), at(9, 0));
        assert!(shift.is_open());
        assert!(shift.breaks.is_empty());
        assert_eq!(shift.worked_hours(), None);
    }

    #[test]
    fn test_worked_hours_without_breaks() {
        let mut shift = Shift::open(Uuid::new_v4(), at(9, 0), at(9, 0));
        shift.check_out = Some(at(17, 0));
        assert_eq!(shift.worked_hours(), Some(Decimal::new(8, 0)));
    }

    #[test]
    fn test_worked_hours_subtracts_multiple_breaks() {
        let mut shift = Shift::open(Uuid::new_v4(), at(8, 0), at(8, 0));
        shift.check_out = Some(at(18, 0));
        shift.breaks = vec![
            closed_break(shift.id, at(10, 0), at(10, 15)),
            closed_break(shift.id, at(12, 0), at(12, 30)),
        ];
        // 600 - 45 = 555 minutes
        assert_eq!(shift.worked_hours(), Some(Decimal::new(925, 2)));
    }

    #[test]
    fn test_expiry_is_strictly_after_deadline() {
        let shift = Shift::open(Uuid::new_v4(), at(0, 0), at(0, 0));
        let max = Duration::hours(14);
        assert!(!shift.is_expired(max, at(14, 0)));
        assert!(shift.is_expired(max, at(14, 1)));
    }

    #[test]
    fn test_closed_shift_never_expires() {
        let mut shift = Shift::open(Uuid::new_v4(), at(0, 0), at(0, 0));
        shift.check_out = Some(at(8, 0));
        assert!(!shift.is_expired(Duration::hours(14), at(23, 0)));
    }

    #[test]
    fn test_break_overlap_is_half_open() {
        let shift_id = Uuid::new_v4();
        let existing = closed_break(shift_id, at(9, 0), at(9, 30));

        assert!(existing.overlaps(at(9, 15), at(9, 45)));
        assert!(existing.overlaps(at(8, 45), at(9, 15)));
        assert!(!existing.overlaps(at(9, 30), at(10, 0)));
        assert!(!existing.overlaps(at(8, 30), at(9, 0)));
    }

    #[test]
    fn test_open_break_picks_latest_created() {
        let mut shift = Shift::open(Uuid::new_v4(), at(9, 0), at(9, 0));
        shift
            .breaks
            .push(closed_break(shift.id, at(10, 0), at(10, 10)));
        let mut running = Break::new(shift.id, at(11, 0), None, at(11, 0));
        running.created_at = at(11, 0);
        shift.breaks.push(running.clone());

        assert_eq!(shift.open_break().map(|b| b.id), Some(running.id));
    }

    #[test]
    fn test_close_at_ends_open_break_and_clamps_overshoot() {
        let mut shift = Shift::open(Uuid::new_v4(), at(8, 0), at(8, 0));
        let untouched = closed_break(shift.id, at(10, 0), at(10, 15));
        let overshoot = closed_break(shift.id, at(15, 30), at(16, 30));
        let running = Break::new(shift.id, at(15, 45), None, at(15, 45));
        shift.breaks = vec![untouched.clone(), overshoot.clone(), running.clone()];

        let changed = shift.close_at(at(16, 0));

        assert_eq!(shift.check_out, Some(at(16, 0)));
        assert_eq!(changed.len(), 2);
        assert_eq!(shift.breaks[0], untouched);
        assert_eq!(shift.breaks[1].break_end, Some(at(16, 0)));
        assert_eq!(shift.breaks[2].break_end, Some(at(16, 0)));
    }

    #[test]
    fn test_close_at_pulls_late_break_start_inside_shift() {
        let mut shift = Shift::open(Uuid::new_v4(), at(0, 0), at(0, 0));
        shift
            .breaks
            .push(Break::new(shift.id, at(15, 0), None, at(15, 0)));

        shift.close_at(at(14, 0));

        let brk = &shift.breaks[0];
        assert_eq!(brk.break_start, at(14, 0));
        assert_eq!(brk.break_end, Some(at(14, 0)));
    }

    #[test]
    fn test_clamp_to_span() {
        let mut shift = Shift::open(Uuid::new_v4(), at(9, 0), at(9, 0));
        assert_eq!(shift.clamp_to_span(at(8, 0)), at(9, 0));
        assert_eq!(shift.clamp_to_span(at(20, 0)), at(20, 0));

        shift.check_out = Some(at(17, 0));
        assert_eq!(shift.clamp_to_span(at(20, 0)), at(17, 0));
    }

    #[test]
    fn test_shift_serialization() {
        let mut shift = Shift::open(Uuid::new_v4(), at(9, 0), at(9, 0));
        shift.breaks.push(Break::new(shift.id, at(12, 0), None, at(12, 0)));

        let json = serde_json::to_string(&shift).unwrap();
        let deserialized: Shift = serde_json::from_str(&json).unwrap();
        assert_eq!(shift, deserialized);
        assert!(json.contains("\"check_out\":null"));
    }
}
