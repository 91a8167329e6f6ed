//! Break intervals inside a shift.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Break, Shift};

use super::{AttendanceService, ShiftTarget};

fn require_open(shift: &Shift) -> EngineResult<()> {
    if shift.is_open() {
        Ok(())
    } else {
        Err(EngineError::conflict("shift already closed"))
    }
}

impl AttendanceService {
    /// Starts a break on the targeted open shift.
    ///
    /// The start is the current time pulled into the shift's span.
    pub fn start_break(&self, actor: &Actor, target: ShiftTarget) -> EngineResult<Break> {
        let now = self.clock.now();

        let mut tx = self.store.begin()?;
        let shift = self.resolve_shift(tx.as_mut(), actor, target)?;
        require_open(&shift)?;
        if shift.open_break().is_some() {
            return Err(EngineError::conflict("break already active"));
        }

        let brk = Break::new(shift.id, shift.clamp_to_span(now), None, now);
        tx.insert_break(&brk)?;
        tx.commit()?;

        info!(
            shift_id = %shift.id,
            break_id = %brk.id,
            break_start = %brk.break_start,
            "Break started"
        );
        Ok(brk)
    }

    /// Ends the most recently started open break on the targeted shift.
    pub fn end_break(&self, actor: &Actor, target: ShiftTarget) -> EngineResult<Break> {
        let now = self.clock.now();

        let mut tx = self.store.begin()?;
        let shift = self.resolve_shift(tx.as_mut(), actor, target)?;
        require_open(&shift)?;
        let mut brk = shift
            .open_break()
            .cloned()
            .ok_or_else(|| EngineError::conflict("no active break"))?;

        brk.break_end = Some(now.max(brk.break_start));
        tx.update_break(&brk)?;
        tx.commit()?;

        info!(
            shift_id = %shift.id,
            break_id = %brk.id,
            minutes = brk.duration_minutes().unwrap_or_default(),
            "Break ended"
        );
        Ok(brk)
    }

    /// Records a closed break after the fact. Privileged only.
    ///
    /// The break must lie within the shift (up to now while it is open) and
    /// must not overlap another break. Shifts with a running break are
    /// rejected outright.
    pub fn add_manual_break(
        &self,
        actor: &Actor,
        shift_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Break> {
        actor.require_privileged()?;
        if end <= start {
            return Err(EngineError::invalid_input(
                "break_end_at must be after break_start_at",
            ));
        }

        let now = self.clock.now();
        let mut tx = self.store.begin()?;
        let shift = tx
            .find_shift(shift_id)?
            .ok_or_else(|| EngineError::not_found("shift"))?;

        if start < shift.check_in {
            return Err(EngineError::invalid_input(
                "break cannot start before check-in",
            ));
        }
        if end > shift.check_out.unwrap_or(now) {
            return Err(EngineError::invalid_input(if shift.is_open() {
                "break cannot end in the future"
            } else {
                "break cannot end after check-out"
            }));
        }
        if shift.open_break().is_some() {
            return Err(EngineError::conflict("active break exists, end it first"));
        }
        if shift.breaks.iter().any(|b| b.overlaps(start, end)) {
            return Err(EngineError::conflict("break overlaps existing break"));
        }

        let brk = Break::new(shift.id, start, Some(end), now);
        tx.insert_break(&brk)?;
        tx.commit()?;

        info!(
            shift_id = %shift.id,
            break_id = %brk.id,
            break_start = %start,
            break_end = %end,
            "Manual break recorded"
        );
        Ok(brk)
    }
}
