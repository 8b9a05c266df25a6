use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::time_slot::{DAY_LENGTH, GRANULARITY};
use crate::models::{SlotError, TimeSlot};

/// True iff `candidate` overlaps none of `booked`.
pub fn is_available(candidate: &TimeSlot, booked: &[TimeSlot]) -> bool {
    !booked.iter().any(|slot| candidate.overlaps(slot))
}

/// The quantized day every selectable time lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    granularity: u32,
    day_length: u32,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            granularity: GRANULARITY,
            day_length: DAY_LENGTH,
        }
    }
}

impl SlotGrid {
    pub fn new(granularity: u32, day_length: u32) -> Result<Self, SlotError> {
        if granularity == 0 || day_length == 0 || day_length % granularity != 0 {
            return Err(SlotError::InvalidGrid {
                granularity,
                day_length,
            });
        }
        Ok(Self {
            granularity,
            day_length,
        })
    }

    pub fn granularity(&self) -> u32 {
        self.granularity
    }

    pub fn day_length(&self) -> u32 {
        self.day_length
    }

    /// Checks bounds and alignment of a requested interval.
    pub fn validate(&self, start: u32, end: u32) -> Result<TimeSlot, SlotError> {
        if start >= self.day_length {
            return Err(SlotError::OutOfRange(start));
        }
        if end == 0 || end > self.day_length {
            return Err(SlotError::OutOfRange(end));
        }
        if start % self.granularity != 0 {
            return Err(SlotError::Misaligned(start, self.granularity));
        }
        if end % self.granularity != 0 {
            return Err(SlotError::Misaligned(end, self.granularity));
        }
        if start >= end {
            return Err(SlotError::StartNotBeforeEnd);
        }
        Ok(TimeSlot::new(start, end))
    }

    /// Every start whose minimal-length slot is free, ascending.
    pub fn available_starts(&self, booked: &[TimeSlot]) -> Vec<u32> {
        (0..self.day_length)
            .step_by(self.granularity as usize)
            .filter(|&s| is_available(&TimeSlot::new(s, s + self.granularity), booked))
            .collect()
    }

    /// Every end `e` such that `[start, e)` is free, ascending.
    ///
    /// Free time must run contiguously from `start`: the scan stops at the
    /// first end whose window reaches into a booked interval, since every
    /// longer window contains it too.
    pub fn available_ends(&self, start: u32, booked: &[TimeSlot]) -> Result<Vec<u32>, SlotError> {
        if start >= self.day_length {
            return Err(SlotError::OutOfRange(start));
        }
        if start % self.granularity != 0 {
            return Err(SlotError::Misaligned(start, self.granularity));
        }

        let mut ends = vec![];
        let mut end = start + self.granularity;
        while end <= self.day_length {
            if !is_available(&TimeSlot::new(start, end), booked) {
                break;
            }
            ends.push(end);
            end += self.granularity;
        }
        Ok(ends)
    }
}

/// Rejects `slot` if it overlaps any booked ticket on `date` other than `exclude_id`.
pub fn ensure_slot_free(
    conn: &Connection,
    date: NaiveDate,
    slot: &TimeSlot,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    let booked = queries::booked_slots_for_date(conn, date, exclude_id)?;
    if !is_available(slot, &booked) {
        return Err(AppError::SlotUnavailable);
    }
    Ok(())
}
