use crate::calendar::{Calendar, CalendarError, CalendarResult, CalendarSlot};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Review offsets in days before today. Offset 0 is today itself.
pub const REVIEW_INTERVALS: [i64; 14] = [
    0, 1, 7, 30, 90, 365, 730, 1095, 1460, 1825, 2190, 2555, 2920, 3285,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    /// Days between this slot and today.
    pub offset_days: i64,
    pub slot: CalendarSlot,
}

/// Slots due on a given day, today first and then by increasing offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSet {
    pub today: NaiveDate,
    pub entries: Vec<ReviewEntry>,
}

impl ReviewSet {
    pub fn todays_slot(&self) -> &CalendarSlot {
        &self.entries[0].slot
    }

    pub fn slots(&self) -> impl Iterator<Item = &CalendarSlot> {
        self.entries.iter().map(|entry| &entry.slot)
    }

    pub fn with_material(&self) -> impl Iterator<Item = &ReviewEntry> {
        self.entries.iter().filter(|entry| entry.slot.is_filled())
    }

    pub fn has_material(&self) -> bool {
        self.with_material().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReviewOutcome {
    Due(ReviewSet),
    /// Every slot of the horizon has already passed.
    ProgramCompleted,
}

impl ReviewOutcome {
    pub fn review_set(&self) -> Option<&ReviewSet> {
        match self {
            ReviewOutcome::Due(set) => Some(set),
            ReviewOutcome::ProgramCompleted => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ReviewOutcome::ProgramCompleted)
    }
}

pub fn due_for_review(calendar: &Calendar, today: NaiveDate) -> CalendarResult<ReviewOutcome> {
    let diff = calendar.days_since_start(today);
    if diff < 0 {
        return Err(CalendarError::ProgramNotStarted {
            start: calendar.start_date(),
            today,
        });
    }
    if diff >= calendar.len() as i64 {
        debug!(%today, diff, "horizon exhausted");
        return Ok(ReviewOutcome::ProgramCompleted);
    }

    let mut entries = Vec::with_capacity(REVIEW_INTERVALS.len());
    for offset_days in REVIEW_INTERVALS {
        let target = diff + 1 - offset_days;
        if target < 1 {
            continue;
        }
        let slot = calendar.slot_at_index(target as usize)?;
        entries.push(ReviewEntry {
            offset_days,
            slot: slot.clone(),
        });
    }
    debug!(%today, due = entries.len(), "computed review set");
    Ok(ReviewOutcome::Due(ReviewSet { today, entries }))
}
