use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid horizon: {0}")]
    InvalidHorizon(String),
    #[error("date {date} is outside the calendar range {start}..={end}")]
    DateOutOfRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("slot index {index} is outside 1..={len}")]
    OutOfRange { index: usize, len: usize },
    #[error("program starts on {start}; {today} is before the first slot")]
    ProgramNotStarted { start: NaiveDate, today: NaiveDate },
    #[error("invalid material: {0}")]
    InvalidMaterial(String),
    #[error("inconsistent slots: {0}")]
    Corrupt(String),
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Reference to material learned on a given day.
///
/// `file_path` is an opaque content pointer; nothing in this crate reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub file_path: String,
    pub subject: String,
    pub topic: String,
}

impl Material {
    pub fn new(
        file_path: impl Into<String>,
        subject: impl Into<String>,
        topic: impl Into<String>,
    ) -> CalendarResult<Self> {
        let material = Self {
            file_path: file_path.into(),
            subject: subject.into(),
            topic: topic.into(),
        };
        material.validate()?;
        Ok(material)
    }

    pub fn validate(&self) -> CalendarResult<()> {
        if self.subject.trim().is_empty() {
            return Err(CalendarError::InvalidMaterial(
                "subject cannot be empty".into(),
            ));
        }
        if self.topic.trim().is_empty() {
            return Err(CalendarError::InvalidMaterial("topic cannot be empty".into()));
        }
        Ok(())
    }
}

/// Display classification of a slot relative to a reference day.
///
/// Storage only knows filled/empty, so `Skipped` and `Upcoming` are derived
/// from the date and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Filled,
    Skipped,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSlot {
    pub index: usize,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
}

impl CalendarSlot {
    pub fn empty(index: usize, date: NaiveDate) -> Self {
        Self {
            index,
            date,
            material: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.material.is_some()
    }

    pub fn status(&self, today: NaiveDate) -> SlotStatus {
        match (&self.material, self.date < today) {
            (Some(_), _) => SlotStatus::Filled,
            (None, true) => SlotStatus::Skipped,
            (None, false) => SlotStatus::Upcoming,
        }
    }
}

/// Day-indexed schedule of learning slots.
///
/// Always holds at least one slot; slot `i` (0-based) has index `i + 1` and
/// date `start + i` days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    slots: Vec<CalendarSlot>,
}

impl Calendar {
    pub fn initialize(start_date: NaiveDate, horizon_days: i64) -> CalendarResult<Self> {
        if horizon_days <= 0 {
            return Err(CalendarError::InvalidHorizon(format!(
                "horizon must cover at least one day (got {horizon_days})"
            )));
        }
        let last = Duration::try_days(horizon_days - 1)
            .and_then(|span| start_date.checked_add_signed(span));
        if last.is_none() {
            return Err(CalendarError::InvalidHorizon(format!(
                "{horizon_days} days from {start_date} overflows the date range"
            )));
        }
        let slots = start_date
            .iter_days()
            .take(horizon_days as usize)
            .enumerate()
            .map(|(offset, date)| CalendarSlot::empty(offset + 1, date))
            .collect();
        Ok(Self { slots })
    }

    /// Rebuild a calendar from stored slots, checking contiguity of indices
    /// and dates. `Corrupt` describes the first violation found.
    pub fn from_slots(slots: Vec<CalendarSlot>) -> CalendarResult<Self> {
        let Some(first) = slots.first() else {
            return Err(CalendarError::Corrupt("calendar contains no slots".into()));
        };
        let start = first.date;
        for (position, slot) in slots.iter().enumerate() {
            let expected_index = position + 1;
            if slot.index != expected_index {
                return Err(CalendarError::Corrupt(format!(
                    "row {expected_index} has index {} (indices must run 1..n without gaps)",
                    slot.index
                )));
            }
            let expected_date = start + Duration::days(position as i64);
            if slot.date != expected_date {
                return Err(CalendarError::Corrupt(format!(
                    "slot {} is dated {} but {} was expected",
                    slot.index, slot.date, expected_date
                )));
            }
            if let Some(material) = &slot.material {
                material
                    .validate()
                    .map_err(|err| CalendarError::Corrupt(format!("slot {}: {err}", slot.index)))?;
            }
        }
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[CalendarSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.slots[0].date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.slots[self.slots.len() - 1].date
    }

    /// Signed day count from the start date to `date`.
    pub fn days_since_start(&self, date: NaiveDate) -> i64 {
        (date - self.start_date()).num_days()
    }

    fn position_of(&self, date: NaiveDate) -> CalendarResult<usize> {
        let diff = self.days_since_start(date);
        if diff < 0 || diff >= self.slots.len() as i64 {
            return Err(CalendarError::DateOutOfRange {
                date,
                start: self.start_date(),
                end: self.end_date(),
            });
        }
        Ok(diff as usize)
    }

    pub fn slot_for_date(&self, date: NaiveDate) -> CalendarResult<&CalendarSlot> {
        let position = self.position_of(date)?;
        Ok(&self.slots[position])
    }

    pub(crate) fn slot_for_date_mut(&mut self, date: NaiveDate) -> CalendarResult<&mut CalendarSlot> {
        let position = self.position_of(date)?;
        Ok(&mut self.slots[position])
    }

    pub fn slot_at_index(&self, index: usize) -> CalendarResult<&CalendarSlot> {
        if index == 0 || index > self.slots.len() {
            return Err(CalendarError::OutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        Ok(&self.slots[index - 1])
    }

    pub fn filled_slots(&self) -> impl Iterator<Item = &CalendarSlot> {
        self.slots.iter().filter(|slot| slot.is_filled())
    }
}
