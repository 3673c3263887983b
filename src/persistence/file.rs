use super::{PersistenceError, PersistenceResult, write_atomically};
use crate::calendar::{Calendar, CalendarSlot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Date format of the data file: month/day/year without zero padding.
const CSV_DATE_FORMAT: &str = "%-m/%-d/%Y";

#[derive(Serialize, Deserialize)]
struct CalendarSnapshot {
    start_date: NaiveDate,
    slots: Vec<CalendarSlot>,
}

impl CalendarSnapshot {
    fn from_calendar(calendar: &Calendar) -> Self {
        Self {
            start_date: calendar.start_date(),
            slots: calendar.slots().to_vec(),
        }
    }

    fn into_calendar(self) -> PersistenceResult<Calendar> {
        let calendar = super::validate_slots(self.slots)?;
        if calendar.start_date() != self.start_date {
            return Err(PersistenceError::CorruptStore(format!(
                "snapshot start date {} does not match first slot {}",
                self.start_date,
                calendar.start_date()
            )));
        }
        Ok(calendar)
    }
}

pub fn save_calendar_to_json<P: AsRef<Path>>(calendar: &Calendar, path: P) -> PersistenceResult<()> {
    let snapshot = CalendarSnapshot::from_calendar(calendar);
    write_atomically(path, |file| {
        serde_json::to_writer_pretty(&mut *file, &snapshot)?;
        file.flush()?;
        Ok(())
    })
}

pub fn load_calendar_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Calendar> {
    let file = File::open(path)?;
    let snapshot: CalendarSnapshot = serde_json::from_reader(file)
        .map_err(|err| PersistenceError::CorruptStore(format!("invalid snapshot: {err}")))?;
    snapshot.into_calendar()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SlotCsvRecord {
    #[serde(rename = "Index")]
    index: i64,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "FilePath", default)]
    file_path: String,
    #[serde(rename = "Subject", default)]
    subject: String,
    #[serde(rename = "Topic", default)]
    topic: String,
}

impl From<&CalendarSlot> for SlotCsvRecord {
    fn from(slot: &CalendarSlot) -> Self {
        let mut record = SlotCsvRecord {
            index: slot.index as i64,
            date: format_date(slot.date),
            ..Default::default()
        };
        if let Some(material) = &slot.material {
            record.file_path = material.file_path.clone();
            record.subject = material.subject.clone();
            record.topic = material.topic.clone();
        }
        record
    }
}

impl SlotCsvRecord {
    fn into_slot(self, row: usize) -> PersistenceResult<CalendarSlot> {
        let index = super::slot_index(self.index, row)?;
        let date = parse_date(&self.date).ok_or_else(|| {
            PersistenceError::CorruptStore(format!("row {row} has invalid date '{}'", self.date))
        })?;
        let material = super::material_from_columns(
            Some(self.file_path),
            Some(self.subject),
            Some(self.topic),
        );
        Ok(CalendarSlot {
            index,
            date,
            material,
        })
    }
}

pub fn save_calendar_to_csv<P: AsRef<Path>>(calendar: &Calendar, path: P) -> PersistenceResult<()> {
    write_atomically(path, |file| {
        let mut writer = csv::Writer::from_writer(file);
        for slot in calendar.slots() {
            writer.serialize(SlotCsvRecord::from(slot))?;
        }
        writer.flush()?;
        Ok(())
    })
}

pub fn load_calendar_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Calendar> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut slots = Vec::new();
    for (position, record) in reader.deserialize::<SlotCsvRecord>().enumerate() {
        let row = position + 1;
        let record = record
            .map_err(|err| PersistenceError::CorruptStore(format!("row {row}: {err}")))?;
        slots.push(record.into_slot(row)?);
    }
    super::validate_slots(slots)
}

fn format_date(date: NaiveDate) -> String {
    date.format(CSV_DATE_FORMAT).to_string()
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
}

pub struct CsvCalendarStore {
    path: PathBuf,
}

impl CsvCalendarStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl super::CalendarStore for CsvCalendarStore {
    fn save_calendar(&self, calendar: &Calendar) -> PersistenceResult<()> {
        save_calendar_to_csv(calendar, &self.path)?;
        debug!(path = %self.path.display(), slots = calendar.len(), "saved calendar csv");
        Ok(())
    }

    fn load_calendar(&self) -> PersistenceResult<Option<Calendar>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let calendar = load_calendar_from_csv(&self.path)?;
        debug!(path = %self.path.display(), slots = calendar.len(), "loaded calendar csv");
        Ok(Some(calendar))
    }
}

pub struct JsonCalendarStore {
    path: PathBuf,
}

impl JsonCalendarStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl super::CalendarStore for JsonCalendarStore {
    fn save_calendar(&self, calendar: &Calendar) -> PersistenceResult<()> {
        save_calendar_to_json(calendar, &self.path)?;
        debug!(path = %self.path.display(), slots = calendar.len(), "saved calendar json");
        Ok(())
    }

    fn load_calendar(&self) -> PersistenceResult<Option<Calendar>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let calendar = load_calendar_from_json(&self.path)?;
        debug!(path = %self.path.display(), slots = calendar.len(), "loaded calendar json");
        Ok(Some(calendar))
    }
}
