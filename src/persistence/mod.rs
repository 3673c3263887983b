use crate::calendar::{Calendar, CalendarError, CalendarSlot, Material};
use crate::config::{StorageConfig, StorageFormat};
use polars::prelude::PolarsError;
use serde_json::Error as SerdeJsonError;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("corrupt calendar store: {0}")]
    CorruptStore(String),
    #[error("store lock poisoned")]
    LockPoisoned,
    #[error("no calendar stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait CalendarStore: Send + Sync {
    /// Replace everything stored with `calendar`.
    fn save_calendar(&self, calendar: &Calendar) -> PersistenceResult<()>;
    /// `Ok(None)` when nothing has been stored yet.
    fn load_calendar(&self) -> PersistenceResult<Option<Calendar>>;
}

pub fn open_store(config: &StorageConfig) -> PersistenceResult<Box<dyn CalendarStore>> {
    let store: Box<dyn CalendarStore> = match config.format {
        StorageFormat::Csv => Box::new(file::CsvCalendarStore::new(&config.path)),
        StorageFormat::Json => Box::new(file::JsonCalendarStore::new(&config.path)),
        #[cfg(feature = "sqlite")]
        StorageFormat::Sqlite => Box::new(sqlite::SqliteCalendarStore::new(&config.path)?),
    };
    Ok(store)
}

pub fn validate_slots(slots: Vec<CalendarSlot>) -> PersistenceResult<Calendar> {
    Calendar::from_slots(slots).map_err(|err| match err {
        CalendarError::Corrupt(message) => PersistenceError::CorruptStore(message),
        other => PersistenceError::CorruptStore(other.to_string()),
    })
}

/// Material columns as stored: all empty means no material.
pub(crate) fn material_from_columns(
    file_path: Option<String>,
    subject: Option<String>,
    topic: Option<String>,
) -> Option<Material> {
    let file_path = file_path.unwrap_or_default();
    let subject = subject.unwrap_or_default();
    let topic = topic.unwrap_or_default();
    if file_path.trim().is_empty() && subject.trim().is_empty() && topic.trim().is_empty() {
        return None;
    }
    Some(Material {
        file_path,
        subject,
        topic,
    })
}

pub(crate) fn slot_index(raw: i64, row: usize) -> PersistenceResult<usize> {
    usize::try_from(raw)
        .map_err(|_| PersistenceError::CorruptStore(format!("row {row} has negative index {raw}")))
}

/// Write through a sibling temp file, then rename it over `path`.
pub(crate) fn write_atomically<P, F>(path: P, write: F) -> PersistenceResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut fs::File) -> PersistenceResult<()>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    CsvCalendarStore, JsonCalendarStore, load_calendar_from_csv, load_calendar_from_json,
    save_calendar_to_csv, save_calendar_to_json,
};
