use super::{PersistenceError, PersistenceResult};
use crate::calendar::{Calendar, CalendarSlot};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use std::sync::Mutex;
use tracing::debug;

/// Calendar kept in a `learned_material` table, one row per slot.
///
/// The table doubles as the read-only relational view that external query
/// tools run against, so the columns mirror the CSV data file.
pub struct SqliteCalendarStore {
    connection: Mutex<Connection>,
}

impl SqliteCalendarStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS learned_material (
                idx INTEGER PRIMARY KEY,
                date TEXT NOT NULL,
                file_path TEXT,
                subject TEXT,
                topic TEXT
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)
    }
}

impl super::CalendarStore for SqliteCalendarStore {
    fn save_calendar(&self, calendar: &Calendar) -> PersistenceResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM learned_material", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO learned_material (idx, date, file_path, subject, topic)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for slot in calendar.slots() {
                let material = slot.material.as_ref();
                stmt.execute(params![
                    slot.index as i64,
                    slot.date.format("%Y-%m-%d").to_string(),
                    material.map(|m| m.file_path.as_str()),
                    material.map(|m| m.subject.as_str()),
                    material.map(|m| m.topic.as_str()),
                ])?;
            }
        }
        tx.commit()?;
        debug!(slots = calendar.len(), "saved calendar to sqlite");
        Ok(())
    }

    fn load_calendar(&self) -> PersistenceResult<Option<Calendar>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT idx, date, file_path, subject, topic FROM learned_material ORDER BY idx ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut slots = Vec::new();
        for (position, row) in rows.enumerate() {
            let (raw_index, raw_date, file_path, subject, topic) = row?;
            let row_number = position + 1;
            let index = super::slot_index(raw_index, row_number)?;
            let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d").map_err(|err| {
                PersistenceError::CorruptStore(format!(
                    "row {row_number} has invalid date '{raw_date}': {err}"
                ))
            })?;
            slots.push(CalendarSlot {
                index,
                date,
                material: super::material_from_columns(file_path, subject, topic),
            });
        }

        if slots.is_empty() {
            return Ok(None);
        }
        let calendar = super::validate_slots(slots)?;
        debug!(slots = calendar.len(), "loaded calendar from sqlite");
        Ok(Some(calendar))
    }
}
