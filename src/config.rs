use crate::calendar::CalendarError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAX_HORIZON_YEARS: u32 = 15;
pub const MAX_HORIZON_MONTHS: u32 = 36;
pub const MAX_HORIZON_DAYS: u32 = MAX_HORIZON_YEARS * 366;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Length of the schedule, as chosen at setup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Years(u32),
    Months(u32),
    Days(u32),
}

impl Default for Horizon {
    fn default() -> Self {
        Horizon::Years(10)
    }
}

impl Horizon {
    pub fn validate(&self) -> Result<(), CalendarError> {
        match *self {
            Horizon::Years(years) if (1..=MAX_HORIZON_YEARS).contains(&years) => Ok(()),
            Horizon::Years(years) => Err(CalendarError::InvalidHorizon(format!(
                "years must be between 1 and {MAX_HORIZON_YEARS} (got {years})"
            ))),
            Horizon::Months(months) if (1..=MAX_HORIZON_MONTHS).contains(&months) => Ok(()),
            Horizon::Months(months) => Err(CalendarError::InvalidHorizon(format!(
                "months must be between 1 and {MAX_HORIZON_MONTHS} (got {months})"
            ))),
            Horizon::Days(days) if (1..=MAX_HORIZON_DAYS).contains(&days) => Ok(()),
            Horizon::Days(days) => Err(CalendarError::InvalidHorizon(format!(
                "days must be between 1 and {MAX_HORIZON_DAYS} (got {days})"
            ))),
        }
    }

    /// Number of daily slots the horizon covers when counted from `start`.
    ///
    /// Years and months follow the real calendar, so a one-year horizon
    /// starting on 2024-01-01 covers 366 days.
    pub fn days_from(&self, start: NaiveDate) -> Result<i64, CalendarError> {
        self.validate()?;
        let months = match *self {
            Horizon::Days(days) => return Ok(i64::from(days)),
            Horizon::Years(years) => years * 12,
            Horizon::Months(months) => months,
        };
        let end = start.checked_add_months(Months::new(months)).ok_or_else(|| {
            CalendarError::InvalidHorizon(format!("{self:?} from {start} overflows the date range"))
        })?;
        Ok((end - start).num_days())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageFormat {
    #[default]
    Csv,
    Json,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub format: StorageFormat,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("learned_material.csv"),
            format: StorageFormat::Csv,
        }
    }
}

/// Inputs fixed at setup: where the calendar lives, when it starts and how
/// long it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// Defaults to the day the calendar is first created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub horizon: Horizon,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl TrackerConfig {
    pub fn new(storage: StorageConfig, horizon: Horizon) -> Self {
        Self {
            start_date: None,
            horizon,
            storage,
        }
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(file).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Start date for a calendar created on `today`.
    pub fn effective_start(&self, today: NaiveDate) -> NaiveDate {
        self.start_date.unwrap_or(today)
    }
}
