use crate::assigner;
use crate::calendar::{Calendar, CalendarError, Material};
use crate::config::{ConfigError, TrackerConfig};
use crate::persistence::{self, CalendarStore, PersistenceError};
use crate::review::{self, ReviewOutcome};
use crate::stats::{self, LearningSummary};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResetOutcome {
    /// Nothing was touched.
    Declined,
    Reset { discarded: usize },
}

/// A calendar bound to the store it was loaded from.
///
/// Every mutation is written back through the store before returning.
pub struct Tracker {
    config: TrackerConfig,
    calendar: Calendar,
    store: Box<dyn CalendarStore>,
}

impl Tracker {
    /// Load the configured calendar, creating and saving a fresh one when the
    /// store is empty.
    pub fn open(config: TrackerConfig, today: NaiveDate) -> TrackerResult<Self> {
        let store = persistence::open_store(&config.storage)?;
        Self::with_store(config, store, today)
    }

    pub fn with_store(
        config: TrackerConfig,
        store: Box<dyn CalendarStore>,
        today: NaiveDate,
    ) -> TrackerResult<Self> {
        let calendar = match store.load_calendar()? {
            Some(calendar) => calendar,
            None => {
                let calendar = Self::fresh_calendar(&config, today)?;
                store.save_calendar(&calendar)?;
                calendar
            }
        };
        Ok(Self {
            config,
            calendar,
            store,
        })
    }

    fn fresh_calendar(config: &TrackerConfig, today: NaiveDate) -> TrackerResult<Calendar> {
        let start = config.effective_start(today);
        let horizon_days = config.horizon.days_from(start)?;
        let calendar = Calendar::initialize(start, horizon_days)?;
        info!(
            %start,
            end = %calendar.end_date(),
            slots = calendar.len(),
            "initialized calendar"
        );
        Ok(calendar)
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Record today's material and save. Returns whatever it replaced.
    pub fn submit(&mut self, today: NaiveDate, material: Material) -> TrackerResult<Option<Material>> {
        let previous = assigner::assign(&mut self.calendar, today, material)?;
        self.store.save_calendar(&self.calendar)?;
        Ok(previous)
    }

    pub fn due_for_review(&self, today: NaiveDate) -> TrackerResult<ReviewOutcome> {
        Ok(review::due_for_review(&self.calendar, today)?)
    }

    pub fn summary(&self, today: NaiveDate) -> LearningSummary {
        stats::summarize(&self.calendar, today)
    }

    pub fn learned_record_count(&self) -> usize {
        stats::total_learning_days(&self.calendar)
    }

    /// Replace the calendar with an empty one of the configured horizon.
    ///
    /// Callers collect the user's confirmation first; with `confirmed` false
    /// neither memory nor the store is touched.
    pub fn reset(&mut self, confirmed: bool, today: NaiveDate) -> TrackerResult<ResetOutcome> {
        if !confirmed {
            info!("reset declined");
            return Ok(ResetOutcome::Declined);
        }
        let discarded = self.learned_record_count();
        let calendar = Self::fresh_calendar(&self.config, today)?;
        self.store.save_calendar(&calendar)?;
        self.calendar = calendar;
        info!(discarded, "calendar reset");
        Ok(ResetOutcome::Reset { discarded })
    }

    /// Re-read the store, discarding in-memory state.
    pub fn reload(&mut self) -> TrackerResult<()> {
        self.calendar = self
            .store
            .load_calendar()?
            .ok_or(PersistenceError::NotFound)?;
        Ok(())
    }
}
