pub mod assigner;
pub mod calendar;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod projection;
pub mod review;
pub mod stats;
pub mod tracker;

pub use assigner::assign;
pub use calendar::{Calendar, CalendarError, CalendarSlot, Material, SlotStatus};
pub use config::{ConfigError, Horizon, StorageConfig, StorageFormat, TrackerConfig};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteCalendarStore;
pub use persistence::{
    CalendarStore, CsvCalendarStore, JsonCalendarStore, PersistenceError, load_calendar_from_csv,
    load_calendar_from_json, open_store, save_calendar_to_csv, save_calendar_to_json,
};
pub use projection::{MonthlyEntries, StandardQuery};
pub use review::{REVIEW_INTERVALS, ReviewEntry, ReviewOutcome, ReviewSet, due_for_review};
pub use stats::{
    LearningSummary, SkippedDay, Streak, longest_streak, longest_streaks, skipped_days,
    summarize, total_learning_days,
};
pub use tracker::{ResetOutcome, Tracker, TrackerError};
