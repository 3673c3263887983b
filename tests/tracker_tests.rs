use chrono::NaiveDate;
use spaced_review::{
    CalendarError, Horizon, Material, ResetOutcome, StorageConfig, StorageFormat, Tracker,
    TrackerConfig, TrackerError,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config_at(path: &Path, format: StorageFormat, horizon: Horizon) -> TrackerConfig {
    TrackerConfig::new(
        StorageConfig {
            path: path.to_path_buf(),
            format,
        },
        horizon,
    )
}

#[test]
fn open_initializes_and_persists_a_fresh_calendar() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("learned_material.csv");
    let config = config_at(&path, StorageFormat::Csv, Horizon::Months(2));

    let tracker = Tracker::open(config, d(2025, 1, 1)).unwrap();
    // January + February 2025
    assert_eq!(tracker.calendar().len(), 59);
    assert_eq!(tracker.calendar().start_date(), d(2025, 1, 1));
    assert!(path.exists());
}

#[test]
fn configured_start_date_wins_over_today() {
    let dir = tempdir().unwrap();
    let config = config_at(&dir.path().join("cal.json"), StorageFormat::Json, Horizon::Days(30))
        .with_start_date(d(2025, 3, 1));
    let tracker = Tracker::open(config, d(2025, 6, 1)).unwrap();
    assert_eq!(tracker.calendar().start_date(), d(2025, 3, 1));
}

#[test]
fn reopen_loads_existing_calendar_instead_of_recreating() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cal.csv");
    let config = config_at(&path, StorageFormat::Csv, Horizon::Days(10));

    let mut tracker = Tracker::open(config.clone(), d(2025, 1, 1)).unwrap();
    let material = Material::new("single/a.html", "Chemistry", "Bonds").unwrap();
    tracker.submit(d(2025, 1, 3), material.clone()).unwrap();
    drop(tracker);

    // a later "today" must not move the start date of an existing calendar
    let reopened = Tracker::open(config, d(2025, 1, 5)).unwrap();
    assert_eq!(reopened.calendar().start_date(), d(2025, 1, 1));
    assert_eq!(
        reopened.calendar().slot_for_date(d(2025, 1, 3)).unwrap().material,
        Some(material)
    );
}

#[test]
fn submit_outside_horizon_is_rejected() {
    let dir = tempdir().unwrap();
    let config = config_at(&dir.path().join("cal.csv"), StorageFormat::Csv, Horizon::Days(10));
    let mut tracker = Tracker::open(config, d(2025, 1, 1)).unwrap();
    let material = Material::new("single/a.html", "Chemistry", "Bonds").unwrap();
    let err = tracker.submit(d(2025, 2, 1), material).unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Calendar(CalendarError::DateOutOfRange { .. })
    ));
}

#[test]
fn invalid_horizon_fails_to_open() {
    let dir = tempdir().unwrap();
    let config = config_at(&dir.path().join("cal.csv"), StorageFormat::Csv, Horizon::Years(20));
    assert!(matches!(
        Tracker::open(config, d(2025, 1, 1)),
        Err(TrackerError::Calendar(CalendarError::InvalidHorizon(_)))
    ));
}

#[test]
fn declined_reset_leaves_store_byte_for_byte_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cal.csv");
    let config = config_at(&path, StorageFormat::Csv, Horizon::Days(20));
    let mut tracker = Tracker::open(config, d(2025, 1, 1)).unwrap();
    tracker
        .submit(
            d(2025, 1, 2),
            Material::new("single/a.html", "Music", "Scales").unwrap(),
        )
        .unwrap();

    let before = fs::read(&path).unwrap();
    let outcome = tracker.reset(false, d(2025, 1, 4)).unwrap();
    assert_eq!(outcome, ResetOutcome::Declined);
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(tracker.learned_record_count(), 1);
}

#[test]
fn confirmed_reset_discards_material() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cal.csv");
    let config = config_at(&path, StorageFormat::Csv, Horizon::Days(20));
    let mut tracker = Tracker::open(config, d(2025, 1, 1)).unwrap();
    for day in 1..=3 {
        tracker
            .submit(
                d(2025, 1, day),
                Material::new(format!("single/{day}.html"), "Music", "Scales").unwrap(),
            )
            .unwrap();
    }

    let outcome = tracker.reset(true, d(2025, 1, 4)).unwrap();
    assert_eq!(outcome, ResetOutcome::Reset { discarded: 3 });
    assert_eq!(tracker.learned_record_count(), 0);
    // without a configured start date the new calendar begins on the reset day
    assert_eq!(tracker.calendar().start_date(), d(2025, 1, 4));

    tracker.reload().unwrap();
    assert_eq!(tracker.learned_record_count(), 0);
    assert_eq!(tracker.calendar().len(), 20);
}

#[test]
fn summary_and_review_go_through_the_tracker() {
    let dir = tempdir().unwrap();
    let config = config_at(&dir.path().join("cal.json"), StorageFormat::Json, Horizon::Days(40));
    let mut tracker = Tracker::open(config, d(2025, 1, 1)).unwrap();
    tracker
        .submit(
            d(2025, 1, 1),
            Material::new("single/a.html", "Spanish", "Verbs").unwrap(),
        )
        .unwrap();

    let outcome = tracker.due_for_review(d(2025, 1, 8)).unwrap();
    let set = outcome.review_set().unwrap();
    let filled: Vec<_> = set.with_material().collect();
    assert_eq!(filled.len(), 1);
    assert_eq!(filled[0].offset_days, 7);

    let summary = tracker.summary(d(2025, 1, 8));
    assert_eq!(summary.total_learning_days, 1);
    assert_eq!(summary.skipped_so_far, 6);
    assert_eq!(summary.remaining_days, 33);
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_backed_tracker_survives_reopen() {
    let dir = tempdir().unwrap();
    let config = config_at(&dir.path().join("cal.db"), StorageFormat::Sqlite, Horizon::Days(10));
    let mut tracker = Tracker::open(config.clone(), d(2025, 1, 1)).unwrap();
    tracker
        .submit(
            d(2025, 1, 2),
            Material::new("single/a.html", "Law", "Contracts").unwrap(),
        )
        .unwrap();
    drop(tracker);

    let reopened = Tracker::open(config, d(2025, 1, 3)).unwrap();
    assert_eq!(reopened.learned_record_count(), 1);
}
