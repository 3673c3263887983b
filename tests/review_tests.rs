use chrono::{Duration, NaiveDate};
use spaced_review::{
    Calendar, CalendarError, Material, REVIEW_INTERVALS, ReviewOutcome, assign, due_for_review,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn second_day_reviews_first_day() {
    let mut cal = Calendar::initialize(d(2025, 1, 1), 10).unwrap();
    let material = Material::new("notes/day1.html", "History", "Rome").unwrap();
    assign(&mut cal, d(2025, 1, 1), material.clone()).unwrap();

    let outcome = due_for_review(&cal, d(2025, 1, 2)).unwrap();
    let set = outcome.review_set().expect("review set");
    assert_eq!(set.len(), 2);

    assert_eq!(set.entries[0].offset_days, 0);
    assert_eq!(set.entries[0].slot.index, 2);
    assert!(set.entries[0].slot.material.is_none());

    assert_eq!(set.entries[1].offset_days, 1);
    assert_eq!(set.entries[1].slot.index, 1);
    assert_eq!(set.entries[1].slot.material, Some(material));
    assert!(set.has_material());
}

#[test]
fn today_is_always_first_even_when_empty() {
    let cal = Calendar::initialize(d(2025, 1, 1), 100).unwrap();
    for offset in [0, 1, 6, 7, 29, 30, 99] {
        let today = d(2025, 1, 1) + Duration::days(offset);
        let outcome = due_for_review(&cal, today).unwrap();
        let set = outcome.review_set().unwrap();
        assert_eq!(set.todays_slot().date, today);
        assert_eq!(set.entries[0].offset_days, 0);
    }
}

#[test]
fn intervals_before_start_are_omitted() {
    let cal = Calendar::initialize(d(2025, 1, 1), 100).unwrap();
    // diff = 30: offsets 0, 1, 7 and 30 fit; 90 lands before slot 1
    let outcome = due_for_review(&cal, d(2025, 1, 31)).unwrap();
    let set = outcome.review_set().unwrap();
    let indices: Vec<usize> = set.slots().map(|slot| slot.index).collect();
    assert_eq!(indices, vec![31, 30, 24, 1]);
}

#[test]
fn full_table_applies_late_in_a_long_horizon() {
    let start = d(2020, 1, 1);
    let cal = Calendar::initialize(start, 3650).unwrap();
    let today = start + Duration::days(3300);
    let outcome = due_for_review(&cal, today).unwrap();
    let set = outcome.review_set().unwrap();
    let offsets: Vec<i64> = set.entries.iter().map(|e| e.offset_days).collect();
    assert_eq!(offsets, REVIEW_INTERVALS.to_vec());
    for entry in &set.entries {
        assert_eq!(entry.slot.date, today - Duration::days(entry.offset_days));
    }
}

#[test]
fn before_start_is_not_started() {
    let cal = Calendar::initialize(d(2025, 1, 1), 10).unwrap();
    let err = due_for_review(&cal, d(2024, 12, 31)).unwrap_err();
    assert_eq!(
        err,
        CalendarError::ProgramNotStarted {
            start: d(2025, 1, 1),
            today: d(2024, 12, 31)
        }
    );
}

#[test]
fn past_horizon_is_completed() {
    let cal = Calendar::initialize(d(2025, 1, 1), 10).unwrap();
    // last slot is 2025-01-10; one day later the program is over
    assert!(!due_for_review(&cal, d(2025, 1, 10)).unwrap().is_completed());
    assert_eq!(
        due_for_review(&cal, d(2025, 1, 11)).unwrap(),
        ReviewOutcome::ProgramCompleted
    );
    assert!(due_for_review(&cal, d(2026, 1, 1)).unwrap().is_completed());
}
