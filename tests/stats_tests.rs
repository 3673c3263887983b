use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use spaced_review::{
    Calendar, Material, Streak, assign, longest_streak, longest_streaks, skipped_days,
    total_learning_days,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn calendar_filled_at(len: i64, indices: &[usize]) -> Calendar {
    let mut cal = Calendar::initialize(start(), len).unwrap();
    for &index in indices {
        let date = start() + Duration::days(index as i64 - 1);
        let material = Material::new(format!("notes/{index}.html"), "Physics", "Optics").unwrap();
        assign(&mut cal, date, material).unwrap();
    }
    cal
}

#[test]
fn longest_streak_with_gaps_and_unfilled_tail() {
    let cal = calendar_filled_at(20, &[1, 2, 3, 5, 7, 8, 9, 10]);
    assert_eq!(
        longest_streak(&cal),
        Some(Streak {
            start_index: 7,
            end_index: 10,
            length: 4
        })
    );
    assert_eq!(longest_streaks(&cal).len(), 1);
    assert_eq!(total_learning_days(&cal), 8);
}

#[test]
fn skipped_days_lists_every_empty_slot_in_order() {
    let cal = calendar_filled_at(6, &[2, 3, 5]);
    let skipped: Vec<(usize, NaiveDate)> = skipped_days(&cal).map(|d| (d.index, d.date)).collect();
    assert_eq!(
        skipped,
        vec![
            (1, start()),
            (4, start() + Duration::days(3)),
            (6, start() + Duration::days(5)),
        ]
    );
    // computed fresh on each call
    assert_eq!(skipped_days(&cal).count(), 3);
}

#[test]
fn streak_at_the_end_of_the_calendar() {
    let cal = calendar_filled_at(5, &[3, 4, 5]);
    assert_eq!(
        longest_streak(&cal),
        Some(Streak {
            start_index: 3,
            end_index: 5,
            length: 3
        })
    );
}

fn naive_longest(filled: &[bool]) -> usize {
    let mut best = 0;
    let mut run = 0;
    for &is_filled in filled {
        run = if is_filled { run + 1 } else { 0 };
        best = best.max(run);
    }
    best
}

proptest! {
    #[test]
    fn gap_scan_matches_linear_scan(filled in proptest::collection::vec(any::<bool>(), 1..200)) {
        let indices: Vec<usize> = filled
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| i + 1)
            .collect();
        let cal = calendar_filled_at(filled.len() as i64, &indices);
        let expected = naive_longest(&filled);
        let streaks = longest_streaks(&cal);

        if expected == 0 {
            prop_assert!(streaks.is_empty());
        } else {
            prop_assert!(!streaks.is_empty());
            for streak in &streaks {
                prop_assert_eq!(streak.length, expected);
                prop_assert_eq!(streak.end_index - streak.start_index + 1, streak.length);
                for index in streak.start_index..=streak.end_index {
                    prop_assert!(cal.slot_at_index(index).unwrap().is_filled());
                }
            }
        }
        prop_assert_eq!(total_learning_days(&cal), indices.len());
        prop_assert_eq!(skipped_days(&cal).count() + indices.len(), filled.len());
    }
}
