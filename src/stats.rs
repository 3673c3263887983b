use crate::calendar::Calendar;
use chrono::NaiveDate;
use serde::Serialize;

/// A maximal run of consecutive filled slots, by 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub start_index: usize,
    pub end_index: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedDay {
    pub index: usize,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearningSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub horizon_days: usize,
    pub total_learning_days: usize,
    /// Empty slots dated before the reference day.
    pub skipped_so_far: usize,
    /// Slots dated on or after the reference day.
    pub remaining_days: usize,
    pub longest_streak: Option<Streak>,
}

/// Every run of filled slots, found by scanning between gap positions.
///
/// Gaps are the indices of empty slots plus the virtual boundaries `0` and
/// `len + 1`; the run between gaps `a < b` spans `a + 1 ..= b - 1`.
fn streak_candidates(calendar: &Calendar) -> Vec<Streak> {
    let mut gaps: Vec<usize> = calendar
        .slots()
        .iter()
        .filter(|slot| !slot.is_filled())
        .map(|slot| slot.index)
        .collect();
    gaps.push(0);
    gaps.push(calendar.len() + 1);
    gaps.sort_unstable();

    gaps.windows(2)
        .map(|pair| Streak {
            start_index: pair[0] + 1,
            end_index: pair[1] - 1,
            length: pair[1] - pair[0] - 1,
        })
        .filter(|streak| streak.length > 0)
        .collect()
}

/// All streaks tied for the maximum length, in index order.
pub fn longest_streaks(calendar: &Calendar) -> Vec<Streak> {
    let candidates = streak_candidates(calendar);
    let Some(max) = candidates.iter().map(|streak| streak.length).max() else {
        return Vec::new();
    };
    candidates
        .into_iter()
        .filter(|streak| streak.length == max)
        .collect()
}

pub fn longest_streak(calendar: &Calendar) -> Option<Streak> {
    longest_streaks(calendar).into_iter().next()
}

pub fn total_learning_days(calendar: &Calendar) -> usize {
    calendar.filled_slots().count()
}

pub fn skipped_days(calendar: &Calendar) -> impl Iterator<Item = SkippedDay> + '_ {
    calendar
        .slots()
        .iter()
        .filter(|slot| !slot.is_filled())
        .map(|slot| SkippedDay {
            index: slot.index,
            date: slot.date,
        })
}

pub fn summarize(calendar: &Calendar, today: NaiveDate) -> LearningSummary {
    let skipped_so_far = skipped_days(calendar)
        .take_while(|day| day.date < today)
        .count();
    let remaining_days = calendar
        .slots()
        .iter()
        .filter(|slot| slot.date >= today)
        .count();
    LearningSummary {
        start_date: calendar.start_date(),
        end_date: calendar.end_date(),
        horizon_days: calendar.len(),
        total_learning_days: total_learning_days(calendar),
        skipped_so_far,
        remaining_days,
        longest_streak: longest_streak(calendar),
    }
}
