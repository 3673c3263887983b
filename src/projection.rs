use crate::calendar::Calendar;
use crate::stats;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fmt;
use std::str::FromStr;

pub const PROJECTION_COLUMNS: [&str; 5] = ["index", "date", "file_path", "subject", "topic"];

/// Trim and collapse internal whitespace runs; blank text becomes `None`.
fn clean_text(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

fn date_to_i32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

fn date_column(dates: Vec<i32>) -> PolarsResult<Column> {
    Ok(Series::new(PlSmallStr::from_static("date"), dates)
        .cast(&DataType::Date)?
        .into_column())
}

/// Tabular view of the calendar, one row per slot.
pub fn to_dataframe(calendar: &Calendar) -> PolarsResult<DataFrame> {
    let slots = calendar.slots();
    let mut index = Vec::with_capacity(slots.len());
    let mut dates = Vec::with_capacity(slots.len());
    let mut file_paths: Vec<Option<String>> = Vec::with_capacity(slots.len());
    let mut subjects: Vec<Option<String>> = Vec::with_capacity(slots.len());
    let mut topics: Vec<Option<String>> = Vec::with_capacity(slots.len());

    for slot in slots {
        index.push(slot.index as i64);
        dates.push(date_to_i32(slot.date));
        match &slot.material {
            Some(material) => {
                let path = material.file_path.trim();
                file_paths.push((!path.is_empty()).then(|| path.to_string()));
                subjects.push(clean_text(&material.subject));
                topics.push(clean_text(&material.topic));
            }
            None => {
                file_paths.push(None);
                subjects.push(None);
                topics.push(None);
            }
        }
    }

    let columns = vec![
        Series::new(PlSmallStr::from_static("index"), index).into_column(),
        date_column(dates)?,
        Series::new(PlSmallStr::from_static("file_path"), file_paths).into_column(),
        Series::new(PlSmallStr::from_static("subject"), subjects).into_column(),
        Series::new(PlSmallStr::from_static("topic"), topics).into_column(),
    ];
    DataFrame::new(columns)
}

fn filled(calendar: &Calendar) -> PolarsResult<LazyFrame> {
    Ok(to_dataframe(calendar)?
        .lazy()
        .filter(col("subject").is_not_null()))
}

fn count_by(calendar: &Calendar, column: &str) -> PolarsResult<DataFrame> {
    filled(calendar)?
        .group_by([col(column)])
        .agg([col("index").count().cast(DataType::Int64).alias("count")])
        .sort_by_exprs(
            [col("count"), col(column)],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()
}

fn string_counts(df: &DataFrame, key: &str) -> PolarsResult<Vec<(String, i64)>> {
    let keys = df.column(key)?.str()?;
    let counts = df.column("count")?.i64()?;
    Ok(keys
        .into_iter()
        .zip(counts.into_iter())
        .filter_map(|(key, count)| Some((key?.to_string(), count?)))
        .collect())
}

/// `(subject, slots)` pairs, most studied first.
pub fn subject_counts(calendar: &Calendar) -> PolarsResult<Vec<(String, i64)>> {
    string_counts(&count_by(calendar, "subject")?, "subject")
}

pub fn topic_counts(calendar: &Calendar) -> PolarsResult<Vec<(String, i64)>> {
    string_counts(&count_by(calendar, "topic")?, "topic")
}

pub fn unique_subjects(calendar: &Calendar) -> PolarsResult<Vec<String>> {
    let mut subjects: Vec<String> = subject_counts(calendar)?
        .into_iter()
        .map(|(subject, _)| subject)
        .collect();
    subjects.sort();
    Ok(subjects)
}

fn entries_by_month_frame(calendar: &Calendar) -> PolarsResult<DataFrame> {
    filled(calendar)?
        .with_columns([
            col("date").dt().year().cast(DataType::Int32).alias("year"),
            col("date").dt().month().cast(DataType::Int32).alias("month"),
        ])
        .group_by([col("year"), col("month")])
        .agg([col("index").count().cast(DataType::Int64).alias("entries")])
        .sort_by_exprs([col("year"), col("month")], SortMultipleOptions::default())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyEntries {
    pub year: i32,
    pub month: u32,
    pub entries: i64,
}

pub fn entries_by_month(calendar: &Calendar) -> PolarsResult<Vec<MonthlyEntries>> {
    let df = entries_by_month_frame(calendar)?;
    let years = df.column("year")?.i32()?;
    let months = df.column("month")?.i32()?;
    let entries = df.column("entries")?.i64()?;
    Ok(years
        .into_iter()
        .zip(months.into_iter())
        .zip(entries.into_iter())
        .filter_map(|((year, month), entries)| {
            Some(MonthlyEntries {
                year: year?,
                month: u32::try_from(month?).ok()?,
                entries: entries?,
            })
        })
        .collect())
}

/// Canned questions over the learning history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardQuery {
    AllData,
    CountSubjects,
    CountTopics,
    SkippedDays,
    UniqueSubjects,
    TotalLearningDays,
    EntriesByMonth,
}

impl StandardQuery {
    pub const ALL: [StandardQuery; 7] = [
        StandardQuery::AllData,
        StandardQuery::CountSubjects,
        StandardQuery::CountTopics,
        StandardQuery::SkippedDays,
        StandardQuery::UniqueSubjects,
        StandardQuery::TotalLearningDays,
        StandardQuery::EntriesByMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StandardQuery::AllData => "all_data",
            StandardQuery::CountSubjects => "count_subjects",
            StandardQuery::CountTopics => "count_topics",
            StandardQuery::SkippedDays => "skipped_days",
            StandardQuery::UniqueSubjects => "unique_subjects",
            StandardQuery::TotalLearningDays => "total_learning_days",
            StandardQuery::EntriesByMonth => "entries_by_month",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StandardQuery::AllData => "Every slot in the calendar",
            StandardQuery::CountSubjects => "How many days each subject was studied",
            StandardQuery::CountTopics => "How many days each topic was studied",
            StandardQuery::SkippedDays => {
                "Days with no material recorded (an entry without a file path still counts)"
            }
            StandardQuery::UniqueSubjects => "Distinct subjects studied",
            StandardQuery::TotalLearningDays => "Number of days with material",
            StandardQuery::EntriesByMonth => "Days with material per month",
        }
    }

    pub fn variants() -> impl Iterator<Item = (&'static str, &'static str)> {
        Self::ALL
            .iter()
            .map(|query| (query.as_str(), query.description()))
    }

    pub fn run(&self, calendar: &Calendar) -> PolarsResult<DataFrame> {
        match self {
            StandardQuery::AllData => to_dataframe(calendar),
            StandardQuery::CountSubjects => count_by(calendar, "subject"),
            StandardQuery::CountTopics => count_by(calendar, "topic"),
            StandardQuery::SkippedDays => {
                let (index, dates): (Vec<i64>, Vec<i32>) = stats::skipped_days(calendar)
                    .map(|day| (day.index as i64, date_to_i32(day.date)))
                    .unzip();
                DataFrame::new(vec![
                    Series::new(PlSmallStr::from_static("index"), index).into_column(),
                    date_column(dates)?,
                ])
            }
            StandardQuery::UniqueSubjects => filled(calendar)?
                .select([col("subject")])
                .unique(None, UniqueKeepStrategy::First)
                .sort_by_exprs([col("subject")], SortMultipleOptions::default())
                .collect(),
            StandardQuery::TotalLearningDays => {
                let total = calendar.filled_slots().count() as i64;
                DataFrame::new(vec![
                    Series::new(PlSmallStr::from_static("total_days_learned"), [total])
                        .into_column(),
                ])
            }
            StandardQuery::EntriesByMonth => entries_by_month_frame(calendar),
        }
    }
}

impl fmt::Display for StandardQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StandardQuery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|query| query.as_str() == s)
            .ok_or_else(|| format!("unknown query '{s}'"))
    }
}
