use chrono::{Local, NaiveDate};
use polars::prelude::{AnyValue, Column, DataFrame};
use spaced_review::{
    Material, ResetOutcome, ReviewOutcome, StandardQuery, Tracker, TrackerConfig,
    save_calendar_to_csv, save_calendar_to_json, stats,
};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

fn cell_text(col: &Column, row_idx: usize) -> String {
    match col.get(row_idx) {
        Ok(AnyValue::Null) | Err(_) => String::new(),
        Ok(AnyValue::Int32(v)) => v.to_string(),
        Ok(AnyValue::Int64(v)) => v.to_string(),
        Ok(AnyValue::String(s)) => s.to_string(),
        Ok(AnyValue::StringOwned(s)) => s.to_string(),
        Ok(av) => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let cells: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| columns.iter().map(|col| cell_text(col, row_idx)).collect())
        .collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, s) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(s);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(s.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  today [YYYY-MM-DD]                 Show or set the working date\n  show                               Show today's slot and progress\n  submit <subject>|<topic>|<path>    Record today's material (replaces any earlier entry)\n  review                             List material due for review today\n  summary                            Show learning statistics\n  streak                             Show the longest learning streak(s)\n  skipped                            List days without material before today\n  queries                            List standard queries\n  query <name>                       Run a standard query\n  save <json|csv> <path>             Export the calendar\n  reset                              Start over with an empty calendar (asks twice)\n  quit|exit                          Exit"
    );
}

fn print_queries() {
    println!("Available queries:");
    for (key, description) in StandardQuery::variants() {
        println!("  {:<24} {}", key, description);
    }
}

fn print_material(material: &Material) {
    println!("  Subject  : {}", material.subject);
    println!("  Topic    : {}", material.topic);
    println!("  Content  : {}", material.file_path);
}

fn print_review(outcome: &ReviewOutcome) {
    let Some(set) = outcome.review_set() else {
        println!("The program has already been completed. No more data to review.");
        return;
    };
    if !set.has_material() {
        println!("No material to review.");
        return;
    }
    println!("Review material for {}:", set.today);
    for entry in &set.entries {
        let label = match entry.offset_days {
            0 => "today".to_string(),
            1 => "1 day ago".to_string(),
            n => format!("{n} days ago"),
        };
        match &entry.slot.material {
            Some(material) => {
                println!("- {} (slot {}, {})", entry.slot.date, entry.slot.index, label);
                print_material(material);
            }
            None => println!("- No material to review for {} ({}).", entry.slot.date, label),
        }
    }
}

fn print_summary(tracker: &Tracker, today: NaiveDate) {
    let summary = tracker.summary(today);
    println!("Start date         : {}", summary.start_date);
    println!("End date           : {}", summary.end_date);
    println!("Horizon (days)     : {}", summary.horizon_days);
    println!("Days learned       : {}", summary.total_learning_days);
    println!("Days skipped       : {}", summary.skipped_so_far);
    println!("Days remaining     : {}", summary.remaining_days);
    match summary.longest_streak {
        Some(streak) => println!(
            "Longest streak     : {} days (slots {}-{})",
            streak.length, streak.start_index, streak.end_index
        ),
        None => println!("Longest streak     : none yet"),
    }
}

fn parse_submission(rest: &str) -> Option<(String, String, String)> {
    let mut fields = rest.splitn(3, '|').map(str::trim);
    let subject = fields.next()?.to_string();
    let topic = fields.next()?.to_string();
    let path = fields.next()?.to_string();
    Some((subject, topic, path))
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, message: &str) -> String {
    print!("{message}");
    let _ = io::stdout().flush();
    match lines.next() {
        Some(Ok(line)) => line.trim().to_string(),
        _ => String::new(),
    }
}

fn load_config() -> Result<TrackerConfig, spaced_review::ConfigError> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SPACED_REVIEW_CONFIG").ok());
    match path {
        Some(path) => TrackerConfig::from_json_file(path),
        None => Ok(TrackerConfig::default()),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spaced_review=warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let mut today = Local::now().date_naive();
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let mut tracker = match Tracker::open(config, today) {
        Ok(tracker) => tracker,
        Err(e) => {
            eprintln!("Error opening calendar: {e}");
            std::process::exit(1);
        }
    };

    println!("Spaced Review (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "today" => {
                if !rest.is_empty() {
                    match NaiveDate::parse_from_str(rest, "%Y-%m-%d") {
                        Ok(date) => today = date,
                        Err(_) => {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        }
                    }
                }
                println!("Working date: {today}");
            }
            "show" => match tracker.calendar().slot_for_date(today) {
                Ok(slot) => {
                    println!("Slot {} of {} ({})", slot.index, tracker.calendar().len(), slot.date);
                    match &slot.material {
                        Some(material) => print_material(material),
                        None => println!("  No material submitted yet."),
                    }
                }
                Err(e) => println!("{e}"),
            },
            "submit" => {
                let Some((subject, topic, path)) = parse_submission(rest) else {
                    println!("Usage: submit <subject>|<topic>|<path>");
                    continue;
                };
                let material = match Material::new(path, subject, topic) {
                    Ok(material) => material,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                match tracker.submit(today, material) {
                    Ok(Some(previous)) => println!(
                        "Material saved for {today}. Replaced earlier entry '{}: {}'.",
                        previous.subject, previous.topic
                    ),
                    Ok(None) => println!("Material saved for {today}."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "review" => match tracker.due_for_review(today) {
                Ok(outcome) => print_review(&outcome),
                Err(e) => println!("{e}"),
            },
            "summary" => print_summary(&tracker, today),
            "streak" => {
                let streaks = stats::longest_streaks(tracker.calendar());
                if streaks.is_empty() {
                    println!("No learning streak yet.");
                }
                for streak in streaks {
                    let calendar = tracker.calendar();
                    let (Ok(first), Ok(last)) = (
                        calendar.slot_at_index(streak.start_index),
                        calendar.slot_at_index(streak.end_index),
                    ) else {
                        continue;
                    };
                    println!(
                        "Streak of {} days: {} to {} (slots {}-{})",
                        streak.length, first.date, last.date, streak.start_index, streak.end_index
                    );
                }
            }
            "skipped" => {
                let skipped: Vec<_> = stats::skipped_days(tracker.calendar())
                    .take_while(|day| day.date < today)
                    .collect();
                if skipped.is_empty() {
                    println!("No skipped days.");
                }
                for day in skipped {
                    println!("  slot {:<6} {}", day.index, day.date);
                }
            }
            "queries" => print_queries(),
            "query" => {
                let query = match StandardQuery::from_str(rest) {
                    Ok(query) => query,
                    Err(e) => {
                        println!("{e}. Type 'queries' to list them.");
                        continue;
                    }
                };
                match query.run(tracker.calendar()) {
                    Ok(df) if df.height() == 0 => println!("No data found for this query."),
                    Ok(df) => println!("{}\n{}", query.description(), render_df_as_text_table(&df)),
                    Err(e) => println!("Error executing query: {e}"),
                }
            }
            "save" => {
                let mut parts = rest.split_whitespace();
                let (Some(format), Some(path)) = (parts.next(), parts.next()) else {
                    println!("Usage: save <json|csv> <path>");
                    continue;
                };
                let res = match format {
                    "json" => save_calendar_to_json(tracker.calendar(), path),
                    "csv" => save_calendar_to_csv(tracker.calendar(), path),
                    _ => {
                        println!("Unknown format {format} (json|csv)");
                        continue;
                    }
                };
                match res {
                    Ok(_) => println!("Calendar saved to {path}."),
                    Err(e) => println!("Error saving calendar: {e}"),
                }
            }
            "reset" => {
                let records = tracker.learned_record_count();
                let mut confirmed = true;
                if records > 0 {
                    let warning = prompt(
                        &mut lines,
                        &format!(
                            "Warning: the calendar contains {records} records of learned material. Overwrite it? (y for yes, anything else for no): "
                        ),
                    );
                    confirmed = warning.eq_ignore_ascii_case("y");
                    if confirmed {
                        let danger = prompt(
                            &mut lines,
                            "Are you sure you want to delete all records? Enter 'yes' to proceed: ",
                        );
                        confirmed = danger.eq_ignore_ascii_case("yes");
                    }
                }
                match tracker.reset(confirmed, today) {
                    Ok(ResetOutcome::Declined) => println!("The calendar has not been reset."),
                    Ok(ResetOutcome::Reset { discarded }) => println!(
                        "The calendar has been reset ({discarded} records discarded)."
                    ),
                    Err(e) => println!("Error: {e}"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
