use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    CalendarError, CalendarSlot, LearningSummary, Material, ResetOutcome, ReviewOutcome,
    SkippedDay, Streak, Tracker, TrackerError, stats,
};

#[derive(Clone)]
pub struct AppState {
    tracker: Arc<RwLock<Tracker>>,
}

impl AppState {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Arc::new(RwLock::new(tracker)),
        }
    }

    pub fn with_shared(tracker: Arc<RwLock<Tracker>>) -> Self {
        Self { tracker }
    }

    fn tracker(&self) -> Arc<RwLock<Tracker>> {
        self.tracker.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<TrackerError> for ApiError {
    fn from(value: TrackerError) -> Self {
        match value {
            TrackerError::Calendar(err) => err.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CalendarError> for ApiError {
    fn from(value: CalendarError) -> Self {
        let message = value.to_string();
        match value {
            CalendarError::DateOutOfRange { .. } | CalendarError::OutOfRange { .. } => {
                ApiError::NotFound(message)
            }
            CalendarError::ProgramNotStarted { .. } => ApiError::Conflict(message),
            CalendarError::InvalidHorizon(_) | CalendarError::InvalidMaterial(_) => {
                ApiError::Invalid(message)
            }
            CalendarError::Corrupt(_) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct TodayQuery {
    today: Option<NaiveDate>,
}

impl TodayQuery {
    fn resolve(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitPayload {
    /// Overrides the server clock; material always lands in this day's slot.
    #[serde(default)]
    pub today: Option<NaiveDate>,
    pub file_path: String,
    pub subject: String,
    pub topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub slot: CalendarSlot,
    pub replaced: Option<Material>,
}

#[derive(Debug, Deserialize)]
struct ResetPayload {
    confirmed: bool,
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/summary", get(get_summary))
        .route("/review", get(get_review))
        .route("/material", post(submit_material))
        .route("/slots/:index", get(get_slot))
        .route("/dates/:date", get(get_slot_for_date))
        .route("/streaks", get(get_streaks))
        .route("/skipped", get(get_skipped))
        .route("/reset", post(reset_calendar))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, tracker: Tracker) -> std::io::Result<()> {
    let state = AppState::new(tracker);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<TodayQuery>,
) -> Json<LearningSummary> {
    let tracker = state.tracker();
    let summary = tracker.read().summary(query.resolve());
    Json(summary)
}

async fn get_review(
    State(state): State<AppState>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<ReviewOutcome>, ApiError> {
    let tracker = state.tracker();
    let outcome = tracker.read().due_for_review(query.resolve())?;
    Ok(Json(outcome))
}

async fn submit_material(
    State(state): State<AppState>,
    Json(payload): Json<SubmitPayload>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    let material = Material::new(payload.file_path, payload.subject, payload.topic)?;
    let tracker = state.tracker();
    let mut guard = tracker.write();
    let replaced = guard.submit(today, material)?;
    let slot = guard.calendar().slot_for_date(today)?.clone();
    Ok(Json(SubmitResponse { slot, replaced }))
}

async fn get_slot(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<CalendarSlot>, ApiError> {
    let tracker = state.tracker();
    let guard = tracker.read();
    let slot = guard.calendar().slot_at_index(index)?.clone();
    Ok(Json(slot))
}

async fn get_slot_for_date(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<CalendarSlot>, ApiError> {
    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| ApiError::Invalid(format!("invalid date '{raw}' (expected YYYY-MM-DD)")))?;
    let tracker = state.tracker();
    let guard = tracker.read();
    let slot = guard
        .calendar()
        .slot_for_date(date)
        .map_err(|_| ApiError::not_found(format!("no slot for {date}")))?
        .clone();
    Ok(Json(slot))
}

async fn get_streaks(State(state): State<AppState>) -> Json<Vec<Streak>> {
    let tracker = state.tracker();
    let streaks = stats::longest_streaks(tracker.read().calendar());
    Json(streaks)
}

async fn get_skipped(State(state): State<AppState>) -> Json<Vec<SkippedDay>> {
    let tracker = state.tracker();
    let skipped = stats::skipped_days(tracker.read().calendar()).collect();
    Json(skipped)
}

async fn reset_calendar(
    State(state): State<AppState>,
    Json(payload): Json<ResetPayload>,
) -> Result<Json<ResetOutcome>, ApiError> {
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    let tracker = state.tracker();
    let outcome = tracker.write().reset(payload.confirmed, today)?;
    Ok(Json(outcome))
}
