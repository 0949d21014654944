use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::errors::{AppError, EditorError};
use crate::models::{DayRecord, PeriodDuration, TimeOfDay};
use crate::services::{DayView, ScheduleEditor};
use crate::state::{AppState, RenderEvent, SessionEvent};

use super::check_auth;

#[derive(Serialize)]
pub struct ScheduleResponse {
    id: Uuid,
    days: Vec<DayView>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("schedule {id}"))
}

/// Runs one editor command under the session lock, then fans the resulting
/// render requests out to subscribers.
fn apply<F>(state: &AppState, id: Uuid, command: F) -> Result<Json<ScheduleResponse>, AppError>
where
    F: FnOnce(&mut ScheduleEditor) -> Result<(), EditorError>,
{
    let (days, requests) = state
        .with_session(id, |editor| {
            command(editor)?;
            Ok::<_, EditorError>((editor.view(), editor.drain_render_requests()))
        })
        .ok_or_else(|| not_found(id))??;

    for request in requests {
        state.publish(SessionEvent::Render(RenderEvent {
            session: id,
            request,
        }));
    }

    Ok(Json(ScheduleResponse { id, days }))
}

// GET /api/durations
#[derive(Serialize)]
pub struct DurationChoice {
    value: u16,
    label: String,
}

pub async fn list_durations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<DurationChoice>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let choices = PeriodDuration::choices()
        .map(|d| DurationChoice {
            value: d.into(),
            label: d.label(),
        })
        .collect();
    Ok(Json(choices))
}

// POST /api/schedules
#[derive(Deserialize)]
pub struct CreateScheduleRequest {
    pub days: Vec<DayRecord>,
    #[serde(default)]
    pub error_days: Option<Vec<usize>>,
}

pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let editor = ScheduleEditor::from_records(body.days, body.error_days.as_deref())?;
    let days = editor.view();
    let id = state.open_session(editor);

    tracing::info!(session = %id, days = days.len(), "schedule session opened");
    Ok((StatusCode::CREATED, Json(ScheduleResponse { id, days })))
}

// GET /api/schedules/:id
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let days = state
        .with_session(id, |editor| editor.view())
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ScheduleResponse { id, days }))
}

// DELETE /api/schedules/:id
pub async fn discard_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if !state.close_session(id) {
        return Err(not_found(id));
    }
    tracing::info!(session = %id, "schedule session discarded");
    Ok(Json(serde_json::json!({ "ok": true })))
}

// PUT /api/schedules/:id/days/:day/availability
#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, day)): Path<(Uuid, usize)>,
    Json(body): Json<AvailabilityRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    apply(&state, id, |editor| editor.set_availability(day, body.available))
}

// PUT /api/schedules/:id/days/:day/periods/:period/start
#[derive(Deserialize)]
pub struct StartRequest {
    pub start: Option<String>,
}

pub async fn set_period_start(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, day, period)): Path<(Uuid, usize, usize)>,
    Json(body): Json<StartRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    // A blank value is the picker reporting that nothing is selected
    let start = match body.start.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(TimeOfDay::parse(s)?),
    };
    apply(&state, id, |editor| editor.set_period_start(day, period, start))
}

// PUT /api/schedules/:id/days/:day/periods/:period/duration
#[derive(Deserialize)]
pub struct DurationRequest {
    pub duration: u16,
}

pub async fn set_period_duration(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, day, period)): Path<(Uuid, usize, usize)>,
    Json(body): Json<DurationRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let duration = PeriodDuration::new(body.duration)?;
    apply(&state, id, |editor| {
        editor.set_period_duration(day, period, duration)
    })
}

// POST /api/schedules/:id/days/:day/periods
pub async fn add_period(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, day)): Path<(Uuid, usize)>,
) -> Result<Json<ScheduleResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    apply(&state, id, |editor| editor.add_period(day))
}

// DELETE /api/schedules/:id/days/:day/periods/:period
pub async fn remove_period(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, day, period)): Path<(Uuid, usize, usize)>,
) -> Result<Json<ScheduleResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    apply(&state, id, |editor| editor.remove_period(day, period))
}

// POST /api/schedules/:id/days/:day/copy
pub async fn copy_to_next_day(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, day)): Path<(Uuid, usize)>,
) -> Result<Json<ScheduleResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    apply(&state, id, |editor| editor.copy_to_next_day(day))
}

// POST /api/schedules/:id/collect
pub async fn collect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let result = state
        .with_session(id, |editor| editor.collect())
        .ok_or_else(|| not_found(id))?;

    match result {
        Ok(records) => Ok(Json(records).into_response()),
        Err(invalid) => {
            tracing::warn!(session = %id, days = ?invalid.indices(), "schedule has invalid days");
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "error": invalid.to_string(),
                    "invalid_days": invalid.indices(),
                    "faults": invalid.faults,
                })),
            )
                .into_response())
        }
    }
}

// GET /api/schedules/:id/events (SSE stream)
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
}

enum Frame {
    Send(Event),
    Close,
}

/// Streams render requests for one session. The stream ends with a `closed`
/// event once the session is discarded or expires.
pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Auth via query param (EventSource can't set headers)
    if query.token.as_deref().unwrap_or("") != state.config.admin_token {
        return Err(AppError::Unauthorized);
    }

    // Subscribe before checking the session so a close cannot slip in between
    let rx = state.events_tx.subscribe();
    if !state.lock_sessions().contains_key(&id) {
        return Err(not_found(id));
    }

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.session() != id => None,
        Ok(SessionEvent::Render(event)) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Frame::Send(Event::default().data(data).event("render")))
        }
        Ok(SessionEvent::Closed(_)) => Some(Frame::Close),
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(session = %id, skipped, "render subscriber lagged");
            None
        }
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Frame::Send(Event::default().comment("keepalive")),
    );

    let closed = Event::default().event("closed").data(id.to_string());
    let stream = StreamExt::merge(live_stream, keepalive_stream)
        .take_while(|frame| matches!(frame, Frame::Send(_)))
        .filter_map(|frame| match frame {
            Frame::Send(event) => Some(Ok::<_, Infallible>(event)),
            Frame::Close => None,
        })
        .chain(tokio_stream::once(Ok(closed)));

    Ok(Sse::new(stream))
}
