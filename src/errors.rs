use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Caller-contract violations: malformed initial state or commands that
/// address something that does not exist. The model is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("schedule has no days")]
    EmptySchedule,

    #[error("{day} has {count} periods, at most 3 are allowed")]
    TooManyPeriods { day: String, count: usize },

    #[error("unknown weekday: {0}")]
    UnknownWeekday(String),

    #[error("{0} appears more than once")]
    DuplicateDay(String),

    #[error("day index {0} out of range")]
    DayOutOfRange(usize),

    #[error("period {period} out of range for day {day}")]
    PeriodOutOfRange { day: usize, period: usize },

    #[error("day {0} has no next day to copy to")]
    NoNextDay(usize),

    #[error("invalid duration: {0} minutes")]
    InvalidDuration(u16),

    #[error("invalid time: {0}")]
    InvalidTime(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Editor(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
